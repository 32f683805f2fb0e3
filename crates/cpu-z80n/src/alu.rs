//! ALU operations for the Z80.
//!
//! Pure functions: value in, value and flags out. Handlers decide where the
//! result goes and which flag bits survive (e.g. INC/DEC keep carry).

#![allow(clippy::cast_possible_truncation)] // Intentional truncation for low byte extraction.

use crate::flags::{CF, HF, NF, PF, SF, XF, YF, ZF, sz53, sz53p};

/// Result of an ALU operation with flags.
#[derive(Debug, Clone, Copy)]
pub struct AluResult {
    pub value: u8,
    pub flags: u8,
}

/// Add two bytes with optional carry, returning result and flags.
#[must_use]
pub fn add8(a: u8, b: u8, carry: bool) -> AluResult {
    let c = u8::from(carry);
    let result16 = u16::from(a) + u16::from(b) + u16::from(c);
    let result = result16 as u8;

    let mut flags = sz53(result);

    // Half-carry out of bit 3
    if (a & 0x0F) + (b & 0x0F) + c > 0x0F {
        flags |= HF;
    }

    // Overflow (both operands same sign, result different sign)
    if (a ^ b) & 0x80 == 0 && (a ^ result) & 0x80 != 0 {
        flags |= PF;
    }

    // Carry out of bit 7
    if result16 > 0xFF {
        flags |= CF;
    }

    AluResult { value: result, flags }
}

/// Subtract two bytes with optional borrow, returning result and flags.
#[must_use]
pub fn sub8(a: u8, b: u8, carry: bool) -> AluResult {
    let c = u8::from(carry);
    let result = a.wrapping_sub(b).wrapping_sub(c);

    let mut flags = NF | sz53(result);

    // Half-borrow from bit 4
    if (a & 0x0F) < (b & 0x0F) + c {
        flags |= HF;
    }

    // Overflow (operands different sign, result same sign as subtrahend)
    if (a ^ b) & 0x80 != 0 && (b ^ result) & 0x80 == 0 {
        flags |= PF;
    }

    // Borrow
    if u16::from(a) < u16::from(b) + u16::from(c) {
        flags |= CF;
    }

    AluResult { value: result, flags }
}

/// AND operation. H is always set.
#[must_use]
pub fn and8(a: u8, b: u8) -> AluResult {
    let result = a & b;
    AluResult {
        value: result,
        flags: HF | sz53p(result),
    }
}

/// OR operation.
#[must_use]
pub fn or8(a: u8, b: u8) -> AluResult {
    let result = a | b;
    AluResult {
        value: result,
        flags: sz53p(result),
    }
}

/// XOR operation.
#[must_use]
pub fn xor8(a: u8, b: u8) -> AluResult {
    let result = a ^ b;
    AluResult {
        value: result,
        flags: sz53p(result),
    }
}

/// Compare (subtract without storing the result).
#[must_use]
pub fn cp8(a: u8, b: u8) -> AluResult {
    let mut result = sub8(a, b, false);
    // For CP, undocumented flags come from the operand, not the result
    result.flags = (result.flags & !(YF | XF)) | (b & (YF | XF));
    result
}

/// Increment byte. Carry is never touched by INC; callers keep it.
#[must_use]
pub fn inc8(a: u8) -> AluResult {
    let result = a.wrapping_add(1);

    let mut flags = sz53(result);
    if a & 0x0F == 0x0F {
        flags |= HF;
    }
    if a == 0x7F {
        flags |= PF; // Overflow
    }

    AluResult { value: result, flags }
}

/// Decrement byte. Carry is never touched by DEC; callers keep it.
#[must_use]
pub fn dec8(a: u8) -> AluResult {
    let result = a.wrapping_sub(1);

    let mut flags = NF | sz53(result);
    if a & 0x0F == 0x00 {
        flags |= HF;
    }
    if a == 0x80 {
        flags |= PF; // Overflow
    }

    AluResult { value: result, flags }
}

/// Common flag layout for the CB rotate/shift family.
const fn shift_flags(result: u8, carry: bool) -> u8 {
    sz53p(result) | if carry { CF } else { 0 }
}

/// Rotate left circular (bit 7 -> carry and bit 0).
#[must_use]
pub fn rlc8(a: u8) -> AluResult {
    let result = a.rotate_left(1);
    AluResult {
        value: result,
        flags: shift_flags(result, a & 0x80 != 0),
    }
}

/// Rotate right circular (bit 0 -> carry and bit 7).
#[must_use]
pub fn rrc8(a: u8) -> AluResult {
    let result = a.rotate_right(1);
    AluResult {
        value: result,
        flags: shift_flags(result, a & 0x01 != 0),
    }
}

/// Rotate left through carry.
#[must_use]
pub fn rl8(a: u8, carry: bool) -> AluResult {
    let result = (a << 1) | u8::from(carry);
    AluResult {
        value: result,
        flags: shift_flags(result, a & 0x80 != 0),
    }
}

/// Rotate right through carry.
#[must_use]
pub fn rr8(a: u8, carry: bool) -> AluResult {
    let result = (a >> 1) | (u8::from(carry) << 7);
    AluResult {
        value: result,
        flags: shift_flags(result, a & 0x01 != 0),
    }
}

/// Shift left arithmetic (bit 0 = 0).
#[must_use]
pub fn sla8(a: u8) -> AluResult {
    let result = a << 1;
    AluResult {
        value: result,
        flags: shift_flags(result, a & 0x80 != 0),
    }
}

/// Shift right arithmetic (bit 7 preserved).
#[must_use]
pub fn sra8(a: u8) -> AluResult {
    let result = (a >> 1) | (a & 0x80);
    AluResult {
        value: result,
        flags: shift_flags(result, a & 0x01 != 0),
    }
}

/// Shift left logical (undocumented SLL, bit 0 = 1).
#[must_use]
pub fn sll8(a: u8) -> AluResult {
    let result = (a << 1) | 1;
    AluResult {
        value: result,
        flags: shift_flags(result, a & 0x80 != 0),
    }
}

/// Shift right logical (bit 7 = 0).
#[must_use]
pub fn srl8(a: u8) -> AluResult {
    let result = a >> 1;
    AluResult {
        value: result,
        flags: shift_flags(result, a & 0x01 != 0),
    }
}

/// 16-bit add for ADD HL/IX/IY,rr. Only H, C and the undocumented bits
/// change; S, Z and PV are kept by the caller.
#[must_use]
pub fn add16(a: u16, b: u16) -> (u16, u8) {
    let result32 = u32::from(a) + u32::from(b);
    let result = result32 as u16;

    let mut flags = ((result >> 8) as u8) & (YF | XF);

    // Half-carry from bit 11
    if (a & 0x0FFF) + (b & 0x0FFF) > 0x0FFF {
        flags |= HF;
    }
    if result32 > 0xFFFF {
        flags |= CF;
    }

    (result, flags)
}

/// 16-bit add with carry for ADC HL,rr.
#[must_use]
pub fn adc16(a: u16, b: u16, carry: bool) -> (u16, u8) {
    let c = u32::from(carry);
    let result32 = u32::from(a) + u32::from(b) + c;
    let result = result32 as u16;

    let mut flags = ((result >> 8) as u8) & (YF | XF);

    if result & 0x8000 != 0 {
        flags |= SF;
    }
    if result == 0 {
        flags |= ZF;
    }

    // Half-carry from bit 11
    if u32::from(a & 0x0FFF) + u32::from(b & 0x0FFF) + c > 0x0FFF {
        flags |= HF;
    }

    // Overflow
    if (a ^ b) & 0x8000 == 0 && (a ^ result) & 0x8000 != 0 {
        flags |= PF;
    }

    if result32 > 0xFFFF {
        flags |= CF;
    }

    (result, flags)
}

/// 16-bit subtract with borrow for SBC HL,rr.
#[must_use]
pub fn sbc16(a: u16, b: u16, carry: bool) -> (u16, u8) {
    let c = u16::from(carry);
    let result = a.wrapping_sub(b).wrapping_sub(c);

    let mut flags = NF | (((result >> 8) as u8) & (YF | XF));

    if result & 0x8000 != 0 {
        flags |= SF;
    }
    if result == 0 {
        flags |= ZF;
    }

    // Half-borrow from bit 12
    if (a & 0x0FFF) < (b & 0x0FFF) + c {
        flags |= HF;
    }

    // Overflow
    if (a ^ b) & 0x8000 != 0 && (b ^ result) & 0x8000 == 0 {
        flags |= PF;
    }

    // Borrow
    if u32::from(a) < u32::from(b) + u32::from(c) {
        flags |= CF;
    }

    (result, flags)
}
