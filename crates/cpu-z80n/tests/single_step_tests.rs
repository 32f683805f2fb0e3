//! Integration tests using Tom Harte's `SingleStepTests` for the Z80.
//!
//! Each JSON file holds 1,000 cases for one opcode: an initial CPU/RAM
//! state, the expected final state, and the bus cycle list (used here for
//! its length, the instruction's T-state count).
//!
//! Test data lives in `test-data/z80/v1/`; the test skips itself when the
//! directory is absent.

use cpu_z80n::Z80;
use emu_core::SimpleBus;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// JSON test case format.
#[derive(Deserialize)]
struct TestCase {
    name: String,
    initial: CpuState,
    #[serde(rename = "final")]
    final_state: CpuState,
    cycles: Vec<serde_json::Value>,
    #[serde(default)]
    ports: Vec<(u16, u8, String)>,
}

/// JSON CPU state format.
#[derive(Deserialize)]
struct CpuState {
    pc: u16,
    sp: u16,
    a: u8,
    b: u8,
    c: u8,
    d: u8,
    e: u8,
    f: u8,
    h: u8,
    l: u8,
    i: u8,
    r: u8,
    ix: u16,
    iy: u16,
    wz: u16,
    #[serde(rename = "af_")]
    af_alt: u16,
    #[serde(rename = "bc_")]
    bc_alt: u16,
    #[serde(rename = "de_")]
    de_alt: u16,
    #[serde(rename = "hl_")]
    hl_alt: u16,
    iff1: u8,
    iff2: u8,
    im: u8,
    ram: Vec<(u16, u8)>,
}

/// Set up the CPU and bus from the initial test state.
fn setup(cpu: &mut Z80, bus: &mut SimpleBus, state: &CpuState, ports: &[(u16, u8, String)]) {
    for &(addr, value) in &state.ram {
        bus.load(addr, &[value]);
    }
    for &(port, value, ref dir) in ports {
        if dir == "r" {
            bus.io_read_values.insert(port, value);
        }
    }

    cpu.regs.a = state.a;
    cpu.regs.f = state.f;
    cpu.regs.b = state.b;
    cpu.regs.c = state.c;
    cpu.regs.d = state.d;
    cpu.regs.e = state.e;
    cpu.regs.h = state.h;
    cpu.regs.l = state.l;

    cpu.regs.a_alt = (state.af_alt >> 8) as u8;
    cpu.regs.f_alt = state.af_alt as u8;
    cpu.regs.b_alt = (state.bc_alt >> 8) as u8;
    cpu.regs.c_alt = state.bc_alt as u8;
    cpu.regs.d_alt = (state.de_alt >> 8) as u8;
    cpu.regs.e_alt = state.de_alt as u8;
    cpu.regs.h_alt = (state.hl_alt >> 8) as u8;
    cpu.regs.l_alt = state.hl_alt as u8;

    cpu.regs.ix = state.ix;
    cpu.regs.iy = state.iy;
    cpu.regs.sp = state.sp;
    cpu.regs.pc = state.pc;
    cpu.regs.i = state.i;
    cpu.regs.r = state.r;
    cpu.regs.wz = state.wz;

    cpu.regs.iff1 = state.iff1 != 0;
    cpu.regs.iff2 = state.iff2 != 0;
    cpu.regs.im = state.im;
}

/// Compare the CPU/bus state against expected, returning mismatches.
fn compare(cpu: &Z80, bus: &SimpleBus, expected: &CpuState) -> Vec<String> {
    let mut errors = Vec::new();

    check_u8(&mut errors, "A", cpu.regs.a, expected.a);
    check_u8(&mut errors, "F", cpu.regs.f, expected.f);
    check_u8(&mut errors, "B", cpu.regs.b, expected.b);
    check_u8(&mut errors, "C", cpu.regs.c, expected.c);
    check_u8(&mut errors, "D", cpu.regs.d, expected.d);
    check_u8(&mut errors, "E", cpu.regs.e, expected.e);
    check_u8(&mut errors, "H", cpu.regs.h, expected.h);
    check_u8(&mut errors, "L", cpu.regs.l, expected.l);

    check_u16(&mut errors, "IX", cpu.regs.ix, expected.ix);
    check_u16(&mut errors, "IY", cpu.regs.iy, expected.iy);
    check_u16(&mut errors, "SP", cpu.regs.sp, expected.sp);
    check_u16(&mut errors, "PC", cpu.regs.pc, expected.pc);
    check_u8(&mut errors, "I", cpu.regs.i, expected.i);
    check_u8(&mut errors, "R", cpu.regs.r, expected.r);
    check_u16(&mut errors, "WZ", cpu.regs.wz, expected.wz);

    let iff1 = u8::from(cpu.regs.iff1);
    if iff1 != expected.iff1 {
        errors.push(format!("IFF1: got {iff1}, want {}", expected.iff1));
    }
    let iff2 = u8::from(cpu.regs.iff2);
    if iff2 != expected.iff2 {
        errors.push(format!("IFF2: got {iff2}, want {}", expected.iff2));
    }
    check_u8(&mut errors, "IM", cpu.regs.im, expected.im);

    for &(addr, want) in &expected.ram {
        let got = bus.peek(addr);
        if got != want {
            errors.push(format!("RAM[${addr:04X}]: got ${got:02X}, want ${want:02X}"));
        }
    }

    errors
}

fn check_u8(errors: &mut Vec<String>, name: &str, actual: u8, expected: u8) {
    if actual != expected {
        errors.push(format!("{name}: got ${actual:02X}, want ${expected:02X}"));
    }
}

fn check_u16(errors: &mut Vec<String>, name: &str, actual: u16, expected: u16) {
    if actual != expected {
        errors.push(format!("{name}: got ${actual:04X}, want ${expected:04X}"));
    }
}

/// Run all Z80 `SingleStepTests`.
#[test]
#[ignore = "requires test-data/z80 — run with --ignored"]
fn run_all() {
    let test_dir = Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("parent of crate dir")
        .parent()
        .expect("workspace root")
        .join("test-data/z80/v1");

    if !test_dir.exists() {
        eprintln!("Test data not found at {}", test_dir.display());
        eprintln!("Skipping SingleStepTests.");
        return;
    }

    let mut filenames: Vec<String> = Vec::new();
    for opcode in 0..=0xFFu8 {
        if matches!(opcode, 0xCB | 0xDD | 0xED | 0xFD) {
            continue;
        }
        filenames.push(format!("{opcode:02x}.json"));
    }
    for prefix in ["cb", "dd", "ed", "fd", "dd cb __", "fd cb __"] {
        for opcode in 0..=0xFFu8 {
            filenames.push(format!("{prefix} {opcode:02x}.json"));
        }
    }

    let mut total_pass = 0u64;
    let mut total_fail = 0u64;
    let mut total_files = 0u32;

    for filename in &filenames {
        let path = test_dir.join(filename);
        if !path.exists() {
            continue;
        }
        total_files += 1;

        let data = fs::read_to_string(&path).unwrap_or_else(|e| {
            panic!("Failed to read {}: {e}", path.display());
        });
        let tests: Vec<TestCase> = serde_json::from_str(&data).unwrap_or_else(|e| {
            panic!("Failed to parse {}: {e}", path.display());
        });

        let mut file_fail = 0u32;
        let mut first_failures: Vec<String> = Vec::new();

        for test in &tests {
            let mut cpu = Z80::new();
            let mut bus = SimpleBus::new();
            setup(&mut cpu, &mut bus, &test.initial, &test.ports);

            let tstates = cpu.execute_cycle(&mut bus);

            let mut errors = compare(&cpu, &bus, &test.final_state);
            let expected_tstates = test.cycles.len();
            if tstates as usize != expected_tstates {
                errors.push(format!(
                    "T-states: got {tstates}, want {expected_tstates}"
                ));
            }

            if errors.is_empty() {
                total_pass += 1;
            } else {
                total_fail += 1;
                file_fail += 1;
                if first_failures.len() < 3 {
                    first_failures.push(format!("  {}: {}", test.name, errors.join("; ")));
                }
            }
        }

        if file_fail > 0 {
            eprintln!("{filename}: {file_fail} failures");
            for failure in &first_failures {
                eprintln!("{failure}");
            }
        }
    }

    eprintln!("SingleStepTests: {total_pass} passed, {total_fail} failed across {total_files} files");
    assert_eq!(total_fail, 0, "{total_fail} test cases failed");
}
