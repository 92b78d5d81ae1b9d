//! Tests for the machine simulator itself, using tiny hand-written programs.

use super::*;

fn assemble(lines: &[&str]) -> Machine {
    let lines = lines.iter().map(|line| (*line).to_string()).collect::<Vec<_>>();

    Machine::new(&lines).expect("Program assembles")
}

fn run(lines: &[&str]) -> Machine {
    let mut machine = assemble(lines);
    machine.run(10_000).expect("Program halts");
    machine
}

#[test]
fn stores_an_immediate() {
    let machine = run(&[
        "@21",
        "D=A",
        "@100",
        "M=D",
        "(END)",
        "@END",
        "0;JMP",
    ]);

    assert_eq!(machine.ram(100), 21);
}

#[test]
fn arithmetic_and_memory_operands() {
    let machine = run(&[
        "@7",
        "D=A",
        "@100",
        "M=D",      // ram[100] = 7
        "@5",
        "D=A",
        "@100",
        "D=D+M",    // D = 12
        "@101",
        "M=D",
        "@100",
        "D=D-M",    // D = 5
        "@102",
        "M=D",
        "(END)",
        "@END",
        "0;JMP",
    ]);

    assert_eq!(machine.ram(101), 12);
    assert_eq!(machine.ram(102), 5);
}

#[test]
fn conditional_jumps_and_loops() {
    // Sums 1..=5 into ram[100] with a countdown loop.
    let machine = run(&[
        "@5",
        "D=A",
        "@16",
        "M=D",      // counter
        "@100",
        "M=0",
        "(LOOP)",
        "@16",
        "D=M",
        "@DONE",
        "D;JEQ",
        "@100",
        "M=D+M",
        "@16",
        "M=M-1",
        "@LOOP",
        "0;JMP",
        "(DONE)",
        "@DONE",
        "0;JMP",
    ]);

    assert_eq!(machine.ram(100), 15);
}

#[test]
fn compound_destinations_write_through_old_address() {
    // AM=M-1 must write memory at the pre-instruction address.
    let machine = run(&[
        "@10",
        "D=A",
        "@0",
        "M=D",      // ram[0] = 10
        "@0",
        "AM=M-1",   // ram[0] = 9, A = 9
        "D=A",
        "@100",
        "M=D",
        "(END)",
        "@END",
        "0;JMP",
    ]);

    assert_eq!(machine.ram(0), 9);
    assert_eq!(machine.ram(100), 9);
}

#[test]
fn variables_allocate_from_sixteen() {
    let machine = run(&[
        "@first",
        "M=1",
        "@second",
        "M=1",
        "@first",
        "M=M+1",
        "(END)",
        "@END",
        "0;JMP",
    ]);

    assert_eq!(machine.ram(16), 2);
    assert_eq!(machine.ram(17), 1);
}

#[test]
fn non_halting_program_reports_an_error() {
    let lines = ["(SPIN)", "@0", "D=D+1", "@SPIN", "0;JMP"]
        .iter()
        .map(|line| (*line).to_string())
        .collect::<Vec<_>>();

    let mut machine = Machine::new(&lines).expect("Program assembles");

    assert!(machine.run(1_000).is_err());
}

#[test]
fn bad_programs_fail_to_assemble() {
    let check = |lines: &[&str]| {
        let lines = lines.iter().map(|line| (*line).to_string()).collect::<Vec<_>>();
        assert!(Machine::new(&lines).is_err(), "Expected assembly failure: {lines:?}");
    };

    check(&["D=Q"]);
    check(&["D=M;JXX"]);
    check(&["(OPEN"]);
    check(&["(TWICE)", "(TWICE)"]);
    check(&["@99999"]);
}
