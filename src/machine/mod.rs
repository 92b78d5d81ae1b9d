//! A simulator for the target machine, used to execute generated assembly.
//!
//! The translator's tests run their output on this machine and assert on the
//! resulting memory, instead of string-matching entire programs. The
//! simulator assembles the textual output directly: labels and symbols are
//! resolved in two passes, then instructions execute one at a time.
//!
//! The machine has a 16 bit word, an `A` register (doubling as the memory
//! address register), a `D` accumulator, and a flat RAM. Execution stops when
//! control enters the canonical two-instruction halt loop, or when the step
//! budget runs out (which is reported as an error, since generated programs
//! are expected to halt).

#[cfg(test)]
mod tests;

use crate::error::MachineError;

use std::collections::HashMap;

const RAM_SIZE: usize = 32768;

/// The address the first named variable symbol is allocated at.
const VARIABLE_BASE: i16 = 16;

/// One decoded instruction of the target machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Instruction {
    /// `@value`: loads an address (or immediate) into the A register.
    Load(i16),
    /// `dest=comp;jump`.
    Compute { dest: Dest, comp: Comp, operand: Operand, jump: Jump },
}

/// Whether a compute instruction's second operand is the A register itself or
/// the memory cell it addresses. Irrelevant (and defaulted to A) for
/// computations that never touch the operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand {
    A,
    M,
}

/// The destination registers of a compute instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Dest {
    a: bool,
    d: bool,
    m: bool,
}

impl Dest {
    const NONE: Dest = Dest { a: false, d: false, m: false };
}

/// The ALU operation of a compute instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::enum_variant_names)]
enum Comp {
    Zero,
    One,
    NegOne,
    D,
    X,        // A or M
    NotD,
    NotX,
    NegD,
    NegX,
    DPlusOne,
    XPlusOne,
    DMinusOne,
    XMinusOne,
    DPlusX,
    DMinusX,
    XMinusD,
    DAndX,
    DOrX,
}

/// The jump condition of a compute instruction, tested on the ALU output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Jump {
    Null,
    Jgt,
    Jeq,
    Jge,
    Jlt,
    Jne,
    Jle,
    Jmp,
}

/// A loaded program together with the full machine state.
pub struct Machine {
    rom: Vec<Instruction>,
    ram: Vec<i16>,
    pc: usize,
    a: i16,
    d: i16,
}

impl Machine {
    /// Assembles a textual program and readies it for execution.
    ///
    /// Comments and blank lines are dropped; labels are resolved in a first
    /// pass, and remaining unknown symbols are allocated as variables from
    /// RAM address 16 upward in order of first appearance.
    pub fn new(lines: &[String]) -> Result<Machine, MachineError> {
        let mut symbols = predefined_symbols();

        // Pass 1: strip the text down to instructions, recording label addresses.
        let mut stripped: Vec<&str> = vec![];
        for line in lines {
            let code = match line.find("//") {
                Some(position) => line[..position].trim(),
                None => line.trim(),
            };

            if code.is_empty() {
                continue;
            }

            if let Some(name) = code.strip_prefix('(') {
                let name = name.strip_suffix(')').ok_or_else(|| {
                    MachineError(format!("Malformed label line \"{code}\""))
                })?;

                if symbols.insert(name.to_string(), stripped.len() as i16).is_some() {
                    return Err(MachineError(format!("Label \"{name}\" defined twice")));
                }
            } else {
                stripped.push(code);
            }
        }

        // Pass 2: decode, allocating variables for unresolved symbols.
        let mut next_variable = VARIABLE_BASE;
        let mut rom = vec![];
        for code in stripped {
            if let Some(symbol) = code.strip_prefix('@') {
                let value = if symbol.chars().all(|ch| ch.is_ascii_digit()) {
                    symbol
                        .parse::<i16>()
                        .map_err(|_| MachineError(format!("Address \"{symbol}\" out of range")))?
                } else if let Some(address) = symbols.get(symbol) {
                    *address
                } else {
                    let address = next_variable;
                    next_variable += 1;
                    symbols.insert(symbol.to_string(), address);
                    address
                };

                rom.push(Instruction::Load(value));
            } else {
                rom.push(decode_compute(code)?);
            }
        }

        Ok(Machine { rom, ram: vec![0; RAM_SIZE], pc: 0, a: 0, d: 0 })
    }

    /// Runs until the program parks itself in a halt loop.
    ///
    /// A program that fails to halt within `max_steps` instructions is an
    /// error; so is falling off the end of the program.
    pub fn run(&mut self, max_steps: u64) -> Result<(), MachineError> {
        for _ in 0..max_steps {
            if self.entering_halt_loop() {
                return Ok(());
            }

            self.step()?;
        }

        Err(MachineError(format!("Program did not halt within {max_steps} steps")))
    }

    /// Executes a single instruction.
    pub fn step(&mut self) -> Result<(), MachineError> {
        let instruction = *self
            .rom
            .get(self.pc)
            .ok_or_else(|| MachineError(format!("Execution ran off the end (pc = {})", self.pc)))?;

        self.pc += 1; // Might be overridden by a taken jump.

        match instruction {
            Instruction::Load(value) => {
                self.a = value;
            }
            Instruction::Compute { dest, comp, operand, jump } => {
                let value = self.evaluate(comp, operand)?;

                // The memory write must see the pre-instruction A register.
                if dest.m {
                    let address = self.address()?;
                    self.ram[address] = value;
                }
                if dest.a {
                    self.a = value;
                }
                if dest.d {
                    self.d = value;
                }

                if take_jump(jump, value) {
                    self.pc = usize::try_from(self.a)
                        .map_err(|_| MachineError(format!("Jump to negative address {}", self.a)))?;
                }
            }
        }

        Ok(())
    }

    /// Reads a RAM cell. Panics on an out of range address, which test code
    /// never has a reason to present.
    pub fn ram(&self, address: usize) -> i16 {
        self.ram[address]
    }

    /// The current stack pointer, RAM[0] by convention.
    pub fn stack_pointer(&self) -> i16 {
        self.ram[0]
    }

    /// True if the program counter sits at the canonical halt loop: an
    /// address load of the instruction's own location, followed by an
    /// unconditional jump with no destination.
    fn entering_halt_loop(&self) -> bool {
        matches!(self.rom.get(self.pc), Some(Instruction::Load(value)) if *value as usize == self.pc)
            && matches!(
                self.rom.get(self.pc + 1),
                Some(Instruction::Compute { dest: Dest::NONE, jump: Jump::Jmp, .. })
            )
    }

    /// Evaluates the ALU operation against the current registers.
    fn evaluate(&self, comp: Comp, operand: Operand) -> Result<i16, MachineError> {
        let x = match operand {
            Operand::A => self.a,
            Operand::M => self.ram[self.address()?],
        };

        Ok(match comp {
            Comp::Zero => 0,
            Comp::One => 1,
            Comp::NegOne => -1,
            Comp::D => self.d,
            Comp::X => x,
            Comp::NotD => !self.d,
            Comp::NotX => !x,
            Comp::NegD => self.d.wrapping_neg(),
            Comp::NegX => x.wrapping_neg(),
            Comp::DPlusOne => self.d.wrapping_add(1),
            Comp::XPlusOne => x.wrapping_add(1),
            Comp::DMinusOne => self.d.wrapping_sub(1),
            Comp::XMinusOne => x.wrapping_sub(1),
            Comp::DPlusX => self.d.wrapping_add(x),
            Comp::DMinusX => self.d.wrapping_sub(x),
            Comp::XMinusD => x.wrapping_sub(self.d),
            Comp::DAndX => self.d & x,
            Comp::DOrX => self.d | x,
        })
    }

    fn address(&self) -> Result<usize, MachineError> {
        let address = usize::try_from(self.a)
            .map_err(|_| MachineError(format!("Memory access at negative address {}", self.a)))?;

        if address >= RAM_SIZE {
            return Err(MachineError(format!("Memory access at address {address} out of range")));
        }

        Ok(address)
    }
}

/// Decodes `dest=comp;jump` text into an instruction.
fn decode_compute(code: &str) -> Result<Instruction, MachineError> {
    let (rest, jump) = match code.split_once(';') {
        Some((rest, jump)) => (rest, decode_jump(jump)?),
        None => (code, Jump::Null),
    };

    let (dest, comp) = match rest.split_once('=') {
        Some((dest, comp)) => (decode_dest(dest)?, comp),
        None => (Dest::NONE, rest),
    };

    let operand = if comp.contains('M') { Operand::M } else { Operand::A };
    let comp = decode_comp(comp)?;

    Ok(Instruction::Compute { dest, comp, operand, jump })
}

fn decode_dest(dest: &str) -> Result<Dest, MachineError> {
    if dest.is_empty() || !dest.chars().all(|ch| "ADM".contains(ch)) {
        return Err(MachineError(format!("Bad destination \"{dest}\"")));
    }

    Ok(Dest { a: dest.contains('A'), d: dest.contains('D'), m: dest.contains('M') })
}

fn decode_jump(jump: &str) -> Result<Jump, MachineError> {
    Ok(match jump {
        "JGT" => Jump::Jgt,
        "JEQ" => Jump::Jeq,
        "JGE" => Jump::Jge,
        "JLT" => Jump::Jlt,
        "JNE" => Jump::Jne,
        "JLE" => Jump::Jle,
        "JMP" => Jump::Jmp,
        _ => return Err(MachineError(format!("Bad jump \"{jump}\""))),
    })
}

fn decode_comp(comp: &str) -> Result<Comp, MachineError> {
    Ok(match comp {
        "0" => Comp::Zero,
        "1" => Comp::One,
        "-1" => Comp::NegOne,
        "D" => Comp::D,
        "A" | "M" => Comp::X,
        "!D" => Comp::NotD,
        "!A" | "!M" => Comp::NotX,
        "-D" => Comp::NegD,
        "-A" | "-M" => Comp::NegX,
        "D+1" => Comp::DPlusOne,
        "A+1" | "M+1" => Comp::XPlusOne,
        "D-1" => Comp::DMinusOne,
        "A-1" | "M-1" => Comp::XMinusOne,
        "D+A" | "D+M" | "A+D" | "M+D" => Comp::DPlusX,
        "D-A" | "D-M" => Comp::DMinusX,
        "A-D" | "M-D" => Comp::XMinusD,
        "D&A" | "D&M" | "A&D" | "M&D" => Comp::DAndX,
        "D|A" | "D|M" | "A|D" | "M|D" => Comp::DOrX,
        _ => return Err(MachineError(format!("Bad computation \"{comp}\""))),
    })
}

fn take_jump(jump: Jump, value: i16) -> bool {
    match jump {
        Jump::Null => false,
        Jump::Jgt => value > 0,
        Jump::Jeq => value == 0,
        Jump::Jge => value >= 0,
        Jump::Jlt => value < 0,
        Jump::Jne => value != 0,
        Jump::Jle => value <= 0,
        Jump::Jmp => true,
    }
}

fn predefined_symbols() -> HashMap<String, i16> {
    let mut symbols = HashMap::new();

    for (name, address) in
        [("SP", 0), ("LCL", 1), ("ARG", 2), ("THIS", 3), ("THAT", 4), ("SCREEN", 16384), ("KBD", 24576)]
    {
        symbols.insert(name.to_string(), address);
    }

    for register in 0..16 {
        symbols.insert(format!("R{register}"), register);
    }

    symbols
}
