//! Branching and the function call frame protocol.
//!
//! The frame layout is a fixed contract between `write_call` and
//! `write_return`: the call site pushes the return address, then the four
//! linkage registers LCL, ARG, THIS, THAT, in that order. The return sequence
//! walks the same cells in exact reverse, and reads the return address at
//! [`FRAME_SIZE`](super::FRAME_SIZE) cells below the frame base. Reordering
//! either side without the other swaps restored registers.

use super::{CodeWriter, FRAME_SIZE};
use crate::util::OutStream;

impl CodeWriter {
    /// Defines a bare symbolic label at this position in the output.
    pub(super) fn write_label(&self, name: &str, out: &mut OutStream<String>) {
        out.push(format!("({name})"));
    }

    /// Unconditional jump to a named label.
    pub(super) fn write_goto(&self, name: &str, out: &mut OutStream<String>) {
        out.push(format!("@{name}"));
        out.push("0;JMP".to_string());
    }

    /// Pops the top of the stack and jumps to the named label if the popped
    /// value is non-zero; otherwise falls through.
    pub(super) fn write_if_goto(&self, name: &str, out: &mut OutStream<String>) {
        self.write_pop_accumulator(out);
        out.push(format!("@{name}"));
        out.push("D;JNE".to_string());
    }

    /// Emits the call sequence for `call name args`.
    ///
    /// Saves the caller's frame (return address deepest, then LCL, ARG, THIS,
    /// THAT), repositions ARG below the saved frame and the `args` arguments
    /// already on the stack, and jumps. The return address label is unique
    /// per (callee, call site ordinal): translating the same call twice
    /// intentionally yields different labels.
    pub(super) fn write_call(&mut self, name: &str, args: u16, out: &mut OutStream<String>) {
        let index = self.return_indices.entry(name.to_string()).or_insert(0);
        let return_label = format!("{name}$ret.{index}");
        *index += 1;

        out.push(format!("@{return_label}"));
        out.push("D=A".to_string());
        self.write_push_accumulator(out);

        for register in ["LCL", "ARG", "THIS", "THAT"] {
            out.push(format!("@{register}"));
            out.push("D=M".to_string());
            self.write_push_accumulator(out);
        }

        // ARG = SP - args - FRAME_SIZE, the base of the argument block. The
        // sum is widened so an argument count near the descriptor maximum
        // cannot overflow.
        out.push("@SP".to_string());
        out.push("D=M".to_string());
        out.push(format!("@{}", u32::from(args) + u32::from(FRAME_SIZE)));
        out.push("D=D-A".to_string());
        out.push("@ARG".to_string());
        out.push("M=D".to_string());

        out.push(format!("@{name}"));
        out.push("0;JMP".to_string());
        out.push(format!("({return_label})"));
    }

    /// Emits the prologue for `function name locals`.
    ///
    /// Defines the entry label, takes the frame base from the current stack
    /// pointer, zeroes each of the `locals` cells above it (one group per
    /// local), then advances the stack pointer past all of them at once.
    pub(super) fn write_function(&self, name: &str, locals: u16, out: &mut OutStream<String>) {
        out.push(format!("({name})"));
        out.push("@SP".to_string());
        out.push("D=M".to_string());
        out.push("@LCL".to_string());
        out.push("M=D".to_string());

        for local in 0..locals {
            out.push("@LCL".to_string());
            out.push("D=M".to_string());
            out.push(format!("@{local}"));
            out.push("A=D+A".to_string());
            out.push("M=0".to_string());
        }

        out.push(format!("@{locals}"));
        out.push("D=A".to_string());
        out.push("@SP".to_string());
        out.push("M=D+M".to_string());
    }

    /// Emits the return sequence.
    ///
    /// Captures the return address first: with zero arguments, ARG points at
    /// the cell holding it, and relocating the return value would clobber it.
    /// Then relocates the return value to the caller's argument base, unwinds
    /// the saved frame in exact reverse of the save order (decrementing the
    /// cursor before each read), resets the stack pointer to one past the
    /// relocated value, and jumps out.
    pub(super) fn write_return(&self, out: &mut OutStream<String>) {
        // R13 = *(LCL - FRAME_SIZE), the return address.
        out.push("@LCL".to_string());
        out.push("D=M".to_string());
        out.push(format!("@{FRAME_SIZE}"));
        out.push("A=D-A".to_string());
        out.push("D=M".to_string());
        out.push("@R13".to_string());
        out.push("M=D".to_string());

        // R14 = ARG, where the return value goes and the stack will end.
        out.push("@ARG".to_string());
        out.push("D=M".to_string());
        out.push("@R14".to_string());
        out.push("M=D".to_string());

        // *R14 = pop(), relocating the return value.
        self.write_pop_accumulator(out);
        out.push("@R14".to_string());
        out.push("A=M".to_string());
        out.push("M=D".to_string());

        // R15 = LCL, the unwind cursor.
        out.push("@LCL".to_string());
        out.push("D=M".to_string());
        out.push("@R15".to_string());
        out.push("M=D".to_string());

        for register in ["THAT", "THIS", "ARG", "LCL"] {
            out.push("@R15".to_string());
            out.push("AM=M-1".to_string());
            out.push("D=M".to_string());
            out.push(format!("@{register}"));
            out.push("M=D".to_string());
        }

        // SP = R14 + 1, one past the return value.
        out.push("@R14".to_string());
        out.push("D=M+1".to_string());
        out.push("@SP".to_string());
        out.push("M=D".to_string());

        out.push("@R13".to_string());
        out.push("A=M".to_string());
        out.push("0;JMP".to_string());
    }
}
