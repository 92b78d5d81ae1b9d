//! Lowers the binary, unary, and relational stack operations.
//!
//! Binary operators and the boolean/push join paths are shared subroutines:
//! the first command that needs one emits its body inline, right there in the
//! output, and every later command jumps to it instead. Control gets back to
//! the call site through R14, which holds a unique `RESUME_*` or
//! `JUMP_BACK_*` return label per jump.

use super::CodeWriter;
use crate::command::{BinaryOp, ComparisonOp, UnaryOp};
use crate::util::OutStream;

impl CodeWriter {
    /// Lowers a binary operation: pop right, pop left, compute, push result.
    ///
    /// Net stack pointer delta is exactly -1.
    pub(super) fn write_binary(&mut self, op: BinaryOp, out: &mut OutStream<String>) {
        let resume = format!("RESUME_{}", self.resume_index);
        self.resume_index += 1;

        out.push(format!("@{resume}"));
        out.push("D=A".to_string());
        out.push("@R14".to_string());
        out.push("M=D".to_string());

        if self.emitted_ops.insert(op) {
            // First use of this operator: the subroutine body lands here, and
            // control flows straight through it.
            out.push(format!("({})", subroutine_label(op)));
            self.write_pop_accumulator(out);
            out.push("@SP".to_string());
            out.push("AM=M-1".to_string());
            out.push(format!("D={}", compute_line(op)));
            self.write_shared_push(out);
        } else {
            out.push(format!("@{}", subroutine_label(op)));
            out.push("0;JMP".to_string());
        }

        out.push(format!("({resume})"));
    }

    /// Lowers a unary operation in place at the top of the stack.
    ///
    /// No full pop happens; the stack pointer dips for one instruction and
    /// comes right back, for a net delta of 0.
    pub(super) fn write_unary(&mut self, op: UnaryOp, out: &mut OutStream<String>) {
        out.push("@SP".to_string());
        out.push("AM=M-1".to_string());
        out.push(match op {
            UnaryOp::Neg => "M=-M".to_string(),
            UnaryOp::Not => "M=!M".to_string(),
        });
        out.push("@SP".to_string());
        out.push("M=M+1".to_string());
    }

    /// Lowers a relational comparison.
    ///
    /// Pops both operands and branches on their difference into one of two
    /// local blocks - push all-ones for true, push zero for false - then
    /// rejoins at a per-comparison label. The label triple is disambiguated
    /// by the session wide comparison counter, which increments exactly once
    /// here, so no two comparisons ever share a label.
    pub(super) fn write_comparison(&mut self, op: ComparisonOp, out: &mut OutStream<String>) {
        let index = self.compare_index;
        self.compare_index += 1;

        let push_true = format!("PUSH_TRUE_{index}");
        let push_false = format!("PUSH_FALSE_{index}");
        let jump_back = format!("JUMP_BACK_{index}");

        // D = left - right, consuming both.
        self.write_pop_accumulator(out);
        out.push("@SP".to_string());
        out.push("AM=M-1".to_string());
        out.push("D=M-D".to_string());

        out.push(format!("@{push_true}"));
        out.push(format!("D;{}", jump_condition(op)));
        out.push(format!("@{push_false}"));
        out.push("0;JMP".to_string());

        out.push(format!("({push_true})"));
        out.push(format!("@{jump_back}"));
        out.push("D=A".to_string());
        out.push("@R14".to_string());
        out.push("M=D".to_string());
        out.push("@WRITE_TRUE".to_string());
        out.push("0;JMP".to_string());

        out.push(format!("({push_false})"));
        out.push(format!("@{jump_back}"));
        out.push("D=A".to_string());
        out.push("@R14".to_string());
        out.push("M=D".to_string());
        out.push("D=0".to_string());
        self.write_shared_push(out);

        out.push(format!("({jump_back})"));
    }

    /// The shared stack push step: pushes the accumulator, then jumps to the
    /// return address in R14.
    ///
    /// The first need emits the full body at exactly this point in the
    /// output; every later need emits only a jump to it. The physical
    /// position of the body therefore depends on which command first
    /// triggered it (possibly the finalizer - see `finish`).
    pub(super) fn write_shared_push(&mut self, out: &mut OutStream<String>) {
        if !self.push_writer_emitted {
            self.push_writer_emitted = true;

            out.push("(PUSH_D)".to_string());
            self.write_push_accumulator(out);
            out.push("@R14".to_string());
            out.push("A=M".to_string());
            out.push("0;JMP".to_string());
        } else {
            out.push("@PUSH_D".to_string());
            out.push("0;JMP".to_string());
        }
    }
}

/// The label naming a binary operator's shared subroutine.
fn subroutine_label(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "DO_ADD",
        BinaryOp::Sub => "DO_SUB",
        BinaryOp::And => "DO_AND",
        BinaryOp::Or => "DO_OR",
    }
}

/// The compute expression for a binary operator, with the left operand in M
/// and the right operand in D.
fn compute_line(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add => "M+D",
        BinaryOp::Sub => "M-D",
        BinaryOp::And => "M&D",
        BinaryOp::Or => "M|D",
    }
}

/// The jump condition selecting the true branch, applied to `left - right`.
fn jump_condition(op: ComparisonOp) -> &'static str {
    match op {
        ComparisonOp::Eq => "JEQ",
        ComparisonOp::Gt => "JGT",
        ComparisonOp::Lt => "JLT",
    }
}
