//! Segment addressing and the stack primitives.
//!
//! Every higher level emitter is built out of two moves: resolve a segment
//! cell, and push or pop through the stack pointer.

use super::{CodeWriter, TEMP_BASE};
use crate::command::Segment;
use crate::util::OutStream;

impl CodeWriter {
    /// Pushes `segment[index]` (or the literal `index`, for the constant
    /// segment) onto the stack.
    pub(super) fn write_push(&mut self, segment: Segment, index: u16, out: &mut OutStream<String>) {
        self.write_segment_read(segment, index, out);
        self.write_push_accumulator(out);
    }

    /// Pops the top of the stack into `segment[index]`.
    ///
    /// The resolved target address has to be stashed in R13 before the pop,
    /// since computing it consumes both A and D. Note that the constant
    /// segment is deliberately not rejected here; its "address" is the
    /// immediate itself, and the store goes through it like any other.
    pub(super) fn write_pop(&mut self, segment: Segment, index: u16, out: &mut OutStream<String>) {
        self.write_segment_address(segment, index, out);
        out.push("D=A".to_string());
        out.push("@R13".to_string());
        out.push("M=D".to_string());

        self.write_pop_accumulator(out);

        out.push("@R13".to_string());
        out.push("A=M".to_string());
        out.push("M=D".to_string());
    }

    /// Emits the minimal sequence leaving the address register pointed at
    /// `segment[index]`.
    ///
    /// The constant segment is the one exception: there is no cell to point
    /// at, so the index itself is loaded into the accumulator instead.
    pub(super) fn write_segment_address(&self, segment: Segment, index: u16, out: &mut OutStream<String>) {
        use Segment as S;

        match segment {
            S::Local | S::Argument | S::This | S::That => {
                out.push(format!("@{}", base_register(segment)));
                out.push("D=M".to_string());
                out.push(format!("@{index}"));
                out.push("A=D+A".to_string());
            }
            S::Temp => {
                // Fixed base, no indirection through a stored pointer. Widened
                // so an index near the descriptor maximum cannot overflow.
                out.push(format!("@{}", u32::from(TEMP_BASE) + u32::from(index)));
            }
            S::Pointer => {
                // Index 1 selects THAT directly; any other index selects THIS.
                if index == 1 {
                    out.push("@THAT".to_string());
                } else {
                    out.push("@THIS".to_string());
                }
            }
            S::Static => {
                out.push(format!("@{}.{index}", self.static_prefix));
            }
            S::Constant => {
                out.push(format!("@{index}"));
                out.push("D=A".to_string());
            }
        }
    }

    /// Resolves `segment[index]` and loads its value into the accumulator.
    ///
    /// For the constant segment the resolution step already left the value in
    /// the accumulator, so no dereference happens - ever.
    pub(super) fn write_segment_read(&self, segment: Segment, index: u16, out: &mut OutStream<String>) {
        self.write_segment_address(segment, index, out);

        if segment != Segment::Constant {
            out.push("D=M".to_string());
        }
    }

    /// The generic push primitive: writes the accumulator to the cell the
    /// stack pointer points at, then increments the stack pointer.
    pub(super) fn write_push_accumulator(&self, out: &mut OutStream<String>) {
        out.push("@SP".to_string());
        out.push("A=M".to_string());
        out.push("M=D".to_string());
        out.push("@SP".to_string());
        out.push("M=M+1".to_string());
    }

    /// The generic pop primitive: decrements the stack pointer and reads the
    /// cell it now points at into the accumulator.
    pub(super) fn write_pop_accumulator(&self, out: &mut OutStream<String>) {
        out.push("@SP".to_string());
        out.push("AM=M-1".to_string());
        out.push("D=M".to_string());
    }
}

/// The base pointer register backing an indirectly addressed segment.
fn base_register(segment: Segment) -> &'static str {
    match segment {
        Segment::Local => "LCL",
        Segment::Argument => "ARG",
        Segment::This => "THIS",
        Segment::That => "THAT",
        _ => panic!("Segment {segment} has no base register"),
    }
}
