//! The code generation engine.
//!
//! A [`CodeWriter`] translates one structured command at a time into the exact
//! sequence of assembly lines implementing it, while carrying the
//! cross-command state that correctness depends on: unique jump labels,
//! one-time emission of shared subroutines, and the function call frame
//! protocol. One `CodeWriter` is one translation session; its counters are
//! never reset, so every label it hands out is unique for the whole session.
//!
//! The submodules split the emitters by concern, but all of them are methods
//! on `CodeWriter` and share its state:
//! - [`memory`]: segment addressing, stack primitives, push/pop.
//! - [`arithmetic`]: binary, unary, and comparison lowering, plus the shared
//!   emission-once subroutines.
//! - [`flow`]: branching and the call frame protocol.

mod arithmetic;
mod flow;
mod memory;


use std::collections::{HashMap, HashSet};

use crate::command::{BinaryOp, Command, SourcedCommand};
use crate::util::OutStream;

/* Target machine conventions. */

/// RAM address of the first temp cell; `temp i` lives at `TEMP_BASE + i`.
pub const TEMP_BASE: u16 = 5;

/// Cells occupied by a call frame: four saved linkage registers plus one slot
/// for the return address. The return sequence reads the return address at
/// exactly this many cells below the frame base, so this constant and the
/// save sequence in `flow.rs` must move together.
pub const FRAME_SIZE: u16 = 5;

/// Bootstrap values for the `THIS` and `THAT` base registers.
pub const THIS_INIT: u16 = 3000;
pub const THAT_INIT: u16 = 4000;

/// The function the bootstrap sequence transfers control to.
pub const ENTRY_FUNCTION: &str = "Sys.init";

/// Translates structured commands into assembly lines, one command at a time.
///
/// All mutable translation state lives here, owned by the instance, so any
/// number of independent sessions can run without interfering.
pub struct CodeWriter {
    /// Prefix for synthesized static variable symbols. Settable between
    /// source modules; `static i` resolves to the symbol `<prefix>.<i>`.
    static_prefix: String,

    /// Counts relational comparison commands translated so far. Incremented
    /// exactly once per comparison, whichever comparator it uses, which keeps
    /// the `PUSH_TRUE_*`/`PUSH_FALSE_*`/`JUMP_BACK_*` label triples unique.
    compare_index: u32,

    /// Counts jumps made into shared subroutines, to give each call site a
    /// unique `RESUME_*` return label.
    resume_index: u32,

    /// Per-callee count of calls already translated. Builds the globally
    /// unique return address label `<callee>$ret.<n>` for each call site.
    return_indices: HashMap<String, u32>,

    /// Which per-operator arithmetic subroutines have had their bodies
    /// emitted. A body is emitted inline at first use; later uses jump to it.
    emitted_ops: HashSet<BinaryOp>,

    /// Whether the generic stack push subroutine body has been emitted.
    push_writer_emitted: bool,
}

impl CodeWriter {
    /// Creates a fresh translation session.
    ///
    /// The static prefix starts out as `"Static"`; callers translating real
    /// source modules should set it per module with
    /// [`set_static_prefix`](CodeWriter::set_static_prefix).
    pub fn new() -> CodeWriter {
        CodeWriter {
            static_prefix: "Static".to_string(),
            compare_index: 0,
            resume_index: 0,
            return_indices: HashMap::new(),
            emitted_ops: HashSet::new(),
            push_writer_emitted: false,
        }
    }

    /// Sets the namespace for static variable symbols, typically to the stem
    /// of the source module being translated. Affects only commands
    /// translated after the call.
    pub fn set_static_prefix(&mut self, prefix: &str) {
        self.static_prefix = prefix.to_string();
    }

    /// Translates a single command, appending its assembly lines to `out`.
    ///
    /// Commands must be passed in program order; output order is exactly
    /// input order. If the command carries its original source text, that
    /// text is appended as a trailing comment on the last emitted line.
    pub fn write_command(&mut self, sourced: &SourcedCommand, out: &mut OutStream<String>) {
        let mut lines = vec![];
        let mut buffer = OutStream::new(&mut lines);

        match &sourced.command {
            Command::Binary(op) => self.write_binary(*op, &mut buffer),
            Command::Comparison(op) => self.write_comparison(*op, &mut buffer),
            Command::Unary(op) => self.write_unary(*op, &mut buffer),
            Command::Push { segment, index } => self.write_push(*segment, *index, &mut buffer),
            Command::Pop { segment, index } => self.write_pop(*segment, *index, &mut buffer),
            Command::Label(name) => self.write_label(name, &mut buffer),
            Command::Goto(name) => self.write_goto(name, &mut buffer),
            Command::IfGoto(name) => self.write_if_goto(name, &mut buffer),
            Command::Function { name, locals } => self.write_function(name, *locals, &mut buffer),
            Command::Call { name, args } => self.write_call(name, *args, &mut buffer),
            Command::Return => self.write_return(&mut buffer),
        }

        if let Some(source) = &sourced.source {
            if let Some(last) = lines.last_mut() {
                last.push_str(&format!(" // {source}"));
            }
        }

        out.push_all(lines);
    }

    /// Emits the fixed startup sequence.
    ///
    /// Sets the stack pointer and the local/argument bases to `stack_base`,
    /// and the this/that bases to their fixed defaults, each by an explicit
    /// immediate-load-and-store group. When `call_entry` is set, follows with
    /// the ordinary call sequence for the entry function with zero arguments
    /// (which consumes a return index for it, like any other call).
    pub fn write_bootstrap(&mut self, stack_base: u16, call_entry: bool, out: &mut OutStream<String>) {
        out.push("// R0 SP   stack pointer".to_string());
        out.push("// R1 LCL  local segment base".to_string());
        out.push("// R2 ARG  argument segment base".to_string());
        out.push("// R3 THIS this segment base".to_string());
        out.push("// R4 THAT that segment base".to_string());

        for (register, value) in [
            ("SP", stack_base),
            ("LCL", stack_base),
            ("ARG", stack_base),
            ("THIS", THIS_INIT),
            ("THAT", THAT_INIT),
        ] {
            out.push(format!("@{value}"));
            out.push("D=A".to_string());
            out.push(format!("@{register}"));
            out.push("M=D".to_string());
        }

        if call_entry {
            self.write_call(ENTRY_FUNCTION, 0, out);
        }
    }

    /// Emits the fixed program end, once, after all commands.
    ///
    /// Appends the infinite halt loop, then the boolean true writer body
    /// (which is only ever reached by jump), then the generic stack push
    /// body if no command happened to trigger it earlier - so every shared
    /// subroutine referenced anywhere in the output is defined somewhere.
    pub fn finish(mut self, out: &mut OutStream<String>) {
        out.push("(END)".to_string());
        out.push("@END".to_string());
        out.push("0;JMP".to_string());

        out.push("(WRITE_TRUE)".to_string());
        out.push("D=-1".to_string());
        self.write_shared_push(out);
    }
}

impl Default for CodeWriter {
    fn default() -> Self {
        CodeWriter::new()
    }
}
