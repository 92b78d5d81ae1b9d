//! Defines the structured commands of the stack machine source language.
//!
//! The parser produces these, and the code generator consumes them. Each
//! command is exactly one variant, so an "empty" or doubly-populated command
//! cannot be represented.

use crate::error::ParseError;

use std::fmt::Display;
use std::str::FromStr;

/// A single stack machine command, along with the source text it came from.
///
/// The source text, when present, is echoed into the generated assembly as a
/// trailing comment, which makes the output legible next to its input.
#[derive(Debug, Clone)]
pub struct SourcedCommand {
    /// The command itself.
    pub command: Command,

    /// The original textual form of the command, if it is known.
    pub source: Option<String>,
}

impl SourcedCommand {
    /// Wraps a command with no recorded source text.
    pub fn bare(command: Command) -> SourcedCommand {
        SourcedCommand { command, source: None }
    }
}

/// A command of the stack machine source language.
///
/// Commands operate on a conceptual stack of 16 bit words, and on eight
/// logical memory segments addressed by index (see [`Segment`]).
#[derive(Debug, Clone)]
pub enum Command {
    /// A binary arithmetic or bitwise operation. Pops two values, pushes one.
    Binary(BinaryOp),

    /// A relational comparison. Pops two values, pushes all-ones for true or
    /// zero for false.
    Comparison(ComparisonOp),

    /// A unary operation, applied in place at the top of the stack.
    Unary(UnaryOp),

    /// Pushes the value of `segment[index]` onto the stack. For the constant
    /// segment, pushes `index` itself.
    Push { segment: Segment, index: u16 },

    /// Pops the top of the stack into `segment[index]`.
    Pop { segment: Segment, index: u16 },

    /// Defines a jump target at this position in the command stream.
    Label(String),

    /// Unconditionally transfers control to the named label.
    Goto(String),

    /// Pops the top of the stack, and transfers control to the named label
    /// if the popped value is non-zero.
    IfGoto(String),

    /// Defines the entry of a function with the given number of local
    /// variables. Locals are zero-initialized.
    Function { name: String, locals: u16 },

    /// Calls a function which has been given the top `args` stack values as
    /// its arguments.
    Call { name: String, args: u16 },

    /// Returns from the current function, leaving a single return value on
    /// the caller's stack.
    Return,
}

/// The binary arithmetic and bitwise operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    And,
    Or,
}

/// The relational comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Gt,
    Lt,
}

/// The unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Arithmetic negation.
    Neg,
    /// Bitwise complement.
    Not,
}

/// The logical memory segments of the source language.
///
/// Local, Argument, This, and That are reached through a stored base pointer.
/// Temp lives at a fixed address. Pointer addresses the This/That base
/// registers themselves. Static names are synthesized per source module, and
/// Constant is not memory at all - it denotes an immediate value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Local,
    Argument,
    This,
    That,
    Constant,
    Static,
    Pointer,
    Temp,
}

impl FromStr for BinaryOp {
    type Err = ParseError; // Likely ignored by algorithm.

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use BinaryOp as B;

        Ok(match s {
            "add" => B::Add,
            "sub" => B::Sub,
            "and" => B::And,
            "or" => B::Or,
            _ => Err("Not a binary operator")?,
        })
    }
}

impl FromStr for ComparisonOp {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use ComparisonOp as C;

        Ok(match s {
            "eq" => C::Eq,
            "gt" => C::Gt,
            "lt" => C::Lt,
            _ => Err("Not a comparison operator")?,
        })
    }
}

impl FromStr for UnaryOp {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "neg" => UnaryOp::Neg,
            "not" => UnaryOp::Not,
            _ => Err("Not a unary operator")?,
        })
    }
}

impl FromStr for Segment {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use Segment as S;

        Ok(match s {
            "local" => S::Local,
            "argument" => S::Argument,
            "this" => S::This,
            "that" => S::That,
            "constant" => S::Constant,
            "static" => S::Static,
            "pointer" => S::Pointer,
            "temp" => S::Temp,
            _ => Err(format!("Unknown segment \"{s}\""))?,
        })
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Segment::Local => "local",
            Segment::Argument => "argument",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Constant => "constant",
            Segment::Static => "static",
            Segment::Pointer => "pointer",
            Segment::Temp => "temp",
        })
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        })
    }
}

impl Display for ComparisonOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ComparisonOp::Eq => "eq",
            ComparisonOp::Gt => "gt",
            ComparisonOp::Lt => "lt",
        })
    }
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            UnaryOp::Neg => "neg",
            UnaryOp::Not => "not",
        })
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Binary(op) => write!(f, "{op}"),
            Command::Comparison(op) => write!(f, "{op}"),
            Command::Unary(op) => write!(f, "{op}"),
            Command::Push { segment, index } => write!(f, "push {segment} {index}"),
            Command::Pop { segment, index } => write!(f, "pop {segment} {index}"),
            Command::Label(name) => write!(f, "label {name}"),
            Command::Goto(name) => write!(f, "goto {name}"),
            Command::IfGoto(name) => write!(f, "if-goto {name}"),
            Command::Function { name, locals } => write!(f, "function {name} {locals}"),
            Command::Call { name, args } => write!(f, "call {name} {args}"),
            Command::Return => f.write_str("return"),
        }
    }
}
