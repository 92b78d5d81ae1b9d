//! Parses stack machine source text into structured commands.
//!
//! The source language is line oriented: one command per line, fields split
//! by whitespace, `//` starting a comment that runs to the end of the line.
//! The parser is the only producer of [`Command`] values, and it refuses bad
//! lines loudly (with their line number) rather than handing the code
//! generator anything half-formed.

#[cfg(test)]
mod tests;

use crate::command::{BinaryOp, Command, ComparisonOp, Segment, SourcedCommand, UnaryOp};
use crate::error::ParseError;

use std::str::FromStr;

/* The Algorithm. */

/// Parses a whole source module into commands, in source order.
///
/// Blank lines and comment-only lines produce nothing. Any malformed line
/// fails the whole parse, reporting its 1-based line number.
pub fn parse_source(input: &str) -> Result<Vec<SourcedCommand>, ParseError> {
    let mut commands = vec![];

    for (index, line) in input.lines().enumerate() {
        let code = strip_comment(line).trim();

        if code.is_empty() {
            continue;
        }

        let command = parse_command(code).map_err(|err| err.at_line(index + 1))?;
        commands.push(SourcedCommand { command, source: Some(code.to_string()) });
    }

    Ok(commands)
}

/// Parses a single non-empty command, already stripped of comments and
/// surrounding whitespace.
pub fn parse_command(code: &str) -> Result<Command, ParseError> {
    let mut words = code.split_ascii_whitespace();
    let keyword = words.next().ok_or("Expected a command, found nothing")?;

    let command = match keyword {
        "push" => {
            let segment = take_segment(&mut words)?;
            let index = take_index(&mut words)?;
            Command::Push { segment, index }
        }
        "pop" => {
            let segment = take_segment(&mut words)?;
            let index = take_index(&mut words)?;
            Command::Pop { segment, index }
        }
        "label" => Command::Label(take_symbol(&mut words)?),
        "goto" => Command::Goto(take_symbol(&mut words)?),
        "if-goto" => Command::IfGoto(take_symbol(&mut words)?),
        "function" => {
            let name = take_symbol(&mut words)?;
            let locals = take_index(&mut words)?;
            Command::Function { name, locals }
        }
        "call" => {
            let name = take_symbol(&mut words)?;
            let args = take_index(&mut words)?;
            Command::Call { name, args }
        }
        "return" => Command::Return,
        _ => {
            if let Ok(op) = BinaryOp::from_str(keyword) {
                Command::Binary(op)
            } else if let Ok(op) = ComparisonOp::from_str(keyword) {
                Command::Comparison(op)
            } else if let Ok(op) = UnaryOp::from_str(keyword) {
                Command::Unary(op)
            } else {
                return Err(format!("Unknown command \"{keyword}\"").into());
            }
        }
    };

    match words.next() {
        None => Ok(command),
        Some(extra) => Err(format!("Unexpected trailing operand \"{extra}\"").into()),
    }
}

/* Operand Extraction. */

/// Extracts a segment operand from the remaining words of a line.
fn take_segment<'a>(words: &mut impl Iterator<Item = &'a str>) -> Result<Segment, ParseError> {
    let word = words.next().ok_or("Expected a segment name, found end of line")?;

    Segment::from_str(word)
}

/// Extracts a non-negative index (or count) operand.
fn take_index<'a>(words: &mut impl Iterator<Item = &'a str>) -> Result<u16, ParseError> {
    let word = words.next().ok_or("Expected an index, found end of line")?;

    word.parse::<u16>().map_err(|_| format!("Bad index \"{word}\"").into())
}

/// Extracts a label or function name operand.
///
/// Symbols follow the target assembly's rules: letters, digits, `_`, `.`,
/// `$`, and `:`, not starting with a digit.
fn take_symbol<'a>(words: &mut impl Iterator<Item = &'a str>) -> Result<String, ParseError> {
    let word = words.next().ok_or("Expected a name, found end of line")?;

    let starts_with_digit = word.chars().next().is_some_and(|ch| ch.is_ascii_digit());

    if starts_with_digit || !word.chars().all(is_symbol_char) {
        return Err(format!("Bad name \"{word}\"").into());
    }

    Ok(word.to_string())
}

/* Helpers that classify pieces of a line. */

/// Drops a `//` comment, if any, from a line.
fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(position) => &line[..position],
        None => line,
    }
}

/// Helper function that determines if a character may appear in a symbol.
fn is_symbol_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' || ch == '$' || ch == ':'
}
