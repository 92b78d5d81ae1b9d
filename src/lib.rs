//! Top level module which organizes a translation session.
//!
//! A session turns stack machine source modules into one assembly program:
//! the optional bootstrap comes first, then every command of every module in
//! order, then the fixed finalization. The interesting work happens in
//! [`codegen`]; this module wires the parser and the code writer together and
//! owns the output buffer.
//!
//! See README.md for documentation for the project as a whole.

// I use `cargo clippy -- -D clippy::pedantic`
#![allow(
    clippy::missing_errors_doc,  // The error conditions are documented where interesting.
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::cast_sign_loss,  // The machine works in 16 bit words; casts are deliberate.
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
)]

pub mod command;
pub mod machine;

mod codegen;
mod parser;

pub mod error;
mod util;

use std::path::Path;

use codegen::CodeWriter;
use command::SourcedCommand;
use error::TranslateError;
use util::OutStream;

/// Configuration for the fixed startup sequence.
#[derive(Debug, Clone)]
pub struct BootstrapSettings {
    /// Whether the bootstrap ends by calling the program's entry function
    /// (`Sys.init`) with zero arguments.
    pub call_entry: bool,

    /// The initial value of the stack pointer and the local/argument bases.
    pub stack_base: u16,
}

impl Default for BootstrapSettings {
    fn default() -> Self {
        BootstrapSettings { call_entry: true, stack_base: 256 }
    }
}

/// Configuration for a whole translation session, supplied once at start.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// The bootstrap to emit before any translated command, or `None` to emit
    /// none at all (useful for translating fragments under test harnesses
    /// that set up the registers themselves).
    pub bootstrap: Option<BootstrapSettings>,
}

impl Settings {
    /// The standard whole-program configuration: bootstrap at stack base 256,
    /// entry function invoked.
    pub fn whole_program() -> Settings {
        Settings { bootstrap: Some(BootstrapSettings::default()) }
    }
}

/// A single translation session.
///
/// Modules are added in order; each sets the static variable namespace from
/// its name. Finishing the session appends the fixed program end and yields
/// the completed assembly listing.
pub struct Translator {
    writer: CodeWriter,
    output: Vec<String>,
}

impl Translator {
    /// Starts a session, emitting the bootstrap if one is configured.
    pub fn new(settings: &Settings) -> Translator {
        let mut writer = CodeWriter::new();
        let mut output = vec![];

        if let Some(bootstrap) = &settings.bootstrap {
            writer.write_bootstrap(bootstrap.stack_base, bootstrap.call_entry, &mut OutStream::new(&mut output));
        }

        Translator { writer, output }
    }

    /// Parses and translates one source module.
    ///
    /// The module name (typically the source file stem) namespaces the
    /// module's static variables.
    pub fn add_module(&mut self, name: &str, source: &str) -> Result<(), TranslateError> {
        self.writer.set_static_prefix(name);

        let commands = parser::parse_source(source)?;
        self.add_commands(&commands);

        Ok(())
    }

    /// Translates already-structured commands, in order.
    ///
    /// Commands added this way share whatever static prefix is current.
    pub fn add_commands(&mut self, commands: &[SourcedCommand]) {
        let mut out = OutStream::new(&mut self.output);

        for command in commands {
            self.writer.write_command(command, &mut out);
        }
    }

    /// Ends the session, appending the fixed finalization, and returns the
    /// complete assembly listing.
    pub fn finish(self) -> Vec<String> {
        let Translator { writer, mut output } = self;

        writer.finish(&mut OutStream::new(&mut output));

        output
    }
}

/// Translates a single module given as a string.
pub fn translate_string(name: &str, source: &str, settings: &Settings) -> Result<Vec<String>, TranslateError> {
    let mut translator = Translator::new(settings);
    translator.add_module(name, source)?;

    Ok(translator.finish())
}

/// Translates a single source file, naming its module after the file stem.
pub fn translate_file(path: &Path, settings: &Settings) -> Result<Vec<String>, TranslateError> {
    let name = module_name(path)?;
    let source = std::fs::read_to_string(path)
        .map_err(|err| TranslateError::Direct(format!("Could not read {}: {err}", path.display())))?;

    translate_string(&name, &source, settings)
}

/// The module name of a source file: its file stem.
pub fn module_name(path: &Path) -> Result<String, TranslateError> {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| TranslateError::Direct(format!("Bad source path {}", path.display())))?;

    Ok(stem.to_string())
}
