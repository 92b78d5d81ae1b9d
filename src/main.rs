/* Command line driver. Translates a single .vm file, or every .vm file in a
 * directory, into one .asm program written next to the input. */

use vmtranslator::error::pretty_error_message;
use vmtranslator::{module_name, BootstrapSettings, Settings, Translator};

use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut bootstrap = true;
    let mut paths: Vec<PathBuf> = vec![];

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--no-bootstrap" => bootstrap = false,
            "--help" | "-h" => {
                eprintln!("usage: vmtranslator [--no-bootstrap] <file.vm | directory> [output.asm]");
                return ExitCode::SUCCESS;
            }
            _ => paths.push(PathBuf::from(arg)),
        }
    }

    let (input, output) = match paths.as_slice() {
        [input] => (input.clone(), default_output(input)),
        [input, output] => (input.clone(), output.clone()),
        _ => {
            eprintln!("usage: vmtranslator [--no-bootstrap] <file.vm | directory> [output.asm]");
            return ExitCode::FAILURE;
        }
    };

    let settings = if bootstrap {
        Settings { bootstrap: Some(BootstrapSettings::default()) }
    } else {
        Settings { bootstrap: None }
    };

    match translate(&input, &settings) {
        Ok(lines) => {
            let text = lines.join("\n") + "\n";

            if let Err(err) = std::fs::write(&output, text) {
                eprintln!("Could not write {}: {err}", output.display());
                return ExitCode::FAILURE;
            }

            ExitCode::SUCCESS
        }
        Err((module, err)) => {
            eprintln!("{}", pretty_error_message(&module, &err));
            ExitCode::FAILURE
        }
    }
}

/// Runs one session over the input file, or over every source file of the
/// input directory in name order.
fn translate(
    input: &Path,
    settings: &Settings,
) -> Result<Vec<String>, (String, vmtranslator::error::TranslateError)> {
    let sources = collect_sources(input).map_err(|err| (input.display().to_string(), err))?;

    let mut translator = Translator::new(settings);

    for path in &sources {
        let name = module_name(path).map_err(|err| (path.display().to_string(), err))?;

        let source = std::fs::read_to_string(path).map_err(|err| {
            (name.clone(), format!("Could not read {}: {err}", path.display()).into())
        })?;

        translator.add_module(&name, &source).map_err(|err| (name.clone(), err))?;
    }

    Ok(translator.finish())
}

/// The source files a path denotes: the file itself, or the `.vm` files of a
/// directory sorted by name.
fn collect_sources(input: &Path) -> Result<Vec<PathBuf>, vmtranslator::error::TranslateError> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }

    let entries = std::fs::read_dir(input)
        .map_err(|err| format!("Could not read directory {}: {err}", input.display()))?;

    let mut sources = vec![];
    for entry in entries {
        let path = entry.map_err(|err| format!("Could not read directory entry: {err}"))?.path();

        if path.extension().is_some_and(|extension| extension == "vm") {
            sources.push(path);
        }
    }

    if sources.is_empty() {
        return Err(format!("No .vm files found in {}", input.display()).into());
    }

    sources.sort();

    Ok(sources)
}

/// The default output path: the input with a `.asm` extension, or
/// `<directory>/<directory name>.asm` for directory input.
fn default_output(input: &Path) -> PathBuf {
    if input.is_dir() {
        let name = input.file_name().map_or_else(|| "out".into(), |name| name.to_os_string());

        input.join(name).with_extension("asm")
    } else {
        input.with_extension("asm")
    }
}
