//! Defines the types of errors that may occur at any stage of translation.
//! Also defines simple conversions between strings and errors, and between the
//! module errors and the overall [`TranslateError`].

/* Module Level Errors */

// We do approximately one error type per module.
// For now, errors are really just strings with a little location data. The
// important property is that a bad source line is reported, with its line
// number, instead of being silently dropped.

#[derive(Debug)]
pub enum ParseError {
    /// A problem described by a string.
    Problem(String),
    /// A problem (described by the string) localized at a 1-based source line.
    ProblemAtLine(String, usize),
}

impl ParseError {
    /// Attaches a line number to a parse error that does not have one yet.
    pub fn at_line(self, line: usize) -> ParseError {
        match self {
            ParseError::Problem(msg) => ParseError::ProblemAtLine(msg, line),
            located @ ParseError::ProblemAtLine(..) => located,
        }
    }
}

/// An error raised by the machine simulator, either while assembling the
/// generated text or while executing it.
#[derive(Debug)]
pub struct MachineError(pub String);

/* String Conversions. */

impl From<String> for ParseError {
    fn from(value: String) -> Self {
        ParseError::Problem(value)
    }
}

impl From<&str> for ParseError {
    fn from(value: &str) -> Self {
        value.to_string().into()
    }
}

impl From<String> for MachineError {
    fn from(value: String) -> Self {
        MachineError(value)
    }
}

impl From<&str> for MachineError {
    fn from(value: &str) -> Self {
        value.to_string().into()
    }
}

/* Project Level Error */

#[derive(Debug)]
pub enum TranslateError {
    /// An error associated with the translation process itself, not any one
    /// step. File system problems land here as well.
    Direct(String),
    ParseError(ParseError),
}

impl From<&str> for TranslateError {
    fn from(value: &str) -> Self {
        TranslateError::Direct(value.to_string())
    }
}

impl From<String> for TranslateError {
    fn from(value: String) -> Self {
        TranslateError::Direct(value)
    }
}

impl From<ParseError> for TranslateError {
    fn from(value: ParseError) -> Self {
        TranslateError::ParseError(value)
    }
}

/* Pretty Messages */

/// Renders a user facing message for an error, for display by the driver.
pub fn pretty_error_message(module: &str, err: &TranslateError) -> String {
    match err {
        TranslateError::Direct(msg) => {
            format!("Error occurred during translation:\n    {msg}")
        }
        TranslateError::ParseError(ParseError::Problem(msg)) => {
            format!("Error occurred while parsing {module}:\n    {msg}")
        }
        TranslateError::ParseError(ParseError::ProblemAtLine(msg, line)) => {
            format!("Error occurred while parsing {module} (line {line}):\n    {msg}")
        }
    }
}
