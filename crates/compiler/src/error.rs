//! Compile-error values and caret diagnostics.
//!
//! Every front-end stage returns `Result<_, CompileError>`; nothing below
//! the top-level driver prints or exits. An error that originates at a
//! token carries the token's byte offset so the driver can render a caret
//! under the offending column.

use std::fmt;

/// A fatal compilation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    message: String,
    /// Byte offset into the source of the offending token, when known
    offset: Option<usize>,
}

impl CompileError {
    /// Error anchored at a source position (lexical, parse, semantic).
    pub fn at(offset: usize, message: impl Into<String>) -> Self {
        CompileError {
            message: message.into(),
            offset: Some(offset),
        }
    }

    /// Error with no source position (driver and internal failures).
    pub fn plain(message: impl Into<String>) -> Self {
        CompileError {
            message: message.into(),
            offset: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn offset(&self) -> Option<usize> {
        self.offset
    }

    /// Render the error the way the CLI reports it: the whole source on
    /// one line, a caret padded to the offending column, then the message.
    /// Positionless errors render as a single line.
    pub fn report(&self, source: &str) -> String {
        match self.offset {
            Some(pos) => format!("{}\n{}^ {}\n", source, " ".repeat(pos), self.message),
            None => format!("{}\n", self.message),
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CompileError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_with_caret() {
        let err = CompileError::at(4, "Invalid token.");
        assert_eq!(err.report("1+2 @"), "1+2 @\n    ^ Invalid token.\n");
    }

    #[test]
    fn test_report_at_start() {
        let err = CompileError::at(0, "Expected a number.");
        assert_eq!(err.report("+"), "+\n^ Expected a number.\n");
    }

    #[test]
    fn test_report_plain() {
        let err = CompileError::plain("internal failure");
        assert_eq!(err.report("int main(){}"), "internal failure\n");
    }
}
