//! Code generation error types.
//!
//! The emitter can only fail in two ways of its own: the tree hands it a
//! node that breaks the addressability or typing contracts the parser is
//! supposed to uphold, or a write into the output buffer fails. Each
//! contract breach names the offending form so the report points at the
//! broken invariant, and `From<fmt::Error>` lets `writeln!` compose with
//! `?` throughout the emitter.

#[derive(Debug, PartialEq, Eq)]
pub enum CodeGenError {
    /// The address of a form that has none was requested (only variables
    /// and dereferences are addressable)
    NotAddressable(&'static str),
    /// A variable node arrived without a type, so the emitter cannot
    /// decide between loading it and taking its array address
    Untyped(&'static str),
    /// A write into the output buffer failed
    Format(std::fmt::Error),
}

impl std::fmt::Display for CodeGenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodeGenError::NotAddressable(form) => {
                write!(f, "not an addressable expression: {}", form)
            }
            CodeGenError::Untyped(form) => write!(f, "untyped {} reached the emitter", form),
            CodeGenError::Format(e) => write!(f, "assembly generation error: {}", e),
        }
    }
}

impl std::error::Error for CodeGenError {}

impl From<std::fmt::Error> for CodeGenError {
    fn from(e: std::fmt::Error) -> Self {
        CodeGenError::Format(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_failing_form() {
        let err = CodeGenError::NotAddressable("binary operation");
        assert_eq!(
            err.to_string(),
            "not an addressable expression: binary operation"
        );

        let err = CodeGenError::Untyped("local variable");
        assert_eq!(err.to_string(), "untyped local variable reached the emitter");
    }
}
