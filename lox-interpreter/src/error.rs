use lox_syntax::position::Span;
use std::error::Error;
use std::fmt;

/// An error raised while resolving or evaluating a program. The message is
/// the user-facing text; drivers prepend the `[line L]` prefix computed from
/// the span.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub span: Span,
    pub message: String,
}

impl RuntimeError {
    pub fn new<S: Into<String>>(span: Span, message: S) -> RuntimeError {
        RuntimeError {
            span,
            message: message.into(),
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for RuntimeError {}
