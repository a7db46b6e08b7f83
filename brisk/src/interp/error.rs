//! Errors raised while loading or running a program
//!
//! Every error is fatal: the engine stops at the first one and hands it
//! back with the offending line attached.

use std::fmt;
use thiserror::Error;

/// Error categories reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed statement shape, missing block terminator, invalid expression
    Syntax,
    /// Unknown variable, function or field, or a redeclaration
    Name,
    /// Kind mismatch in assignment, declaration, parameter, return or operator
    Type,
    /// Division by zero, overflow, bad numeric input, host I/O failure
    Fault,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Syntax => "SyntaxError",
            ErrorKind::Name => "NameError",
            ErrorKind::Type => "TypeError",
            ErrorKind::Fault => "FaultError",
        };
        f.write_str(name)
    }
}

/// Runtime error during loading or interpretation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}{}", .line.map(|l| format!(" (line {})", l + 1)).unwrap_or_default())]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
    /// Zero-based index of the offending line
    pub line: Option<usize>,
}

impl RuntimeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        RuntimeError {
            kind,
            message: message.into(),
            line: None,
        }
    }

    pub fn syntax_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Syntax, message)
    }

    pub fn name_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Name, message)
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, message)
    }

    pub fn fault(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fault, message)
    }

    pub fn undefined_variable(name: &str, hint: &str) -> Self {
        Self::name_error(format!("unknown variable `{name}`{hint}"))
    }

    pub fn undefined_function(name: &str, hint: &str) -> Self {
        Self::name_error(format!("unknown function `{name}`{hint}"))
    }

    pub fn mismatch(context: &str, expected: impl fmt::Display, got: impl fmt::Display) -> Self {
        Self::type_error(format!("{context}: expected {expected}, got {got}"))
    }

    pub fn division_by_zero() -> Self {
        Self::fault("division by zero")
    }

    pub fn overflow(op: &str) -> Self {
        Self::fault(format!("integer overflow in `{op}`"))
    }

    pub fn io_error(msg: &str) -> Self {
        Self::fault(format!("I/O error: {msg}"))
    }

    /// Attach a line if none is recorded yet
    pub fn at_line(mut self, line: usize) -> Self {
        self.line.get_or_insert(line);
        self
    }
}

/// Result type for interpreter operations
pub type InterpResult<T> = Result<T, RuntimeError>;
