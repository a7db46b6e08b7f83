//! Error types and reporting

use crate::interp::{ErrorKind, RuntimeError};
use std::ops::Range;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, BriskError>;

/// Top-level error for the command line surfaces
#[derive(Debug, Error)]
pub enum BriskError {
    #[error("IO error: {message}")]
    Io { message: String },

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl BriskError {
    pub fn io_error(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Zero-based source line the error points at
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Runtime(err) => err.line,
            Self::Io { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Io { message } => message,
            Self::Runtime(err) => &err.message,
        }
    }

    fn title(&self) -> String {
        match self {
            Self::Io { .. } => "IO error".to_owned(),
            Self::Runtime(err) => err.kind.to_string(),
        }
    }
}

impl From<std::io::Error> for BriskError {
    fn from(err: std::io::Error) -> Self {
        Self::io_error(err.to_string())
    }
}

/// Character range of a zero-based line, without its terminator
fn line_span(source: &str, line: usize) -> Option<Range<usize>> {
    let mut offset = 0;
    for (index, text) in source.split_inclusive('\n').enumerate() {
        let len = text.trim_end_matches(['\n', '\r']).chars().count();
        if index == line {
            return Some(offset..offset + len);
        }
        offset += text.chars().count();
    }
    None
}

/// Report error with ariadne
pub fn report_error(filename: &str, source: &str, error: &BriskError) {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let color = match error {
        BriskError::Runtime(RuntimeError {
            kind: ErrorKind::Fault,
            ..
        }) => Color::Magenta,
        _ => Color::Red,
    };

    let printed = match error.line().and_then(|line| line_span(source, line)) {
        Some(span) => Report::build(ReportKind::Error, (filename, span.clone()))
            .with_message(error.title())
            .with_label(
                Label::new((filename, span))
                    .with_message(error.message())
                    .with_color(color),
            )
            .finish()
            .eprint((filename, Source::from(source))),
        None => Report::build(ReportKind::Error, (filename, 0..0))
            .with_message(format!("{}: {}", error.title(), error.message()))
            .finish()
            .eprint((filename, Source::from(source))),
    };

    if printed.is_err() {
        eprintln!("{error}");
    }
}
