//! Console I/O supplied by the embedding host
//!
//! The interpreter never touches stdin/stdout directly:
//! - `StdHost`: the process console (default for the binary)
//! - `BufferHost`: captured output and scripted input, for tests and embedding

use super::error::{InterpResult, RuntimeError};
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Console primitives the engine consumes
pub trait Host {
    /// Emit one line of program output
    fn write_output(&mut self, text: &str) -> InterpResult<()>;

    /// Read one line of input, without its line terminator
    fn read_input(&mut self) -> InterpResult<String>;
}

/// Host backed by the process stdin/stdout
#[derive(Debug, Default)]
pub struct StdHost;

impl Host for StdHost {
    fn write_output(&mut self, text: &str) -> InterpResult<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{text}")
            .and_then(|_| out.flush())
            .map_err(|e| RuntimeError::io_error(&e.to_string()))
    }

    fn read_input(&mut self) -> InterpResult<String> {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map_err(|e| RuntimeError::io_error(&e.to_string()))?;
        Ok(trim_newline(line))
    }
}

/// Host that captures output lines and serves queued input lines.
/// Reading past the queued input yields empty strings.
#[derive(Debug, Default)]
pub struct BufferHost {
    output: Vec<String>,
    input: VecDeque<String>,
}

impl BufferHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BufferHost {
            output: Vec::new(),
            input: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Captured output lines
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Captured output joined with newlines
    pub fn output_text(&self) -> String {
        self.output.join("\n")
    }

    pub fn clear(&mut self) {
        self.output.clear();
    }
}

impl Host for BufferHost {
    fn write_output(&mut self, text: &str) -> InterpResult<()> {
        self.output.push(text.to_owned());
        Ok(())
    }

    fn read_input(&mut self) -> InterpResult<String> {
        Ok(self.input.pop_front().unwrap_or_default())
    }
}

fn trim_newline(mut line: String) -> String {
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_captures_output() {
        let mut host = BufferHost::new();
        host.write_output("a").unwrap();
        host.write_output("b").unwrap();
        assert_eq!(host.output(), &["a".to_string(), "b".to_string()]);
        assert_eq!(host.output_text(), "a\nb");
        host.clear();
        assert!(host.output().is_empty());
    }

    #[test]
    fn test_buffer_serves_input_in_order() {
        let mut host = BufferHost::with_input(["first", "second"]);
        assert_eq!(host.read_input().unwrap(), "first");
        assert_eq!(host.read_input().unwrap(), "second");
        assert_eq!(host.read_input().unwrap(), "");
    }

    #[test]
    fn test_trim_newline() {
        assert_eq!(trim_newline("abc\r\n".into()), "abc");
        assert_eq!(trim_newline("abc".into()), "abc");
    }
}
