//! Line lexer implementation using logos
//!
//! Programs are kept as flat arrays of already-lexed lines. The lexer is
//! total: every input produces a token array, possibly empty.

mod token;

pub use token::{kw, Token};

use logos::Logos;
use serde::Serialize;

/// Tokenize a single source line
pub fn tokenize_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(line);

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push(token.into_text()),
            // Every character is covered by some rule; keep whatever slipped through
            Err(()) => tokens.push(lexer.slice().to_owned()),
        }
    }

    tokens
}

/// Leading whitespace width of a line, used as its block nesting depth
pub fn indentation(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}

/// A whole program: raw lines with their token arrays and indentation depths
#[derive(Debug, Clone, Default, Serialize)]
pub struct TokenizedProgram {
    pub lines: Vec<String>,
    pub tokens: Vec<Vec<String>>,
    pub indents: Vec<usize>,
}

impl TokenizedProgram {
    pub fn from_source(source: &str) -> Self {
        Self::from_lines(source.lines().map(str::to_owned).collect())
    }

    pub fn from_lines(lines: Vec<String>) -> Self {
        let tokens = lines.iter().map(|l| tokenize_line(l)).collect();
        let indents = lines.iter().map(|l| indentation(l)).collect();
        TokenizedProgram {
            lines,
            tokens,
            indents,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens at `line`, empty past the end of the program
    pub fn line_tokens(&self, line: usize) -> &[String] {
        self.tokens.get(line).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First token of `line`, if the line is not blank
    pub fn keyword(&self, line: usize) -> Option<&str> {
        self.line_tokens(line).first().map(String::as_str)
    }

    pub fn indent(&self, line: usize) -> usize {
        self.indents.get(line).copied().unwrap_or(0)
    }

    pub fn source_line(&self, line: usize) -> &str {
        self.lines.get(line).map(String::as_str).unwrap_or("")
    }
}
