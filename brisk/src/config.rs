//! Interpreter configuration

use crate::lexer::kw;

/// Default limit on simultaneously active calls
pub const DEFAULT_MAX_CALL_DEPTH: usize = 100_000;

/// Run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Function where execution starts
    pub entry: String,
    /// Active calls allowed before the run faults
    pub max_call_depth: usize,
}

impl Config {
    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = entry.into();
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            entry: kw::MAIN.to_owned(),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}
