//! Brisk interpreter library
//!
//! A line-oriented interpreter for a small statically-kinded language with
//! first-class functions, capturing lambdas and dynamic objects.

pub mod config;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod repl;
pub mod util;

pub use config::Config;
pub use error::{BriskError, Result};
pub use interp::{run_source, Interpreter, RuntimeError, Value};
