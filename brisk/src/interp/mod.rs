//! Line-oriented interpreter
//!
//! The program is executed straight from its tokenized lines; there is no
//! syntax tree. See [`Interpreter`] for the execution model.

mod call;
pub mod error;
mod eval;
mod expr;
pub mod functions;
pub mod host;
pub mod ops;
pub mod scope;
pub mod types;
pub mod value;

pub use error::{ErrorKind, InterpResult, RuntimeError};
pub use eval::Interpreter;
pub use functions::{FuncId, FunctionSignature, FunctionTable, Param};
pub use host::{BufferHost, Host, StdHost};
pub use scope::ScopeStack;
pub use types::{DeclaredType, Kind};
pub use value::{Object, ObjectRef, Value};

use crate::config::Config;
use crate::lexer::TokenizedProgram;

/// Tokenize and run a program against a host
pub fn run_source(source: &str, host: &mut dyn Host, config: Config) -> InterpResult<()> {
    run_program(TokenizedProgram::from_source(source), host, config)
}

/// Run an already tokenized program against a host
pub fn run_program(program: TokenizedProgram, host: &mut dyn Host, config: Config) -> InterpResult<()> {
    Interpreter::new(program, host, config)?.run()
}
