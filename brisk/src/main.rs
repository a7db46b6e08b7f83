//! Brisk interpreter CLI

use brisk::config::{Config, DEFAULT_MAX_CALL_DEPTH};
use brisk::error::{report_error, Result};
use brisk::interp::{run_program, FunctionTable, StdHost};
use brisk::lexer::TokenizedProgram;
use brisk::repl::Repl;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "brisk", version, about = "Brisk - line-addressed scripting language interpreter")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a Brisk program
    Run {
        /// Source file to run
        file: PathBuf,
        /// Function where execution starts
        #[arg(long, default_value = "main")]
        entry: String,
        /// Maximum number of simultaneously active calls
        #[arg(long = "max-depth", default_value_t = DEFAULT_MAX_CALL_DEPTH)]
        max_depth: usize,
        /// Log every executed line to stderr
        #[arg(long)]
        trace: bool,
    },
    /// Tokenize and dump the program as JSON (debug)
    Tokens {
        /// Source file to tokenize
        file: PathBuf,
    },
    /// List resolved function and lambda signatures (debug)
    Functions {
        /// Source file to inspect
        file: PathBuf,
    },
    /// Start an interactive session
    Repl,
}

fn main() {
    let cli = Cli::parse();

    let ok = match cli.command {
        Command::Run {
            file,
            entry,
            max_depth,
            trace,
        } => {
            init_tracing(trace);
            let config = Config::default()
                .with_entry(entry)
                .with_max_call_depth(max_depth);
            with_source(&file, |source| run_file(source, config))
        }
        Command::Tokens { file } => with_source(&file, tokenize_file),
        Command::Functions { file } => with_source(&file, list_functions),
        Command::Repl => {
            init_tracing(false);
            match Repl::new().and_then(|mut repl| repl.run()) {
                Ok(()) => true,
                Err(e) => {
                    eprintln!("Error: {e}");
                    false
                }
            }
        }
    };

    if !ok {
        std::process::exit(1);
    }
}

/// Install the stderr subscriber. `--trace` enables line tracing for the
/// interpreter; otherwise `RUST_LOG` decides and nothing is installed without it.
fn init_tracing(trace: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if trace {
        EnvFilter::new("brisk=trace")
    } else if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        return;
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .with(filter)
        .init();
}

/// Read a source file and run `action` on it, reporting any error
fn with_source(path: &Path, action: impl FnOnce(&str) -> Result<()>) -> bool {
    let filename = path.display().to_string();
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error: {filename}: {e}");
            return false;
        }
    };

    match action(&source) {
        Ok(()) => true,
        Err(e) => {
            report_error(&filename, &source, &e);
            false
        }
    }
}

fn run_file(source: &str, config: Config) -> Result<()> {
    let program = TokenizedProgram::from_source(source);
    let mut host = StdHost;
    run_program(program, &mut host, config)?;
    Ok(())
}

fn tokenize_file(source: &str) -> Result<()> {
    let program = TokenizedProgram::from_source(source);
    let json = serde_json::to_string_pretty(&program)
        .map_err(|e| brisk::BriskError::io_error(e.to_string()))?;
    println!("{json}");
    Ok(())
}

fn list_functions(source: &str) -> Result<()> {
    let program = TokenizedProgram::from_source(source);
    let table = FunctionTable::resolve(&program)?;
    for (_, signature) in table.signatures() {
        println!("{signature} @ line {}", signature.definition_line() + 1);
    }
    Ok(())
}
