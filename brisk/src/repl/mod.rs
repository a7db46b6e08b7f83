//! REPL (Read-Eval-Print Loop) for Brisk
//!
//! Brisk programs are whole-function line listings, so the session buffers
//! lines and runs the buffer on demand.

use crate::config::Config;
use crate::error::report_error;
use crate::interp::{run_source, StdHost};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;

const PROMPT: &str = "> ";
const HISTORY_FILE: &str = ".brisk_history";
const BUFFER_NAME: &str = "<repl>";

/// Outcome of a `:` command
#[derive(Debug, PartialEq, Eq)]
enum CommandResult {
    Continue,
    Quit,
}

/// REPL state
pub struct Repl {
    editor: DefaultEditor,
    buffer: Vec<String>,
    config: Config,
    history_path: Option<PathBuf>,
}

impl Repl {
    /// Create a new REPL
    pub fn new() -> RlResult<Self> {
        let editor = DefaultEditor::new()?;
        let history_path = dirs_home().map(|h| h.join(HISTORY_FILE));

        let mut repl = Repl {
            editor,
            buffer: Vec::new(),
            config: Config::default(),
            history_path,
        };

        if let Some(ref path) = repl.history_path {
            let _ = repl.editor.load_history(path);
        }

        Ok(repl)
    }

    /// Run the REPL
    pub fn run(&mut self) -> RlResult<()> {
        println!("Brisk REPL v{}", env!("CARGO_PKG_VERSION"));
        println!("Enter program lines, then :run. Type :help for help, :quit to exit.\n");

        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(trimmed);

                    if trimmed.starts_with(':') {
                        if self.handle_command(trimmed) == CommandResult::Quit {
                            break;
                        }
                        continue;
                    }

                    // Keep indentation: block matching depends on it
                    self.buffer.push(line.trim_end().to_owned());
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Goodbye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {err}");
                    break;
                }
            }
        }

        if let Some(ref path) = self.history_path {
            let _ = self.editor.save_history(path);
        }

        Ok(())
    }

    /// Handle REPL commands (starting with :)
    fn handle_command(&mut self, cmd: &str) -> CommandResult {
        let (name, arg) = match cmd.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (cmd, ""),
        };

        match name {
            ":quit" | ":q" | ":exit" => {
                println!("Goodbye!");
                return CommandResult::Quit;
            }
            ":help" | ":h" | ":?" => self.print_help(),
            ":run" | ":r" => self.run_buffer(),
            ":list" | ":l" => {
                for (i, line) in self.buffer.iter().enumerate() {
                    println!("{:>4}  {line}", i + 1);
                }
            }
            ":clear" => {
                self.buffer.clear();
                println!("Buffer cleared.");
            }
            ":load" if !arg.is_empty() => match self.load_file(arg) {
                Ok(count) => println!("Loaded {count} line(s) from {arg}."),
                Err(e) => eprintln!("Error: {arg}: {e}"),
            },
            ":load" => println!("Usage: :load <file>"),
            _ => {
                println!("Unknown command: {cmd}");
                println!("Type :help for help.");
            }
        }
        CommandResult::Continue
    }

    /// Print help message
    fn print_help(&self) {
        println!("Brisk REPL Commands:");
        println!("  :help, :h, :?   Show this help");
        println!("  :run, :r        Run the buffered program");
        println!("  :list, :l       Show the buffered program");
        println!("  :clear          Empty the buffer");
        println!("  :load <file>    Replace the buffer with a file's lines");
        println!("  :quit, :q       Exit the REPL");
        println!();
        println!("Any other line is appended to the buffer, for example:");
        println!("  func main void");
        println!("    funccall print \"hello\"");
        println!("  endfunc");
    }

    /// Replace the buffer with the lines of a file
    fn load_file(&mut self, path: &str) -> std::io::Result<usize> {
        let source = std::fs::read_to_string(path)?;
        self.buffer = source.lines().map(str::to_owned).collect();
        Ok(self.buffer.len())
    }

    fn source(&self) -> String {
        self.buffer.join("\n")
    }

    /// Run the buffered program against the console
    fn run_buffer(&mut self) {
        if self.buffer.is_empty() {
            println!("Buffer is empty.");
            return;
        }
        let source = self.source();
        let mut host = StdHost;
        if let Err(err) = run_source(&source, &mut host, self.config.clone()) {
            report_error(BUFFER_NAME, &source, &err.into());
        }
    }
}

/// Get home directory
fn dirs_home() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}
