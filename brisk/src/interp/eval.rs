//! Statement execution engine
//!
//! The line index is the program counter. Each step reads the tokens at the
//! instruction pointer and dispatches on the leading keyword; every handler
//! moves the pointer itself. Block boundaries are found by scanning for the
//! matching marker at the same indentation depth.

use super::error::{InterpResult, RuntimeError};
use super::functions::FunctionTable;
use super::host::Host;
use super::scope::ScopeStack;
use super::types::DeclaredType;
use super::value::Value;
use crate::config::Config;
use crate::lexer::{kw, TokenizedProgram};
use std::collections::HashMap;
use std::rc::Rc;

/// The interpreter
pub struct Interpreter<'h> {
    pub(super) program: Rc<TokenizedProgram>,
    pub(super) functions: FunctionTable,
    pub(super) scopes: ScopeStack,
    /// Instruction pointer: index of the line to execute next
    pub(super) ip: usize,
    /// Lines to resume at, one per active call
    pub(super) return_stack: Vec<usize>,
    /// Bindings captured by the most recently executed lambda definition.
    /// Only the top of the capture stack is ever merged, so nothing older is kept.
    pub(super) latest_capture: Option<HashMap<String, Value>>,
    pub(super) host: &'h mut dyn Host,
    pub(super) config: Config,
    pub(super) terminated: bool,
}

impl<'h> Interpreter<'h> {
    /// Load a program: resolves function metadata, reporting malformed headers
    pub fn new(program: TokenizedProgram, host: &'h mut dyn Host, config: Config) -> InterpResult<Self> {
        let functions = FunctionTable::resolve(&program)?;
        Ok(Interpreter {
            program: Rc::new(program),
            functions,
            scopes: ScopeStack::new(),
            ip: 0,
            return_stack: Vec::new(),
            latest_capture: None,
            host,
            config,
            terminated: false,
        })
    }

    /// Run from the first line of the entry function until it returns
    pub fn run(&mut self) -> InterpResult<()> {
        let entry = self
            .functions
            .lookup_named(&self.config.entry)
            .ok_or_else(|| {
                RuntimeError::name_error(format!("unable to locate `{}` function", self.config.entry))
            })?;

        self.ip = self.functions.get(entry).start_line;
        self.scopes = ScopeStack::new();
        self.return_stack.clear();
        self.latest_capture = None;
        self.functions.clear_aliases();
        self.terminated = false;

        tracing::debug!(entry = %self.config.entry, start = self.ip, "running program");
        while !self.terminated {
            self.step()?;
        }
        tracing::debug!("program finished");
        Ok(())
    }

    /// Value of a variable visible from the current frame
    pub fn variable(&self, name: &str) -> Option<Value> {
        self.scopes.get(name)
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    pub fn ip(&self) -> usize {
        self.ip
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Execute the line at the instruction pointer
    fn step(&mut self) -> InterpResult<()> {
        let line = self.ip;
        self.execute_line().map_err(|e| e.at_line(line))
    }

    fn execute_line(&mut self) -> InterpResult<()> {
        if self.ip >= self.program.len() {
            return Err(RuntimeError::syntax_error(
                "reached the end of the program without `endfunc`",
            ));
        }

        let program = Rc::clone(&self.program);
        tracing::trace!(ip = self.ip, line = program.source_line(self.ip).trim_end(), "step");

        let Some((keyword, args)) = program.line_tokens(self.ip).split_first() else {
            self.advance();
            return Ok(());
        };

        match keyword.as_str() {
            kw::VAR => self.define_variables(args),
            kw::ASSIGN => self.assign(args),
            kw::FUNCCALL => self.funccall(args),
            kw::ENDFUNC => self.end_function(),
            kw::IF => self.if_statement(args),
            kw::ELSE => self.else_statement(),
            kw::ENDIF => self.endif_statement(),
            kw::WHILE => self.while_statement(args),
            kw::ENDWHILE => self.endwhile_statement(),
            kw::RETURN => self.return_statement(args),
            kw::LAMBDA => self.define_lambda(),
            kw::ENDLAMBDA => self.end_lambda(),
            kw::FUNC => Err(RuntimeError::syntax_error(
                "function definitions cannot appear inside a function body",
            )),
            other => Err(RuntimeError::syntax_error(format!("unknown statement `{other}`"))),
        }
    }

    pub(super) fn advance(&mut self) {
        self.ip += 1;
    }

    /// `var <type> <name>...`
    fn define_variables(&mut self, args: &[String]) -> InterpResult<()> {
        let [type_name, names @ ..] = args else {
            return Err(RuntimeError::syntax_error("invalid var definition syntax"));
        };
        if names.is_empty() {
            return Err(RuntimeError::syntax_error("invalid var definition syntax"));
        }
        let ty = DeclaredType::parse(type_name)
            .filter(|ty| ty.is_storable())
            .ok_or_else(|| RuntimeError::type_error(format!("invalid type `{type_name}`")))?;

        if let Some(name) = names.iter().find(|name| kw::is_reserved(name)) {
            return Err(RuntimeError::syntax_error(format!(
                "`{name}` is a reserved word and cannot name a variable"
            )));
        }
        for name in names {
            if !self.scopes.create_symbol(name, ty.default_value()) {
                return Err(RuntimeError::name_error(format!(
                    "redefinition of variable `{name}`"
                )));
            }
        }

        self.advance();
        Ok(())
    }

    /// `assign <target> <expr>` where target is a variable or `object.field`
    fn assign(&mut self, args: &[String]) -> InterpResult<()> {
        let [target, expr @ ..] = args else {
            return Err(RuntimeError::syntax_error("invalid assignment statement"));
        };
        if expr.is_empty() {
            return Err(RuntimeError::syntax_error("invalid assignment statement"));
        }

        if let Some((object_name, field)) = target.rsplit_once('.') {
            let object = self.resolve_object(object_name)?;
            let value = self.eval_expression(expr)?;
            if let Value::Func(Some(id)) = value {
                self.functions.register_alias(field, id);
            }
            object.borrow_mut().set(field.to_owned(), value);
        } else {
            let value = self.eval_expression(expr)?;
            let existing = self
                .scopes
                .get(target)
                .ok_or_else(|| self.unknown_variable(target))?;
            if existing.kind() != value.kind() {
                return Err(RuntimeError::mismatch(
                    &format!("assignment to `{target}`"),
                    existing.kind(),
                    value.kind(),
                ));
            }
            self.scopes.set(target, value);
        }

        self.advance();
        Ok(())
    }

    fn condition(&self, args: &[String], statement: &str) -> InterpResult<bool> {
        if args.is_empty() {
            return Err(RuntimeError::syntax_error(format!("missing {statement} condition")));
        }
        let value = self.eval_expression(args)?;
        value.as_bool().ok_or_else(|| {
            RuntimeError::mismatch(&format!("{statement} condition"), "bool", value.kind())
        })
    }

    fn if_statement(&mut self, args: &[String]) -> InterpResult<()> {
        if self.condition(args, kw::IF)? {
            self.advance();
            self.scopes.nest_block();
            return Ok(());
        }

        let depth = self.program.indent(self.ip);
        for line in self.ip + 1..self.program.len() {
            if self.program.indent(line) != depth {
                continue;
            }
            match self.program.keyword(line) {
                Some(kw::ENDIF) => {
                    self.ip = line + 1;
                    return Ok(());
                }
                Some(kw::ELSE) => {
                    self.ip = line + 1;
                    self.scopes.nest_block();
                    return Ok(());
                }
                _ => {}
            }
        }
        Err(RuntimeError::syntax_error("missing endif"))
    }

    /// Only reached by falling out of a taken `if` body
    fn else_statement(&mut self) -> InterpResult<()> {
        self.close_block(kw::ELSE)?;
        let depth = self.program.indent(self.ip);
        let end = (self.ip + 1..self.program.len()).find(|&line| {
            self.program.keyword(line) == Some(kw::ENDIF) && self.program.indent(line) == depth
        });
        match end {
            Some(line) => {
                self.ip = line + 1;
                Ok(())
            }
            None => Err(RuntimeError::syntax_error("missing endif")),
        }
    }

    fn endif_statement(&mut self) -> InterpResult<()> {
        self.close_block(kw::ENDIF)?;
        self.advance();
        Ok(())
    }

    fn while_statement(&mut self, args: &[String]) -> InterpResult<()> {
        if self.condition(args, kw::WHILE)? {
            self.advance();
            self.scopes.nest_block();
            return Ok(());
        }

        let depth = self.program.indent(self.ip);
        for line in self.ip + 1..self.program.len() {
            let Some(keyword) = self.program.keyword(line) else {
                continue;
            };
            let indent = self.program.indent(line);
            if keyword == kw::ENDWHILE && indent == depth {
                self.ip = line + 1;
                return Ok(());
            }
            if indent < depth {
                break;
            }
        }
        Err(RuntimeError::syntax_error("missing endwhile"))
    }

    /// Jump back to the matching `while` so its condition is re-evaluated
    fn endwhile_statement(&mut self) -> InterpResult<()> {
        self.close_block(kw::ENDWHILE)?;

        let depth = self.program.indent(self.ip);
        for line in (0..self.ip).rev() {
            let Some(keyword) = self.program.keyword(line) else {
                continue;
            };
            let indent = self.program.indent(line);
            if keyword == kw::WHILE && indent == depth {
                self.ip = line;
                return Ok(());
            }
            if indent < depth {
                break;
            }
        }
        Err(RuntimeError::syntax_error("missing while"))
    }

    fn close_block(&mut self, marker: &str) -> InterpResult<()> {
        if self.scopes.unnest_block() {
            Ok(())
        } else {
            Err(RuntimeError::syntax_error(format!(
                "`{marker}` without an open block"
            )))
        }
    }

    /// Index of the matching end marker at the depth of the line at the pointer
    pub(super) fn find_block_end(&self, marker: &str) -> Option<usize> {
        let depth = self.program.indent(self.ip);
        (self.ip + 1..self.program.len()).find(|&line| {
            self.program.keyword(line) == Some(marker) && self.program.indent(line) == depth
        })
    }
}
