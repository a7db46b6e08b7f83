//! Calls, returns, lambdas and the built-in functions
//!
//! A call evaluates its arguments in the caller's frame, pushes the resume
//! line, opens a fresh frame and jumps to the callee's first body line.
//! Returning pops the frame and publishes the value through the caller's
//! `result*` binding for its kind.

use super::error::{InterpResult, RuntimeError};
use super::eval::Interpreter;
use super::functions::{FunctionTable, Param};
use super::scope::Binding;
use super::types::{DeclaredType, Kind};
use super::value::Value;
use crate::lexer::kw;

impl Interpreter<'_> {
    /// `funccall <name> <arg>...`
    pub(super) fn funccall(&mut self, args: &[String]) -> InterpResult<()> {
        let [name, actuals @ ..] = args else {
            return Err(RuntimeError::syntax_error("missing function name in funccall"));
        };

        match name.as_str() {
            kw::PRINT => self.builtin_print(actuals)?,
            kw::INPUT => self.builtin_input(actuals)?,
            kw::STRTOINT => self.builtin_strtoint(actuals)?,
            _ => return self.call_function(name, actuals),
        }
        self.advance();
        Ok(())
    }

    fn builtin_print(&mut self, actuals: &[String]) -> InterpResult<()> {
        if actuals.is_empty() {
            return Err(RuntimeError::syntax_error("print needs at least one argument"));
        }
        let text = self.render(actuals)?;
        self.host.write_output(&text)
    }

    /// Optional prompt, then one line of input into `results`
    fn builtin_input(&mut self, actuals: &[String]) -> InterpResult<()> {
        if !actuals.is_empty() {
            let prompt = self.render(actuals)?;
            self.host.write_output(&prompt)?;
        }
        let line = self.host.read_input()?;
        self.set_result(Value::Str(line));
        Ok(())
    }

    fn builtin_strtoint(&mut self, actuals: &[String]) -> InterpResult<()> {
        let [actual] = actuals else {
            return Err(RuntimeError::syntax_error("strtoint takes exactly one argument"));
        };
        let text = match self.resolve_token(actual)? {
            Value::Str(text) => text,
            other => {
                return Err(RuntimeError::mismatch("argument of strtoint", Kind::Str, other.kind()));
            }
        };
        let n = text.trim().parse::<i64>().map_err(|_| {
            RuntimeError::fault(format!("cannot convert \"{text}\" to an integer"))
        })?;
        self.set_result(Value::Int(n));
        Ok(())
    }

    fn render(&self, actuals: &[String]) -> InterpResult<String> {
        let mut text = String::new();
        for actual in actuals {
            text.push_str(&self.resolve_token(actual)?.to_string());
        }
        Ok(text)
    }

    /// Invoke a named function, lambda value or object method
    fn call_function(&mut self, name: &str, actuals: &[String]) -> InterpResult<()> {
        let callee = self.resolve_callee(name)?;
        let signature = self.functions.get(callee.id).clone();

        if signature.params.len() != actuals.len() {
            return Err(RuntimeError::name_error(format!(
                "`{}` expects {} argument(s), got {}",
                name,
                signature.params.len(),
                actuals.len()
            )));
        }

        let mut bindings = Vec::with_capacity(actuals.len() + 1);
        if let Some(receiver) = callee.receiver {
            bindings.push((kw::THIS.to_owned(), receiver));
        }
        for (param, actual) in signature.params.iter().zip(actuals) {
            let binding = self.bind_argument(name, param, actual)?;
            bindings.push((param.name.clone(), binding));
        }

        if self.return_stack.len() >= self.config.max_call_depth {
            return Err(RuntimeError::fault(format!(
                "maximum call depth of {} exceeded",
                self.config.max_call_depth
            )));
        }

        tracing::debug!(function = %signature.name, depth = self.return_stack.len() + 1, "call");
        self.return_stack.push(self.ip + 1);
        self.scopes.push_frame();
        self.ip = signature.start_line;

        if self.functions.enclosing_lambda_return(self.ip).is_some() {
            if let Some(capture) = &self.latest_capture {
                self.scopes.import_bindings(
                    capture
                        .iter()
                        .map(|(name, value)| (name.clone(), Binding::Value(value.deep_copy()))),
                );
            }
        }
        self.scopes.import_bindings(bindings);
        Ok(())
    }

    /// Evaluate one actual against its formal. Reference formals alias the
    /// caller's variable when the actual names one.
    fn bind_argument(&self, callee: &str, param: &Param, actual: &str) -> InterpResult<Binding> {
        let value = self.resolve_token(actual)?;
        if value.kind() != param.ty.kind() {
            return Err(RuntimeError::mismatch(
                &format!("argument `{}` of `{callee}`", param.name),
                param.ty,
                value.kind(),
            ));
        }

        if param.ty.is_reference() {
            if let Some(cell) = self.scopes.cell(actual) {
                return Ok(Binding::Alias(cell));
            }
        }
        Ok(Binding::Value(value))
    }

    /// `return [expr]`
    pub(super) fn return_statement(&mut self, args: &[String]) -> InterpResult<()> {
        let (return_type, in_lambda) = match self.functions.enclosing_lambda_return(self.ip) {
            Some(ty) => (ty, true),
            None => {
                let ty = self
                    .functions
                    .enclosing_function_return(self.ip)
                    .ok_or_else(|| RuntimeError::syntax_error("return outside of a function"))?;
                (ty, false)
            }
        };

        if args.is_empty() {
            return self.unwind(None, in_lambda);
        }
        if return_type == DeclaredType::Void {
            return Err(RuntimeError::type_error("cannot return a value from a void function"));
        }

        let value = if return_type.kind() == Kind::Func {
            let [token] = args else {
                return Err(RuntimeError::type_error("a func return must name a single function"));
            };
            self.resolve_function_token(token)?
        } else {
            self.eval_expression(args)?
        };

        if value.kind() != return_type.kind() {
            return Err(RuntimeError::mismatch("return value", return_type, value.kind()));
        }
        self.unwind(Some(value), in_lambda)
    }

    pub(super) fn end_function(&mut self) -> InterpResult<()> {
        self.unwind(None, false)
    }

    pub(super) fn end_lambda(&mut self) -> InterpResult<()> {
        self.unwind(None, true)
    }

    /// Leave the current invocation. Without a value the declared type's
    /// default is published; returning from the entry function ends the run.
    fn unwind(&mut self, value: Option<Value>, in_lambda: bool) -> InterpResult<()> {
        let declared = if in_lambda {
            self.functions.enclosing_lambda_return(self.ip)
        } else {
            self.functions.enclosing_function_return(self.ip)
        };

        let Some(resume) = self.return_stack.pop() else {
            self.terminated = true;
            return Ok(());
        };

        self.scopes.pop_frame();
        let result = value.or_else(|| {
            declared
                .filter(|ty| *ty != DeclaredType::Void)
                .map(DeclaredType::default_value)
        });
        if let Some(result) = result {
            self.set_result(result);
        }
        tracing::debug!(resume, depth = self.return_stack.len(), "return");
        self.ip = resume;
        Ok(())
    }

    /// Publish a value through the current frame's `result*` binding.
    /// Objects are published as a shallow copy.
    pub(super) fn set_result(&mut self, value: Value) {
        let Some(name) = value.kind().result_binding() else {
            return;
        };
        let value = match value {
            Value::Object(object) => {
                let copy = object.borrow().shallow_copy();
                Value::Object(copy)
            }
            other => other,
        };
        self.scopes.create_in_frame_root(name, value);
    }

    /// `lambda ...`: capture the visible bindings, publish the lambda through
    /// `resultf` and skip its body
    pub(super) fn define_lambda(&mut self) -> InterpResult<()> {
        let name = FunctionTable::lambda_name(self.ip);
        let id = self
            .functions
            .lookup(&name)
            .ok_or_else(|| RuntimeError::syntax_error("malformed lambda header"))?;

        let bindings = self.scopes.snapshot_visible();
        tracing::debug!(lambda = %name, captured = bindings.len(), "capture");
        self.latest_capture = Some(bindings);
        self.set_result(Value::Func(Some(id)));

        let end = self
            .find_block_end(kw::ENDLAMBDA)
            .ok_or_else(|| RuntimeError::syntax_error("missing endlambda"))?;
        self.ip = end + 1;
        Ok(())
    }
}
