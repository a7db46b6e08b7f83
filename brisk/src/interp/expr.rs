//! Token resolution and prefix expression evaluation
//!
//! Expressions are prefix (Polish) notation: `+ 2 * 3 4`. The tokens are
//! scanned right to left with an operand stack, so an operator always finds
//! its operands already evaluated on top of the stack.

use super::error::{InterpResult, RuntimeError};
use super::eval::Interpreter;
use super::functions::FuncId;
use super::ops::{self, BinOp};
use super::scope::Binding;
use super::types::Kind;
use super::value::{ObjectRef, Value};
use crate::lexer::kw;
use crate::util::{find_similar_name, format_suggestion_hint, SUGGESTION_THRESHOLD};
use std::num::IntErrorKind;

/// Resolved call target
pub(super) struct Callee {
    pub(super) id: FuncId,
    /// `this` binding for method calls
    pub(super) receiver: Option<Binding>,
}

impl Interpreter<'_> {
    /// Evaluate a prefix expression to a single value
    pub(super) fn eval_expression(&self, tokens: &[String]) -> InterpResult<Value> {
        let mut stack: Vec<Value> = Vec::with_capacity(tokens.len());

        for token in tokens.iter().rev() {
            if let Some(op) = BinOp::from_token(token) {
                let (Some(left), Some(right)) = (stack.pop(), stack.pop()) else {
                    return Err(RuntimeError::syntax_error(format!(
                        "invalid expression: `{op}` needs two operands"
                    )));
                };
                stack.push(ops::eval_binary(op, left, right)?);
            } else if token == ops::NOT {
                let operand = stack.pop().ok_or_else(|| {
                    RuntimeError::syntax_error("invalid expression: `!` needs an operand")
                })?;
                stack.push(ops::eval_not(operand)?);
            } else {
                stack.push(self.resolve_token(token)?);
            }
        }

        match (stack.pop(), stack.is_empty()) {
            (Some(value), true) => Ok(value),
            _ => Err(RuntimeError::syntax_error(format!(
                "invalid expression `{}`",
                tokens.join(" ")
            ))),
        }
    }

    /// Resolve a single operand token: literal, `object.field`, or name
    pub(super) fn resolve_token(&self, token: &str) -> InterpResult<Value> {
        if let Some(text) = token.strip_prefix('"') {
            return Ok(Value::Str(text.strip_suffix('"').unwrap_or(text).to_owned()));
        }
        if is_int_literal(token) {
            return parse_int(token).map(Value::Int);
        }
        match token {
            kw::TRUE => return Ok(Value::Bool(true)),
            kw::FALSE => return Ok(Value::Bool(false)),
            _ => {}
        }

        if let Some((object_name, field)) = token.rsplit_once('.') {
            let object = self.resolve_object(object_name)?;
            let value = object.borrow().get(field).cloned();
            return value.ok_or_else(|| {
                RuntimeError::name_error(format!("`{object_name}` has no field `{field}`"))
            });
        }

        self.lookup_name(token)
    }

    /// Variables first, then named functions, then field aliases
    fn lookup_name(&self, name: &str) -> InterpResult<Value> {
        if let Some(value) = self.scopes.get(name) {
            return Ok(value);
        }
        if let Some(id) = self
            .functions
            .lookup_named(name)
            .or_else(|| self.functions.lookup_alias(name))
        {
            return Ok(Value::Func(Some(id)));
        }
        Err(self.unknown_variable(name))
    }

    /// Resolve a token that must name an object
    pub(super) fn resolve_object(&self, token: &str) -> InterpResult<ObjectRef> {
        match self.resolve_token(token)? {
            Value::Object(object) => Ok(object),
            other => Err(RuntimeError::mismatch(
                &format!("field access on `{token}`"),
                Kind::Object,
                other.kind(),
            )),
        }
    }

    /// Resolve the function named by a `funccall` target
    pub(super) fn resolve_callee(&self, name: &str) -> InterpResult<Callee> {
        if let Some((object_name, method)) = name.rsplit_once('.') {
            let object = self.resolve_object(object_name)?;
            let field = object.borrow().get(method).cloned().ok_or_else(|| {
                RuntimeError::name_error(format!("`{object_name}` has no method `{method}`"))
            })?;
            let id = function_id(name, field)?;
            let receiver = match self.scopes.cell(object_name) {
                Some(cell) => Binding::Alias(cell),
                None => Binding::Value(Value::Object(object)),
            };
            return Ok(Callee {
                id,
                receiver: Some(receiver),
            });
        }

        if let Some(value) = self.scopes.get(name) {
            return Ok(Callee {
                id: function_id(name, value)?,
                receiver: None,
            });
        }

        self.functions
            .lookup_named(name)
            .or_else(|| self.functions.lookup_alias(name))
            .map(|id| Callee { id, receiver: None })
            .ok_or_else(|| {
                let suggestion = find_similar_name(name, self.functions.names(), SUGGESTION_THRESHOLD);
                let hint = format_suggestion_hint(suggestion);
                RuntimeError::undefined_function(name, &hint)
            })
    }

    /// Resolve a token that must name a function, as in `return f` from a func-typed body
    pub(super) fn resolve_function_token(&self, token: &str) -> InterpResult<Value> {
        match self.resolve_token(token) {
            Ok(value @ Value::Func(_)) => Ok(value),
            _ => Err(RuntimeError::type_error(format!(
                "`{token}` does not name a function"
            ))),
        }
    }

    pub(super) fn unknown_variable(&self, name: &str) -> RuntimeError {
        let mut candidates = self.scopes.visible_names();
        candidates.extend(self.functions.names());
        let hint = format_suggestion_hint(find_similar_name(name, candidates, SUGGESTION_THRESHOLD));
        RuntimeError::undefined_variable(name, &hint)
    }
}

fn function_id(name: &str, value: Value) -> InterpResult<FuncId> {
    match value {
        Value::Func(Some(id)) => Ok(id),
        Value::Func(None) => Err(RuntimeError::name_error(format!(
            "function variable `{name}` has not been assigned"
        ))),
        other => Err(RuntimeError::mismatch(
            &format!("call of `{name}`"),
            Kind::Func,
            other.kind(),
        )),
    }
}

/// All digits, or a leading `-` followed by more text. A bare `-` is the operator.
fn is_int_literal(token: &str) -> bool {
    match token.strip_prefix('-') {
        Some(rest) => !rest.is_empty(),
        None => !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()),
    }
}

fn parse_int(token: &str) -> InterpResult<i64> {
    token.parse::<i64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            RuntimeError::fault(format!("integer literal `{token}` is out of range"))
        }
        _ => RuntimeError::syntax_error(format!("invalid integer literal `{token}`")),
    })
}
