//! Operator table
//!
//! Binary operators are only legal for the kinds that register them; both
//! operands must share one kind.

use super::error::{InterpResult, RuntimeError};
use super::types::Kind;
use super::value::Value;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

const INT_OPS: &[BinOp] = &[
    BinOp::Add,
    BinOp::Sub,
    BinOp::Mul,
    BinOp::Div,
    BinOp::Rem,
    BinOp::Eq,
    BinOp::Ne,
    BinOp::Lt,
    BinOp::Le,
    BinOp::Gt,
    BinOp::Ge,
];

const STRING_OPS: &[BinOp] = &[
    BinOp::Add,
    BinOp::Eq,
    BinOp::Ne,
    BinOp::Lt,
    BinOp::Le,
    BinOp::Gt,
    BinOp::Ge,
];

const BOOL_OPS: &[BinOp] = &[BinOp::And, BinOp::Or, BinOp::Eq, BinOp::Ne];

/// Unary logical negation token
pub const NOT: &str = "!";

impl BinOp {
    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token {
            "+" => BinOp::Add,
            "-" => BinOp::Sub,
            "*" => BinOp::Mul,
            "/" => BinOp::Div,
            "%" => BinOp::Rem,
            "==" => BinOp::Eq,
            "!=" => BinOp::Ne,
            "<" => BinOp::Lt,
            "<=" => BinOp::Le,
            ">" => BinOp::Gt,
            ">=" => BinOp::Ge,
            "&" => BinOp::And,
            "|" => BinOp::Or,
            _ => return None,
        };
        Some(op)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&",
            BinOp::Or => "|",
        }
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operators registered for a kind
pub fn operators_for(kind: Kind) -> &'static [BinOp] {
    match kind {
        Kind::Int => INT_OPS,
        Kind::Str => STRING_OPS,
        Kind::Bool => BOOL_OPS,
        Kind::Void | Kind::Func | Kind::Object => &[],
    }
}

/// Apply a binary operator to two operands of the same kind
pub fn eval_binary(op: BinOp, left: Value, right: Value) -> InterpResult<Value> {
    if left.kind() != right.kind() {
        return Err(RuntimeError::type_error(format!(
            "mismatched operand kinds {} and {} for `{op}`",
            left.kind(),
            right.kind()
        )));
    }
    if !operators_for(left.kind()).contains(&op) {
        return Err(RuntimeError::type_error(format!(
            "operator `{op}` is not compatible with {}",
            left.kind()
        )));
    }

    match (left, right) {
        (Value::Int(a), Value::Int(b)) => eval_int(op, a, b),
        (Value::Str(a), Value::Str(b)) => match op {
            BinOp::Add => Ok(Value::Str(a + &b)),
            _ => Ok(Value::Bool(compare(op, a.cmp(&b)))),
        },
        (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(match op {
            BinOp::And => a && b,
            BinOp::Or => a || b,
            BinOp::Eq => a == b,
            _ => a != b,
        })),
        (left, _) => Err(RuntimeError::type_error(format!(
            "operator `{op}` is not compatible with {}",
            left.kind()
        ))),
    }
}

/// Logical negation
pub fn eval_not(value: Value) -> InterpResult<Value> {
    match value {
        Value::Bool(b) => Ok(Value::Bool(!b)),
        other => Err(RuntimeError::mismatch("operand of `!`", Kind::Bool, other.kind())),
    }
}

fn eval_int(op: BinOp, a: i64, b: i64) -> InterpResult<Value> {
    let overflow = || RuntimeError::overflow(op.as_str());
    let n = match op {
        BinOp::Add => a.checked_add(b).ok_or_else(overflow)?,
        BinOp::Sub => a.checked_sub(b).ok_or_else(overflow)?,
        BinOp::Mul => a.checked_mul(b).ok_or_else(overflow)?,
        BinOp::Div => floor_div(a, b)?,
        BinOp::Rem => floor_rem(a, b)?,
        _ => return Ok(Value::Bool(compare(op, a.cmp(&b)))),
    };
    Ok(Value::Int(n))
}

fn compare(op: BinOp, ord: Ordering) -> bool {
    match op {
        BinOp::Eq => ord == Ordering::Equal,
        BinOp::Ne => ord != Ordering::Equal,
        BinOp::Lt => ord == Ordering::Less,
        BinOp::Le => ord != Ordering::Greater,
        BinOp::Gt => ord == Ordering::Greater,
        BinOp::Ge => ord != Ordering::Less,
        _ => false,
    }
}

/// Integer division rounding toward negative infinity: `/ -7 2` is -4
pub fn floor_div(a: i64, b: i64) -> InterpResult<i64> {
    if b == 0 {
        return Err(RuntimeError::division_by_zero());
    }
    let q = a.checked_div(b).ok_or_else(|| RuntimeError::overflow("/"))?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

/// Remainder taking the sign of the divisor, consistent with [`floor_div`]
pub fn floor_rem(a: i64, b: i64) -> InterpResult<i64> {
    if b == 0 {
        return Err(RuntimeError::division_by_zero());
    }
    // i64::MIN % -1 is mathematically 0
    let r = a.checked_rem(b).unwrap_or(0);
    if r != 0 && ((r < 0) != (b < 0)) {
        Ok(r + b)
    } else {
        Ok(r)
    }
}
