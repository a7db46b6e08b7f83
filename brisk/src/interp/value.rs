//! Runtime values for the interpreter

use super::functions::FuncId;
use super::types::Kind;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Shared handle to an object; assignment copies the handle
pub type ObjectRef = Rc<RefCell<Object>>;

/// Runtime value
#[derive(Debug, Clone)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Str(String),
    Void,
    /// Function value; `None` is the placeholder held by an unassigned `func` variable
    Func(Option<FuncId>),
    Object(ObjectRef),
}

impl Value {
    pub fn new_object() -> Self {
        Value::Object(Rc::new(RefCell::new(Object::default())))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Int(_) => Kind::Int,
            Value::Bool(_) => Kind::Bool,
            Value::Str(_) => Kind::Str,
            Value::Void => Kind::Void,
            Value::Func(_) => Kind::Func,
            Value::Object(_) => Kind::Object,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Copy that shares nothing mutable with `self`, objects included.
    /// Cycles between objects are preserved rather than unrolled.
    pub fn deep_copy(&self) -> Value {
        let mut seen = HashMap::new();
        self.deep_copy_with(&mut seen)
    }

    fn deep_copy_with(&self, seen: &mut HashMap<*const RefCell<Object>, ObjectRef>) -> Value {
        match self {
            Value::Object(obj) => {
                let key = Rc::as_ptr(obj);
                if let Some(copy) = seen.get(&key) {
                    return Value::Object(Rc::clone(copy));
                }
                let copy = Rc::new(RefCell::new(Object::default()));
                seen.insert(key, Rc::clone(&copy));
                let fields: Vec<(String, Value)> = obj
                    .borrow()
                    .fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                for (name, value) in fields {
                    let value = value.deep_copy_with(seen);
                    copy.borrow_mut().set(name, value);
                }
                Value::Object(copy)
            }
            other => other.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Str(s) => f.write_str(s),
            Value::Void => f.write_str("void"),
            Value::Func(_) => f.write_str("<func>"),
            Value::Object(_) => f.write_str("<object>"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Void, Value::Void) => true,
            (Value::Func(a), Value::Func(b)) => a == b,
            // Objects compare by identity
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Dynamically keyed record; a field holding a function value acts as a method
#[derive(Debug, Default)]
pub struct Object {
    fields: HashMap<String, Value>,
}

impl Object {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Write or create a field
    pub fn set(&mut self, field: String, value: Value) {
        self.fields.insert(field, value);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// New object whose fields are copies of this one's; nested objects stay shared
    pub fn shallow_copy(&self) -> ObjectRef {
        Rc::new(RefCell::new(Object {
            fields: self.fields.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object_with(fields: &[(&str, Value)]) -> Value {
        let obj = Value::new_object();
        if let Value::Object(o) = &obj {
            for (name, value) in fields {
                o.borrow_mut().set(name.to_string(), value.clone());
            }
        }
        obj
    }

    #[test]
    fn test_value_display() {
        assert_eq!(format!("{}", Value::Int(-42)), "-42");
        assert_eq!(format!("{}", Value::Bool(true)), "true");
        assert_eq!(format!("{}", Value::Str("hi there".into())), "hi there");
        assert_eq!(format!("{}", Value::Void), "void");
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(Value::Int(1).kind(), Kind::Int);
        assert_eq!(Value::Func(None).kind(), Kind::Func);
        assert_eq!(Value::new_object().kind(), Kind::Object);
    }

    #[test]
    fn test_object_handles_alias() {
        let a = object_with(&[("x", Value::Int(1))]);
        let b = a.clone();
        b.as_object().unwrap().borrow_mut().set("x".into(), Value::Int(2));
        assert_eq!(a.as_object().unwrap().borrow().get("x"), Some(&Value::Int(2)));
        assert_eq!(a, b);
    }

    #[test]
    fn test_deep_copy_is_independent() {
        let inner = object_with(&[("n", Value::Int(1))]);
        let outer = object_with(&[("inner", inner.clone())]);
        let copy = outer.deep_copy();
        inner.as_object().unwrap().borrow_mut().set("n".into(), Value::Int(9));

        let copied_inner = copy.as_object().unwrap().borrow().get("inner").cloned().unwrap();
        assert_eq!(copied_inner.as_object().unwrap().borrow().get("n"), Some(&Value::Int(1)));
        assert_ne!(copy, outer);
    }

    #[test]
    fn test_deep_copy_keeps_cycles() {
        let obj = Value::new_object();
        let handle = obj.as_object().unwrap().clone();
        handle.borrow_mut().set("me".into(), obj.clone());

        let copy = obj.deep_copy();
        let copy_ref = copy.as_object().unwrap();
        let me = copy_ref.borrow().get("me").cloned().unwrap();
        assert_eq!(me, copy);
    }

    #[test]
    fn test_shallow_copy_shares_nested() {
        let inner = object_with(&[("n", Value::Int(1))]);
        let outer = object_with(&[("inner", inner.clone()), ("k", Value::Int(5))]);
        let copy = outer.as_object().unwrap().borrow().shallow_copy();

        copy.borrow_mut().set("k".into(), Value::Int(6));
        assert_eq!(outer.as_object().unwrap().borrow().get("k"), Some(&Value::Int(5)));
        assert_eq!(copy.borrow().get("inner"), Some(&inner));
    }
}
