//! Value kinds and declared type names

use super::value::Value;
use crate::lexer::kw;
use std::fmt;

/// Runtime kind tag of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Int,
    Bool,
    Str,
    Void,
    Func,
    Object,
}

impl Kind {
    /// Name of the result binding a call producing this kind writes to
    pub fn result_binding(self) -> Option<&'static str> {
        match self {
            Kind::Int => Some("resulti"),
            Kind::Bool => Some("resultb"),
            Kind::Str => Some("results"),
            Kind::Func => Some("resultf"),
            Kind::Object => Some("resulto"),
            Kind::Void => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Int => kw::INT,
            Kind::Bool => kw::BOOL,
            Kind::Str => kw::STRING,
            Kind::Void => kw::VOID,
            Kind::Func => kw::FUNC,
            Kind::Object => kw::OBJECT,
        };
        f.write_str(name)
    }
}

/// A type name as written in a declaration, parameter list or return position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclaredType {
    Int,
    Bool,
    Str,
    Void,
    Func,
    Object,
    RefInt,
    RefBool,
    RefStr,
}

impl DeclaredType {
    pub fn parse(name: &str) -> Option<Self> {
        let ty = match name {
            kw::INT => DeclaredType::Int,
            kw::BOOL => DeclaredType::Bool,
            kw::STRING => DeclaredType::Str,
            kw::VOID => DeclaredType::Void,
            kw::FUNC => DeclaredType::Func,
            kw::OBJECT => DeclaredType::Object,
            kw::REFINT => DeclaredType::RefInt,
            kw::REFBOOL => DeclaredType::RefBool,
            kw::REFSTRING => DeclaredType::RefStr,
            _ => return None,
        };
        Some(ty)
    }

    /// Underlying value kind; reference types share the kind of their value type
    pub fn kind(self) -> Kind {
        match self {
            DeclaredType::Int | DeclaredType::RefInt => Kind::Int,
            DeclaredType::Bool | DeclaredType::RefBool => Kind::Bool,
            DeclaredType::Str | DeclaredType::RefStr => Kind::Str,
            DeclaredType::Void => Kind::Void,
            DeclaredType::Func => Kind::Func,
            DeclaredType::Object => Kind::Object,
        }
    }

    /// Parameters of these types alias the caller's storage cell
    pub fn is_reference(self) -> bool {
        matches!(
            self,
            DeclaredType::RefInt | DeclaredType::RefBool | DeclaredType::RefStr | DeclaredType::Object
        )
    }

    /// Reference types only make sense as parameters
    pub fn is_storable(self) -> bool {
        !matches!(
            self,
            DeclaredType::RefInt | DeclaredType::RefBool | DeclaredType::RefStr
        )
    }

    /// Registered default value; objects get a fresh empty object each time
    pub fn default_value(self) -> Value {
        match self.kind() {
            Kind::Int => Value::Int(0),
            Kind::Bool => Value::Bool(false),
            Kind::Str => Value::Str(String::new()),
            Kind::Void => Value::Void,
            Kind::Func => Value::Func(None),
            Kind::Object => Value::new_object(),
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::RefInt => f.write_str(kw::REFINT),
            DeclaredType::RefBool => f.write_str(kw::REFBOOL),
            DeclaredType::RefStr => f.write_str(kw::REFSTRING),
            other => write!(f, "{}", other.kind()),
        }
    }
}
