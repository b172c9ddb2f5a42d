//! Attribute values
//!
//! Everything a part can contribute and a class can hold is a [`Value`]: plain
//! data, a callable [`Method`], a property-like [`Accessor`], or an
//! [`Instruction`] wrapping another value. The set of kinds is closed, so
//! every merge rule is an explicit match instead of a runtime type check.

pub mod accessor;
pub mod doc;
pub mod method;

pub use accessor::Accessor;
pub use doc::{plumb_doc, DocMerger};
pub use method::{CallResult, EndpointFn, LinkFn, Method, Next};

use ordered_float::OrderedFloat;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::fmt;

use crate::instruction::Instruction;

/// An attribute value
#[derive(Clone, PartialEq, Default)]
pub enum Value {
    /// Absence of a value (a present attribute holding nothing)
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    Text(String),
    List(Vec<Value>),
    Method(Method),
    Accessor(Accessor),
    /// A value still wrapped in an instruction
    Instruction(Box<Instruction>),
}

/// Discriminant of a [`Value`], for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Nil,
    Bool,
    Int,
    Float,
    Text,
    List,
    Method,
    Accessor,
    Instruction,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Nil => "nil",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Text => "text",
            ValueKind::List => "list",
            ValueKind::Method => "method",
            ValueKind::Accessor => "accessor",
            ValueKind::Instruction => "instruction",
        };
        write!(f, "{}", name)
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Nil => ValueKind::Nil,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Text(_) => ValueKind::Text,
            Value::List(_) => ValueKind::List,
            Value::Method(_) => ValueKind::Method,
            Value::Accessor(_) => ValueKind::Accessor,
            Value::Instruction(_) => ValueKind::Instruction,
        }
    }

    /// The innermost non-instruction value
    pub fn resolve(&self) -> &Value {
        match self {
            Value::Instruction(instr) => instr.payload(),
            other => other,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(f.into_inner()),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Value::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_accessor(&self) -> Option<&Accessor> {
        match self {
            Value::Accessor(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_instruction(&self) -> Option<&Instruction> {
        match self {
            Value::Instruction(i) => Some(i),
            _ => None,
        }
    }

    /// Short representation used in diagnostics
    pub fn repr(&self) -> String {
        match self {
            Value::Nil => "None".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => format!("{:?}", f.into_inner()),
            Value::Text(s) => format!("{:?}", s),
            Value::List(items) => {
                let inner: Vec<String> = items.iter().map(Value::repr).collect();
                format!("[{}]", inner.join(", "))
            }
            Value::Method(m) => format!("{:?}", m),
            Value::Accessor(a) => format!("{:?}", a),
            Value::Instruction(i) => i.to_string(),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.repr())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            other => write!(f, "{}", other.repr()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Nil => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(f.into_inner()),
            Value::Text(s) => serializer.serialize_str(s),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            other => serializer.serialize_str(&other.repr()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(OrderedFloat(f))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Method> for Value {
    fn from(m: Method) -> Self {
        Value::Method(m)
    }
}

impl From<Accessor> for Value {
    fn from(a: Accessor) -> Self {
        Value::Accessor(a)
    }
}

impl From<Instruction> for Value {
    fn from(i: Instruction) -> Self {
        Value::Instruction(Box::new(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repr_of_plain_values() {
        assert_eq!(Value::Nil.repr(), "None");
        assert_eq!(Value::from("hi").repr(), "\"hi\"");
        assert_eq!(Value::from(1.5).repr(), "1.5");
        assert_eq!(
            Value::from(vec![Value::from(1), Value::from("a")]).repr(),
            "[1, \"a\"]"
        );
    }

    #[test]
    fn test_methods_compare_by_identity() {
        let m = Method::endpoint("f", |_, _| Ok(Value::Nil));
        let same_body = Method::endpoint("f", |_, _| Ok(Value::Nil));
        assert_eq!(Value::from(m.clone()), Value::from(m.clone()));
        assert_ne!(Value::from(m), Value::from(same_body));
    }

    #[test]
    fn test_resolve_unwraps_instructions() {
        let nested = Value::from(Instruction::bare(Value::from(Instruction::bare(Value::from(7)))));
        assert_eq!(nested.resolve(), &Value::from(7));
        assert_eq!(Value::from(7).resolve(), &Value::from(7));
    }

    #[test]
    fn test_serializes_to_json() {
        let v = Value::from(vec![Value::Nil, Value::from(true), Value::from("x")]);
        assert_eq!(serde_json::to_string(&v).unwrap(), "[null,true,\"x\"]");
    }
}
