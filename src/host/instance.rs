//! Instances of composed classes.

use ahash::AHashMap;
use std::sync::Arc;

use super::class::{AttributeSource, Class};
use super::CallError;
use crate::value::{CallResult, Value};

/// An object: a class plus per-instance fields
///
/// Attribute access checks the instance fields first and falls back to the
/// class. Methods and accessor slots receive the instance mutably.
#[derive(Debug)]
pub struct Instance {
    class: Arc<Class>,
    fields: AHashMap<String, Value>,
}

impl Instance {
    pub fn new(class: Arc<Class>) -> Self {
        Self {
            class,
            fields: AHashMap::new(),
        }
    }

    pub fn class(&self) -> &Arc<Class> {
        &self.class
    }

    /// Raw per-instance field
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Raw per-instance field write, bypassing accessors
    pub fn set_field(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(name.into(), value)
    }

    pub fn remove_field(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Call the method reachable under `name`
    pub fn call(&mut self, name: &str, args: &[Value]) -> CallResult {
        let class = Arc::clone(&self.class);
        let method = match class.lookup(name) {
            Some(Value::Method(m)) => m.clone(),
            Some(other) => {
                return Err(CallError::NotCallable {
                    name: name.to_string(),
                    kind: other.kind(),
                })
            }
            None => return Err(CallError::NotFound(name.to_string())),
        };
        method.invoke(self, args)
    }

    /// Read an attribute; accessors run their getter
    pub fn get(&mut self, name: &str) -> CallResult {
        if let Some(value) = self.fields.get(name) {
            return Ok(value.clone());
        }
        let class = Arc::clone(&self.class);
        match class.lookup(name) {
            Some(Value::Accessor(acc)) => match &acc.get {
                Some(getter) => getter.invoke(self, &[]),
                None => Err(CallError::Unreadable(name.to_string())),
            },
            Some(value) => Ok(value.clone()),
            None => Err(CallError::NotFound(name.to_string())),
        }
    }

    /// Write an attribute; accessors run their setter, anything else is
    /// stored as an instance field
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), CallError> {
        let class = Arc::clone(&self.class);
        match class.lookup(name) {
            Some(Value::Accessor(acc)) => match &acc.set {
                Some(setter) => setter.invoke(self, &[value]).map(|_| ()),
                None => Err(CallError::ReadOnly(name.to_string())),
            },
            _ => {
                self.fields.insert(name.to_string(), value);
                Ok(())
            }
        }
    }

    /// Delete an attribute; accessors run their deleter
    pub fn delete(&mut self, name: &str) -> Result<(), CallError> {
        let class = Arc::clone(&self.class);
        match class.lookup(name) {
            Some(Value::Accessor(acc)) => match &acc.del {
                Some(deleter) => deleter.invoke(self, &[]).map(|_| ()),
                None => Err(CallError::Undeletable(name.to_string())),
            },
            _ => self
                .fields
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| CallError::NotFound(name.to_string())),
        }
    }
}
