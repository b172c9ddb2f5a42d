//! Classes: named attribute tables with an ordered list of bases.

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

use crate::core::types::ClassId;
use crate::value::Value;

/// Ordered attribute table of a class or part
pub type AttrTable = IndexMap<String, Value>;

/// Read-only view answering "is this name already provided"
pub trait AttributeSource {
    fn has_attribute(&self, name: &str) -> bool;

    /// Value reachable under `name`, with inheritance fallback
    fn lookup(&self, name: &str) -> Option<&Value>;
}

/// A constructed class
pub struct Class {
    id: ClassId,
    name: String,
    bases: Vec<Arc<Class>>,
    attrs: AttrTable,
}

impl Class {
    pub(crate) fn from_parts(name: String, bases: Vec<Arc<Class>>, attrs: AttrTable) -> Self {
        Self {
            id: ClassId::new(),
            name,
            bases,
            attrs,
        }
    }

    /// A class without bases or attributes
    pub fn bare(name: impl Into<String>) -> Self {
        Self::from_parts(name.into(), Vec::new(), AttrTable::new())
    }

    /// A plain class from a name, bases and attributes, without composition
    pub fn with_attrs(
        name: impl Into<String>,
        bases: Vec<Arc<Class>>,
        attrs: impl IntoIterator<Item = (String, Value)>,
    ) -> Self {
        Self::from_parts(name.into(), bases, attrs.into_iter().collect())
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bases(&self) -> &[Arc<Class>] {
        &self.bases
    }

    /// Attributes declared on this class itself
    pub fn own_attrs(&self) -> &AttrTable {
        &self.attrs
    }

    pub fn own_attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    /// Replace (or add) an attribute on this class
    pub(crate) fn set_attr(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.attrs.insert(name.into(), value)
    }

    /// Whether `ancestor` is this class or one of its (transitive) bases
    pub fn is_subclass_of(&self, ancestor: &Class) -> bool {
        self.id == ancestor.id || self.bases.iter().any(|b| b.is_subclass_of(ancestor))
    }

    /// Every name reachable on this class, own names first, then bases
    pub fn attribute_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.attrs.keys().cloned().collect();
        for base in &self.bases {
            for name in base.attribute_names() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// All reachable attributes with the value lookup would return
    pub fn resolved_attrs(&self) -> AttrTable {
        self.attribute_names()
            .into_iter()
            .filter_map(|name| self.lookup(&name).cloned().map(|v| (name, v)))
            .collect()
    }
}

impl AttributeSource for Class {
    fn has_attribute(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Own table first, then bases depth-first in declared order
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.attrs
            .get(name)
            .or_else(|| self.bases.iter().find_map(|b| b.lookup(name)))
    }
}

/// The bases of a class under construction
#[derive(Clone, Copy)]
pub struct Bases<'a>(pub &'a [Arc<Class>]);

impl AttributeSource for Bases<'_> {
    fn has_attribute(&self, name: &str) -> bool {
        self.0.iter().any(|b| b.has_attribute(name))
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.0.iter().find_map(|b| b.lookup(name))
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bases: Vec<&str> = self.bases.iter().map(|b| b.name()).collect();
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("bases", &bases)
            .field("attrs", &self.attrs)
            .finish()
    }
}
