//! Class construction boundary.

use std::sync::Arc;
use thiserror::Error;

use super::class::{AttrTable, Class};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConstructionError {
    #[error("Class name must not be empty")]
    EmptyName,

    #[error("Duplicate base class {base} in bases of {class}")]
    DuplicateBase { class: String, base: String },

    #[error("Class {class} rejected: {reason}")]
    Rejected { class: String, reason: String },
}

/// Creates a class from a name, bases and a finished attribute table
pub trait ClassFactory: Send + Sync {
    fn construct(
        &self,
        name: &str,
        bases: Vec<Arc<Class>>,
        attrs: AttrTable,
    ) -> Result<Class, ConstructionError>;
}

/// Default factory: rejects empty names and repeated bases
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFactory;

impl ClassFactory for StandardFactory {
    fn construct(
        &self,
        name: &str,
        bases: Vec<Arc<Class>>,
        attrs: AttrTable,
    ) -> Result<Class, ConstructionError> {
        if name.trim().is_empty() {
            return Err(ConstructionError::EmptyName);
        }

        for (i, base) in bases.iter().enumerate() {
            if bases[..i].iter().any(|b| b.id() == base.id()) {
                return Err(ConstructionError::DuplicateBase {
                    class: name.to_string(),
                    base: base.name().to_string(),
                });
            }
        }

        Ok(Class::from_parts(name.to_string(), bases, attrs))
    }
}
