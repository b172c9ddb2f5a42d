//! Host object model: classes, instances and class construction.
//!
//! Composition only needs two things from here: "construct a class from a
//! name, bases and an attribute table" and "look up an attribute with
//! inheritance fallback". Lookup is depth-first over bases in declared
//! order; there is no linearization.

pub mod class;
pub mod factory;
pub mod instance;

pub use class::{AttrTable, AttributeSource, Bases, Class};
pub use factory::{ClassFactory, ConstructionError, StandardFactory};
pub use instance::Instance;

use thiserror::Error;

use crate::value::ValueKind;

/// Error type for method and accessor invocation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CallError {
    #[error("Attribute not found: {0}")]
    NotFound(String),

    #[error("Attribute {name} is a {kind}, not a method")]
    NotCallable { name: String, kind: ValueKind },

    #[error("Link {name} has no next link to call")]
    NoNext { name: String },

    #[error("Attribute {0} has no getter")]
    Unreadable(String),

    #[error("Attribute {0} has no setter")]
    ReadOnly(String),

    #[error("Attribute {0} has no deleter")]
    Undeletable(String),

    #[error("Invalid arguments for {name}: {message}")]
    InvalidArguments { name: String, message: String },

    #[error("Method failed: {0}")]
    Failed(String),
}
