//! plumber - behavior composition engine
//!
//! Builds classes from independently authored parts. Every contribution is an
//! [`Instruction`] with a merge policy; contributions to the same name are
//! folded in declaration order and either merge or collide.

pub mod compose;
pub mod core;
pub mod host;
pub mod instruction;
pub mod part;
pub mod registry;
pub mod tags;
pub mod value;

pub use crate::compose::{compose, Composer, TargetDecl};
pub use crate::core::error::{Collision, PlumbingError, Result};
pub use crate::host::{Class, Instance};
pub use crate::instruction::{Instruction, Policy};
pub use crate::part::Part;
pub use crate::tags::{TagLedger, TagRegistry};
pub use crate::value::{Accessor, Method, Value};
