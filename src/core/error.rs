use std::fmt;
use thiserror::Error;

use crate::host::ConstructionError;
use crate::instruction::Instruction;

/// Two instructions for the same attribute name that cannot be reconciled
#[derive(Debug, Clone, PartialEq)]
pub struct Collision {
    /// Attribute both instructions claim
    pub name: String,
    /// The instruction folded so far (or the one being installed)
    pub left: Box<Instruction>,
    /// The incoming instruction (or the target's own declaration)
    pub right: Box<Instruction>,
}

impl Collision {
    pub fn new(name: impl Into<String>, left: Instruction, right: Instruction) -> Self {
        Self {
            name: name.into(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Collision between two instructions, named after whichever carries a name
    pub fn between(left: &Instruction, right: &Instruction) -> Self {
        let name = left
            .name()
            .or_else(|| right.name())
            .unwrap_or("None")
            .to_string();
        Self::new(name, left.clone(), right.clone())
    }
}

impl fmt::Display for Collision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "'{}'", self.name)?;
        writeln!(f, "    {}", self.left)?;
        writeln!(f, "  collides with:")?;
        write!(f, "    {}", self.right)
    }
}

impl std::error::Error for Collision {}

#[derive(Error, Debug)]
pub enum PlumbingError {
    #[error("Plumbing collision: {0}")]
    Collision(#[from] Collision),

    #[error("Nothing to plumb: '{name}' is not provided by class {class} ({instruction})")]
    MissingEndpoint {
        name: String,
        class: String,
        instruction: Box<Instruction>,
    },

    #[error("Class construction failed: {0}")]
    Construction(#[from] ConstructionError),
}

impl PlumbingError {
    /// The collision behind this error, if it is one
    pub fn as_collision(&self) -> Option<&Collision> {
        match self {
            PlumbingError::Collision(c) => Some(c),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PlumbingError>;
