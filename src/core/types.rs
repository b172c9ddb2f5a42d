//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Unique identifier for composed classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassId(pub Uuid);

impl ClassId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClassId {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-unique identifier for declared parts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartId(pub u64);

static NEXT_PART_ID: AtomicU64 = AtomicU64::new(1);

impl PartId {
    /// Allocate the next part id (thread-safe counter)
    pub fn next() -> Self {
        Self(NEXT_PART_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Composition phase an instruction is applied in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Plain attribute installation into the draft table
    Stage1,
    /// Method chaining and tag registration on the constructed class
    Stage2,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Stage1 => write!(f, "stage1"),
            Stage::Stage2 => write!(f, "stage2"),
        }
    }
}

/// Attribute name under which declared capability tags are folded
pub const TAGS_ATTR: &str = "__plumbing_tags__";
