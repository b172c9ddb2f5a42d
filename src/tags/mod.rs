//! Capability tags registered against composed classes.

use ahash::AHashMap;
use parking_lot::RwLock;
use std::collections::BTreeSet;

use crate::core::types::ClassId;
use crate::host::Class;

/// Collaborator recording that a class provides a set of tags
pub trait TagRegistry: Send + Sync {
    fn register(&self, class: &Class, tags: &BTreeSet<String>);
}

/// In-memory tag registry
#[derive(Debug, Default)]
pub struct TagLedger {
    entries: RwLock<AHashMap<ClassId, BTreeSet<String>>>,
}

impl TagLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags registered directly on a class
    pub fn declared_by(&self, class: &Class) -> BTreeSet<String> {
        self.entries
            .read()
            .get(&class.id())
            .cloned()
            .unwrap_or_default()
    }

    /// Tags registered on a class or any of its bases
    pub fn provided_by(&self, class: &Class) -> BTreeSet<String> {
        let mut tags = self.declared_by(class);
        for base in class.bases() {
            tags.extend(self.provided_by(base));
        }
        tags
    }

    pub fn provides(&self, class: &Class, tag: &str) -> bool {
        self.provided_by(class).contains(tag)
    }

    /// Number of classes with registered tags
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl TagRegistry for TagLedger {
    fn register(&self, class: &Class, tags: &BTreeSet<String>) {
        self.entries
            .write()
            .entry(class.id())
            .or_default()
            .extend(tags.iter().cloned());
        tracing::debug!("Registered tags {:?} for class {}", tags, class.name());
    }
}
