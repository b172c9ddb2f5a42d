//! Named parts and declarative targets
//!
//! The registry stores parts by name, loads data-only parts from TOML files
//! and composes targets that refer to parts by name.

pub mod loader;

pub use loader::{convert, parse_part_toml};

use indexmap::IndexMap;
use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::compose::{Composer, TargetDecl};
use crate::core::error::PlumbingError;
use crate::host::{AttrTable, Class};
use crate::part::Part;
use crate::value::Value;

/// Error type for part loading and name resolution
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {source_name}: {message}")]
    Parse { source_name: String, message: String },

    #[error("Unknown policy '{policy}' for {key} in part {part}")]
    UnknownPolicy {
        part: String,
        key: String,
        policy: String,
    },

    #[error("Invalid entry {key} in part {part}: {message}")]
    InvalidEntry {
        part: String,
        key: String,
        message: String,
    },

    #[error("Part not found: {0}")]
    UnknownPart(String),

    #[error("Composing {target} failed: {source}")]
    Composition {
        target: String,
        #[source]
        source: PlumbingError,
    },
}

impl RegistryError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        RegistryError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// A target declared by part names
#[derive(Debug, Clone)]
pub struct TargetSpec {
    pub name: String,
    pub bases: Vec<Arc<Class>>,
    pub attrs: AttrTable,
    pub parts: Vec<String>,
}

impl TargetSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            attrs: AttrTable::new(),
            parts: Vec::new(),
        }
    }

    pub fn part(mut self, name: impl Into<String>) -> Self {
        self.parts.push(name.into());
        self
    }

    pub fn base(mut self, base: Arc<Class>) -> Self {
        self.bases.push(base);
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }
}

/// Registry of named parts
#[derive(Debug, Default)]
pub struct PartRegistry {
    parts: IndexMap<String, Arc<Part>>,
}

impl PartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a part under its name, replacing any earlier part of that name
    pub fn register(&mut self, part: Part) -> Arc<Part> {
        self.insert(Arc::new(part))
    }

    pub fn insert(&mut self, part: Arc<Part>) -> Arc<Part> {
        if let Some(previous) = self.parts.insert(part.name().to_string(), Arc::clone(&part)) {
            tracing::warn!("Part {} replaced (was {:?})", part.name(), previous.id());
        }
        part
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Part>> {
        self.parts.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Load a part from a TOML file
    pub fn load_file(&mut self, path: &Path) -> Result<Arc<Part>, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|e| RegistryError::io(path, e))?;
        let part = parse_part_toml(&content, &path.display().to_string())?;
        tracing::debug!("Loaded part {} from {}", part.name(), path.display());
        Ok(self.register(part))
    }

    /// Load all .toml files from a directory recursively, in path order
    pub fn load_directory(&mut self, path: &Path) -> Result<Vec<Arc<Part>>, RegistryError> {
        let mut loaded = Vec::new();
        self.load_directory_recursive(path, &mut loaded)?;
        tracing::info!("Loaded {} parts from {}", loaded.len(), path.display());
        Ok(loaded)
    }

    fn load_directory_recursive(
        &mut self,
        path: &Path,
        loaded: &mut Vec<Arc<Part>>,
    ) -> Result<(), RegistryError> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path).map_err(|e| RegistryError::io(path, e))? {
            let entry = entry.map_err(|e| RegistryError::io(path, e))?;
            entries.push(entry.path());
        }
        entries.sort();

        for entry_path in entries {
            if entry_path.is_dir() {
                self.load_directory_recursive(&entry_path, loaded)?;
            } else if entry_path.extension().map_or(false, |ext| ext == "toml") {
                loaded.push(self.load_file(&entry_path)?);
            }
        }
        Ok(())
    }

    /// Turn a [`TargetSpec`] into a declaration, resolving part names
    pub fn resolve(&self, spec: &TargetSpec) -> Result<TargetDecl, RegistryError> {
        let mut decl = TargetDecl::new(spec.name.as_str());
        decl.bases = spec.bases.clone();
        for (key, value) in &spec.attrs {
            decl = decl.attr(key.as_str(), value.clone());
        }
        for name in &spec.parts {
            let part = self
                .get(name)
                .ok_or_else(|| RegistryError::UnknownPart(name.clone()))?;
            decl = decl.part(Arc::clone(part));
        }
        Ok(decl)
    }

    pub fn compose(
        &self,
        composer: &Composer,
        spec: &TargetSpec,
    ) -> Result<Arc<Class>, RegistryError> {
        let decl = self.resolve(spec)?;
        composer
            .compose(&decl)
            .map_err(|source| RegistryError::Composition {
                target: spec.name.clone(),
                source,
            })
    }

    /// Compose independent targets in parallel against the shared parts
    pub fn compose_many(
        &self,
        composer: &Composer,
        specs: &[TargetSpec],
    ) -> Vec<Result<Arc<Class>, RegistryError>> {
        specs
            .par_iter()
            .map(|spec| self.compose(composer, spec))
            .collect()
    }
}
