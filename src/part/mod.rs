//! Parts: reusable, independently authored attribute tables.
//!
//! A part is declared once and is immutable afterwards. It can be shared
//! between any number of compositions, including concurrent ones; its parsed
//! instructions are memoized and filled at most once.

pub mod parser;

pub use parser::parse_part;

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::core::config::PlumbingConfig;
use crate::core::types::PartId;
use crate::host::AttrTable;
use crate::instruction::Instruction;
use crate::value::Value;

struct ParseCache {
    /// Reserved prefix the cached parse was made with
    prefix: String,
    instructions: Arc<[Instruction]>,
}

/// A named, ordered attribute table contributing behavior to classes
pub struct Part {
    id: PartId,
    name: String,
    attrs: AttrTable,
    tags: BTreeSet<String>,
    parsed: OnceLock<ParseCache>,
}

impl Part {
    pub fn builder(name: impl Into<String>) -> PartBuilder {
        PartBuilder {
            name: name.into(),
            attrs: AttrTable::new(),
            tags: BTreeSet::new(),
        }
    }

    pub fn id(&self) -> PartId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attrs(&self) -> &AttrTable {
        &self.attrs
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Parsed instructions, memoized on first use
    ///
    /// The first caller fills the cache; concurrent callers block until it
    /// is filled. A config with a different reserved prefix gets a fresh,
    /// uncached parse.
    pub fn instructions(&self, config: &PlumbingConfig) -> Arc<[Instruction]> {
        let cache = self.parsed.get_or_init(|| ParseCache {
            prefix: config.reserved_prefix.clone(),
            instructions: parse_part(self, config).into(),
        });
        if cache.prefix == config.reserved_prefix {
            Arc::clone(&cache.instructions)
        } else {
            parse_part(self, config).into()
        }
    }

    pub fn is_parsed(&self) -> bool {
        self.parsed.get().is_some()
    }
}

impl fmt::Debug for Part {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Part")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("attrs", &self.attrs)
            .field("tags", &self.tags)
            .finish()
    }
}

/// Builder for [`Part`]
#[derive(Debug, Clone)]
pub struct PartBuilder {
    name: String,
    attrs: AttrTable,
    tags: BTreeSet<String>,
}

impl PartBuilder {
    /// Undecorated entry (implicitly `finalize`)
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Instruction-wrapped entry
    pub fn instruction(mut self, key: impl Into<String>, instruction: Instruction) -> Self {
        self.attrs.insert(key.into(), Value::from(instruction));
        self
    }

    pub fn default(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.instruction(key, Instruction::default(value))
    }

    pub fn extend(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.instruction(key, Instruction::extend(value))
    }

    pub fn finalize(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.instruction(key, Instruction::finalize(value))
    }

    pub fn overwrite(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.instruction(key, Instruction::overwrite(value))
    }

    pub fn plumb(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.instruction(key, Instruction::plumb(value))
    }

    pub fn plumb_if_exists(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.instruction(key, Instruction::plumb_if_exists(value))
    }

    /// Declare capability tags
    pub fn implements<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Part {
        Part {
            id: PartId::next(),
            name: self.name,
            attrs: self.attrs,
            tags: self.tags,
            parsed: OnceLock::new(),
        }
    }

    /// Build and wrap for sharing
    pub fn shared(self) -> Arc<Part> {
        Arc::new(self.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts_get_distinct_ids() {
        let a = Part::builder("A").build();
        let b = Part::builder("A").build();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_parse_is_memoized() {
        let part = Part::builder("A").attr("x", 1).build();
        let config = PlumbingConfig::default();
        assert!(!part.is_parsed());
        let first = part.instructions(&config);
        let second = part.instructions(&config);
        assert!(part.is_parsed());
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_other_prefix_parses_fresh() {
        let part = Part::builder("A").attr("_hidden", 1).attr("x", 2).build();
        let default = PlumbingConfig::default();
        let custom = PlumbingConfig {
            reserved_prefix: "_".to_string(),
            ..PlumbingConfig::default()
        };
        assert_eq!(part.instructions(&default).len(), 2);
        assert_eq!(part.instructions(&custom).len(), 1);
        assert_eq!(part.instructions(&default).len(), 2);
    }

    #[test]
    fn test_concurrent_parse_fills_once() {
        let part = Part::builder("Shared").attr("x", 1).attr("y", 2).shared();
        let config = PlumbingConfig::default();
        let results: Vec<Arc<[Instruction]>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| part.instructions(&config)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        for r in &results {
            assert!(Arc::ptr_eq(r, &results[0]));
        }
    }
}
