//! Two-stage composition of a target class from parts.
//!
//! 1. Every instruction of every part is folded per name in declaration
//!    order, followed by the target's own instructions.
//! 2. Stage 1 installs the attribute winners into a draft table seeded with
//!    the target's own attributes, checking the bases for `default`.
//! 3. The class is constructed by the [`ClassFactory`].
//! 4. Stage 2 wraps existing methods, docstrings and accessors into chains.
//! 5. Only then is the class published and its tags registered.

pub mod stage1;
pub mod stage2;

use std::sync::Arc;

use crate::core::config::{config, PlumbingConfig};
use crate::core::error::Result;
use crate::host::{AttrTable, Bases, Class, ClassFactory, StandardFactory};
use crate::instruction::{Instruction, Origin, Stacks};
use crate::part::Part;
use crate::tags::TagRegistry;
use crate::value::{DocMerger, Value};

/// Declaration of a class to compose
#[derive(Debug, Clone)]
pub struct TargetDecl {
    pub name: String,
    pub bases: Vec<Arc<Class>>,
    /// Plain attributes declared on the target itself
    pub attrs: AttrTable,
    /// Parts in composition order
    pub parts: Vec<Arc<Part>>,
    /// Instructions declared on the target, folded after all parts
    pub instructions: Vec<(String, Instruction)>,
}

impl TargetDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            attrs: AttrTable::new(),
            parts: Vec::new(),
            instructions: Vec::new(),
        }
    }

    pub fn base(mut self, base: Arc<Class>) -> Self {
        self.bases.push(base);
        self
    }

    pub fn part(mut self, part: Arc<Part>) -> Self {
        self.parts.push(part);
        self
    }

    pub fn parts(mut self, parts: impl IntoIterator<Item = Arc<Part>>) -> Self {
        self.parts.extend(parts);
        self
    }

    /// Plain attribute on the target
    ///
    /// An instruction-wrapped value is declared as a target instruction.
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        match value.into() {
            Value::Instruction(instruction) => self.instructions.push((key.into(), *instruction)),
            plain => {
                self.attrs.insert(key.into(), plain);
            }
        }
        self
    }

    /// Instruction declared on the target
    pub fn instruction(mut self, key: impl Into<String>, instruction: Instruction) -> Self {
        self.instructions.push((key.into(), instruction));
        self
    }
}

/// Composes classes; holds the collaborators of a composition run
#[derive(Clone)]
pub struct Composer {
    config: PlumbingConfig,
    docs: DocMerger,
    factory: Arc<dyn ClassFactory>,
    tags: Option<Arc<dyn TagRegistry>>,
}

impl Composer {
    /// Composer over the process-wide config and the standard factory
    pub fn new() -> Self {
        Self::with_config(config().clone())
    }

    pub fn with_config(config: PlumbingConfig) -> Self {
        let docs = DocMerger::from_config(&config);
        Self {
            config,
            docs,
            factory: Arc::new(StandardFactory),
            tags: None,
        }
    }

    pub fn factory(mut self, factory: Arc<dyn ClassFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn tag_registry(mut self, registry: Arc<dyn TagRegistry>) -> Self {
        self.tags = Some(registry);
        self
    }

    pub fn config(&self) -> &PlumbingConfig {
        &self.config
    }

    pub fn docs(&self) -> &DocMerger {
        &self.docs
    }

    /// Fold every contribution of a declaration into per-name stacks
    pub fn fold(&self, decl: &TargetDecl) -> Result<Stacks> {
        let mut stacks = Stacks::new();
        let drop = self.config.drop_duplicates;

        for part in &decl.parts {
            for instruction in part.instructions(&self.config).iter() {
                stacks.fold(instruction.clone(), &self.docs, drop)?;
            }
        }

        let origin = Origin::Class(Arc::from(decl.name.as_str()));
        for (key, instruction) in &decl.instructions {
            let named = instruction
                .clone()
                .named(key.as_str())
                .declared_by(origin.clone());
            stacks.fold(named, &self.docs, drop)?;
        }

        tracing::debug!(
            "Folded {} parts into {} names for {}",
            decl.parts.len(),
            stacks.len(),
            decl.name
        );
        Ok(stacks)
    }

    /// Compose the declared class
    ///
    /// Nothing is published on failure: the class is only shared and its
    /// tags only registered once both stages succeeded.
    pub fn compose(&self, decl: &TargetDecl) -> Result<Arc<Class>> {
        let stacks = self.fold(decl)?;

        let mut draft = decl.attrs.clone();
        stage1::apply(&stacks, &mut draft, &Bases(&decl.bases), &decl.name)?;

        let mut class = self
            .factory
            .construct(&decl.name, decl.bases.clone(), draft)?;

        let tags = stage2::apply(&stacks, &mut class, &self.docs)?;

        let class = Arc::new(class);
        if !tags.is_empty() && self.config.register_tags {
            if let Some(registry) = &self.tags {
                registry.register(&class, &tags);
            }
        }

        tracing::info!(
            "Composed {} from {} parts ({} attributes)",
            class.name(),
            decl.parts.len(),
            class.own_attrs().len()
        );
        Ok(class)
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

/// Compose `name` from `bases` and `parts` with the default composer
pub fn compose(
    name: impl Into<String>,
    bases: Vec<Arc<Class>>,
    parts: impl IntoIterator<Item = Arc<Part>>,
) -> Result<Arc<Class>> {
    let mut decl = TargetDecl::new(name).parts(parts);
    decl.bases = bases;
    Composer::new().compose(&decl)
}
