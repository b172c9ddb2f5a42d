//! Instructions: named, policy-tagged edit requests against a class's
//! attribute table.
//!
//! An instruction is created by a part author with one of the policy
//! constructors ([`Instruction::default`], [`Instruction::extend`],
//! [`Instruction::finalize`], [`Instruction::overwrite`],
//! [`Instruction::plumb`], [`Instruction::plumb_if_exists`],
//! [`Instruction::implements`]). Its name and declaring part are normally
//! filled in when the part is parsed.

pub mod merge;
pub mod stack;

pub use merge::{combine, plumb_values};
pub use stack::{InstructionStack, Stacks};

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::core::error::Collision;
use crate::core::types::{PartId, Stage, TAGS_ATTR};
use crate::value::{DocMerger, Value};

/// Merge/apply rule of an instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Policy {
    /// Used only if neither the class nor any base provides the name
    Default,
    /// Used unless the class itself provides the name
    Extend,
    /// Insists on the name; unequal finalizes collide
    Finalize,
    /// Replaces defaults, extends and earlier overwrites, never a finalize
    Overwrite,
    /// Wraps the existing attribute into a chain
    Plumb,
    /// Like `Plumb`, but a no-op when nothing exists to wrap
    PlumbIfExists,
    /// Declares capability tags for the finished class
    Implements,
    /// A wrapper without a policy, only meaningful as a nested payload
    Bare,
}

impl Policy {
    pub fn stage(&self) -> Stage {
        match self {
            Policy::Default
            | Policy::Extend
            | Policy::Finalize
            | Policy::Overwrite
            | Policy::Bare => Stage::Stage1,
            Policy::Plumb | Policy::PlumbIfExists | Policy::Implements => Stage::Stage2,
        }
    }

    pub fn is_plumbing(&self) -> bool {
        matches!(self, Policy::Plumb | Policy::PlumbIfExists)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Policy::Default => "default",
            Policy::Extend => "extend",
            Policy::Finalize => "finalize",
            Policy::Overwrite => "overwrite",
            Policy::Plumb => "plumb",
            Policy::PlumbIfExists => "plumb_if_exists",
            Policy::Implements => "implements",
            Policy::Bare => "instruction",
        }
    }

    /// Parse a policy keyword as written in declarative parts
    pub fn parse(s: &str) -> Option<Policy> {
        match s {
            "default" => Some(Policy::Default),
            "extend" => Some(Policy::Extend),
            "finalize" => Some(Policy::Finalize),
            "overwrite" => Some(Policy::Overwrite),
            "plumb" => Some(Policy::Plumb),
            "plumb_if_exists" => Some(Policy::PlumbIfExists),
            "implements" => Some(Policy::Implements),
            _ => None,
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who declared an instruction (diagnostics only)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Origin {
    /// A part, by id and name
    Part { id: PartId, name: Arc<str> },
    /// The target class's own declaration
    Class(Arc<str>),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Part { name, .. } => write!(f, "part {}", name),
            Origin::Class(name) => write!(f, "class {}", name),
        }
    }
}

/// A named, policy-tagged contribution
#[derive(Clone)]
pub struct Instruction {
    policy: Policy,
    name: Option<String>,
    origin: Option<Origin>,
    item: Value,
}

impl Instruction {
    fn with_policy(policy: Policy, item: Value) -> Self {
        Self {
            policy,
            name: None,
            origin: None,
            item,
        }
    }

    /// Provide a default attribute
    pub fn default(item: impl Into<Value>) -> Self {
        Self::with_policy(Policy::Default, item.into())
    }

    /// Extend the class with an attribute
    pub fn extend(item: impl Into<Value>) -> Self {
        Self::with_policy(Policy::Extend, item.into())
    }

    /// Insist on the final value
    pub fn finalize(item: impl Into<Value>) -> Self {
        Self::with_policy(Policy::Finalize, item.into())
    }

    /// Replace whatever is not finalized
    pub fn overwrite(item: impl Into<Value>) -> Self {
        Self::with_policy(Policy::Overwrite, item.into())
    }

    /// Chain a method, docstring or accessor in front of the existing one
    pub fn plumb(item: impl Into<Value>) -> Self {
        Self::with_policy(Policy::Plumb, item.into())
    }

    /// Like [`Instruction::plumb`], skipped if nothing exists to wrap
    pub fn plumb_if_exists(item: impl Into<Value>) -> Self {
        Self::with_policy(Policy::PlumbIfExists, item.into())
    }

    /// Declare capability tags; sorted and deduplicated
    pub fn implements<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: BTreeSet<String> = tags.into_iter().map(Into::into).collect();
        Self::with_policy(Policy::Implements, tags_value(&tags)).named(TAGS_ATTR)
    }

    /// Wrap a value without a policy
    pub fn bare(item: impl Into<Value>) -> Self {
        Self::with_policy(Policy::Bare, item.into())
    }

    /// Explicit name override
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn declared_by(mut self, origin: Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Same policy and name with a new payload
    pub(crate) fn with_item(&self, item: Value) -> Self {
        Self {
            policy: self.policy,
            name: self.name.clone(),
            origin: self.origin.clone(),
            item,
        }
    }

    pub(crate) fn with_policy_of(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn stage(&self) -> Stage {
        self.policy.stage()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn origin(&self) -> Option<&Origin> {
        self.origin.as_ref()
    }

    /// The directly wrapped value, possibly another instruction
    pub fn item(&self) -> &Value {
        &self.item
    }

    /// The innermost non-instruction value
    pub fn payload(&self) -> &Value {
        match &self.item {
            Value::Instruction(inner) => inner.payload(),
            other => other,
        }
    }

    /// Tags of an `implements` instruction
    pub fn tags(&self) -> BTreeSet<String> {
        match self.payload() {
            Value::List(items) => items
                .iter()
                .filter_map(|v| v.as_text().map(str::to_string))
                .collect(),
            _ => BTreeSet::new(),
        }
    }

    /// Fold `right` into `self` using the process-wide docstring marker
    pub fn combine(&self, right: &Instruction) -> Result<Instruction, Collision> {
        merge::combine(self, right, DocMerger::global())
    }

    /// Fold `right` into `self` with an explicit docstring merger
    pub fn combine_with(
        &self,
        right: &Instruction,
        docs: &DocMerger,
    ) -> Result<Instruction, Collision> {
        merge::combine(self, right, docs)
    }
}

pub(crate) fn tags_value(tags: &BTreeSet<String>) -> Value {
    Value::List(tags.iter().map(|t| Value::Text(t.clone())).collect())
}

impl PartialEq for Instruction {
    fn eq(&self, other: &Self) -> bool {
        if self.policy != other.policy {
            return false;
        }
        if self.name != other.name {
            return false;
        }
        self.payload() == other.payload()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let origin = match &self.origin {
            Some(o) => o.to_string(),
            None => "None".to_string(),
        };
        write!(
            f,
            "<{} '{}' of {} payload={}>",
            self.policy,
            self.name().unwrap_or("None"),
            origin,
            self.payload().repr()
        )
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_resolves_nested_instructions() {
        let inner = Instruction::bare(Value::from("foo"));
        let outer = Instruction::bare(Value::from(inner));
        assert_eq!(outer.payload(), &Value::from("foo"));
        assert_eq!(outer.item().kind(), crate::value::ValueKind::Instruction);
    }

    #[test]
    fn test_name_is_unset_until_named() {
        let instr = Instruction::finalize(1);
        assert_eq!(instr.name(), None);
        assert_eq!(instr.named("foo").name(), Some("foo"));
    }

    #[test]
    fn test_equality_requires_policy_name_and_payload() {
        let a = Instruction::finalize(1).named("x");
        assert_eq!(a, Instruction::finalize(1).named("x"));
        assert_ne!(a, Instruction::extend(1).named("x"));
        assert_ne!(a, Instruction::finalize(1).named("y"));
        assert_ne!(a, Instruction::finalize(2).named("x"));
    }

    #[test]
    fn test_equality_ignores_origin() {
        let origin = Origin::Part {
            id: PartId(99),
            name: Arc::from("A"),
        };
        let a = Instruction::default("v").named("x").declared_by(origin);
        assert_eq!(a, Instruction::default("v").named("x"));
    }

    #[test]
    fn test_implements_sorts_and_dedups() {
        let instr = Instruction::implements(["b", "a", "b"]);
        assert_eq!(instr.name(), Some(TAGS_ATTR));
        let tags: Vec<_> = instr.tags().into_iter().collect();
        assert_eq!(tags, vec!["a", "b"]);
        assert_eq!(
            Instruction::implements(["a", "b"]),
            Instruction::implements(["b", "a"])
        );
    }

    #[test]
    fn test_display_matches_diagnostic_format() {
        let instr = Instruction::default(1);
        assert_eq!(instr.to_string(), "<default 'None' of None payload=1>");

        let declared = Instruction::finalize("hi")
            .named("greet")
            .declared_by(Origin::Part {
                id: PartId(1),
                name: Arc::from("Greeter"),
            });
        assert_eq!(
            declared.to_string(),
            "<finalize 'greet' of part Greeter payload=\"hi\">"
        );
    }

    #[test]
    fn test_stages() {
        assert_eq!(Policy::Default.stage(), Stage::Stage1);
        assert_eq!(Policy::Overwrite.stage(), Stage::Stage1);
        assert_eq!(Policy::Plumb.stage(), Stage::Stage2);
        assert_eq!(Policy::Implements.stage(), Stage::Stage2);
        assert_eq!(Policy::parse("plumb_if_exists"), Some(Policy::PlumbIfExists));
        assert_eq!(Policy::parse("nope"), None);
    }
}
