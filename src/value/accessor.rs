//! Property-like attribute values with independent get/set/delete slots.

use std::fmt;

use super::doc::DocMerger;
use super::method::Method;

/// A property: up to three accessor methods plus a docstring
///
/// The getter is invoked with no arguments, the setter with the new value,
/// the deleter with no arguments. In a plumbing contribution each slot is
/// chained independently: an empty slot keeps whatever the slot held before,
/// a link wraps it, and an endpoint replaces it outright.
#[derive(Clone, Default, PartialEq)]
pub struct Accessor {
    pub get: Option<Method>,
    pub set: Option<Method>,
    pub del: Option<Method>,
    pub doc: Option<String>,
}

impl Accessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn getter(mut self, method: Method) -> Self {
        self.get = Some(method);
        self
    }

    pub fn setter(mut self, method: Method) -> Self {
        self.set = Some(method);
        self
    }

    pub fn deleter(mut self, method: Method) -> Self {
        self.del = Some(method);
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Chain every slot of `self` in front of the same slot of `next`
    pub fn then(&self, next: &Accessor, docs: &DocMerger) -> Accessor {
        Accessor {
            get: chain_slot(&self.get, &next.get, docs),
            set: chain_slot(&self.set, &next.set, docs),
            del: chain_slot(&self.del, &next.del, docs),
            doc: docs.merge(self.doc.as_deref(), next.doc.as_deref()),
        }
    }

    fn slot_names(&self) -> Vec<&'static str> {
        [("get", &self.get), ("set", &self.set), ("del", &self.del)]
            .into_iter()
            .filter(|(_, slot)| slot.is_some())
            .map(|(name, _)| name)
            .collect()
    }
}

fn chain_slot(left: &Option<Method>, right: &Option<Method>, docs: &DocMerger) -> Option<Method> {
    match (left, right) {
        (None, right) => right.clone(),
        (Some(l), None) => Some(l.clone()),
        (Some(l), Some(r)) => Some(l.then(r, docs)),
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<accessor {}>", self.slot_names().join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn docs() -> DocMerger {
        DocMerger::new(".. plbnext::")
    }

    #[test]
    fn test_empty_slot_keeps_next() {
        let getter = Method::endpoint("get", |_, _| Ok(Value::from(1)));
        let existing = Accessor::new().getter(getter.clone());
        let merged = Accessor::new().then(&existing, &docs());
        assert_eq!(merged.get, Some(getter));
        assert!(merged.set.is_none());
    }

    #[test]
    fn test_endpoint_slot_is_final() {
        let existing = Accessor::new().getter(Method::endpoint("old", |_, _| Ok(Value::from(1))));
        let replacement = Method::endpoint("new", |_, _| Ok(Value::from(2)));
        let merged = Accessor::new()
            .getter(replacement.clone())
            .then(&existing, &docs());
        assert_eq!(merged.get, Some(replacement));
    }

    #[test]
    fn test_link_slot_wraps_next() {
        let existing = Accessor::new().setter(Method::endpoint("old", |_, _| Ok(Value::Nil)));
        let wrap = Method::link("wrap", |next, this, args| next.call(this, args));
        let merged = Accessor::new().setter(wrap).then(&existing, &docs());
        let set = merged.set.unwrap();
        assert!(set.is_link());
        assert!(set.is_terminated());
        assert_eq!(set.depth(), 2);
    }

    #[test]
    fn test_debug_lists_slots() {
        let acc = Accessor::new()
            .getter(Method::endpoint("g", |_, _| Ok(Value::Nil)))
            .deleter(Method::endpoint("d", |_, _| Ok(Value::Nil)));
        assert_eq!(format!("{:?}", acc), "<accessor get,del>");
    }
}
