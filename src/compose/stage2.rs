//! Stage 2: chain plumbing onto the constructed class and collect tags.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::core::error::{Collision, PlumbingError, Result};
use crate::core::types::Stage;
use crate::host::{AttributeSource, Class};
use crate::instruction::{plumb_values, Instruction, Origin, Policy, Stacks};
use crate::value::{DocMerger, Value};

/// Build the entrance for one folded plumbing instruction
///
/// Returns `Ok(None)` when a `plumb_if_exists` has nothing to wrap.
pub fn entrance(
    instruction: &Instruction,
    class: &Class,
    docs: &DocMerger,
) -> Result<Option<Value>> {
    let name = instruction.name().unwrap_or("None");
    let payload = instruction.payload();
    let existing = class.lookup(name);

    let next = match existing {
        Some(value) => value.clone(),
        None if instruction.policy() == Policy::PlumbIfExists => return Ok(None),
        // A missing docstring is an empty one
        None if matches!(payload, Value::Text(_)) => Value::Nil,
        None => {
            return Err(PlumbingError::MissingEndpoint {
                name: name.to_string(),
                class: class.name().to_string(),
                instruction: Box::new(instruction.clone()),
            })
        }
    };

    if let (Value::Method(method), Value::Method(_)) = (payload, &next) {
        if method.is_terminated() {
            tracing::debug!(
                "Plumbed {} on {} ends in an endpoint and replaces the existing implementation",
                name,
                class.name()
            );
        }
    }

    match plumb_values(payload, &next, docs) {
        Some(value) => Ok(Some(value)),
        None => {
            let declared = Instruction::finalize(next)
                .named(name)
                .declared_by(Origin::Class(Arc::from(class.name())));
            Err(Collision::new(name, instruction.clone(), declared).into())
        }
    }
}

/// Apply every Stage-2 winner to `class`, returning the declared tags
pub fn apply(stacks: &Stacks, class: &mut Class, docs: &DocMerger) -> Result<BTreeSet<String>> {
    let mut tags = BTreeSet::new();

    for stack in stacks.stage(Stage::Stage2) {
        let Some(winner) = stack.top() else {
            continue;
        };
        if winner.policy() == Policy::Implements {
            tags.extend(winner.tags());
            continue;
        }

        match entrance(winner, class, docs)? {
            Some(value) => {
                tracing::debug!(
                    "Plumbed {} on {} from {} contributions",
                    stack.name(),
                    class.name(),
                    stack.len()
                );
                class.set_attr(stack.name(), value);
            }
            None => {
                tracing::debug!(
                    "Nothing to plumb for {} on {}, skipped",
                    stack.name(),
                    class.name()
                );
            }
        }
    }

    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Instance;
    use crate::value::{Accessor, Method};

    fn docs() -> DocMerger {
        DocMerger::new(".. plbnext::")
    }

    fn class_with(name: &str, value: Value) -> Class {
        Class::with_attrs("Target", vec![], vec![(name.to_string(), value)])
    }

    fn doubling() -> Method {
        Method::link("double", |next, this, args| {
            let inner = next.call(this, args)?;
            Ok(Value::from(inner.as_int().unwrap_or(0) * 2))
        })
    }

    #[test]
    fn test_link_wraps_existing_method() {
        let class = class_with("value", Method::endpoint("value", |_, _| Ok(Value::from(21))).into());
        let instr = Instruction::plumb(doubling()).named("value");
        let entrance = entrance(&instr, &class, &docs()).unwrap().unwrap();

        let mut inst = Instance::new(Arc::new(Class::bare("Caller")));
        let method = entrance.as_method().unwrap();
        assert_eq!(method.invoke(&mut inst, &[]).unwrap(), Value::from(42));
    }

    #[test]
    fn test_endpoint_payload_replaces_existing() {
        let class = class_with("value", Method::endpoint("value", |_, _| Ok(Value::from(21))).into());
        let replacement = Method::endpoint("fixed", |_, _| Ok(Value::from(7)));
        let instr = Instruction::plumb(replacement.clone()).named("value");
        let entrance = entrance(&instr, &class, &docs()).unwrap().unwrap();
        assert_eq!(entrance.as_method(), Some(&replacement));
    }

    #[test]
    fn test_missing_endpoint() {
        let class = Class::bare("Target");
        let plumb = Instruction::plumb(doubling()).named("value");
        let err = entrance(&plumb, &class, &docs()).unwrap_err();
        assert!(matches!(err, PlumbingError::MissingEndpoint { ref name, .. } if name == "value"));

        let optional = Instruction::plumb_if_exists(doubling()).named("value");
        assert!(entrance(&optional, &class, &docs()).unwrap().is_none());
    }

    #[test]
    fn test_docstring_without_existing_doc() {
        let class = Class::bare("Target");
        let instr = Instruction::plumb("Summary.").named("__doc__");
        let value = entrance(&instr, &class, &docs()).unwrap().unwrap();
        assert_eq!(value, Value::from("Summary."));
    }

    #[test]
    fn test_kind_mismatch_collides() {
        let class = class_with("size", Value::from(3));
        let instr = Instruction::plumb(doubling()).named("size");
        let err = entrance(&instr, &class, &docs()).unwrap_err();
        let collision = err.as_collision().unwrap();
        assert_eq!(collision.name, "size");
        assert_eq!(collision.right.payload(), &Value::from(3));
    }

    #[test]
    fn test_accessor_slots_chain_independently() {
        let existing = Accessor::new()
            .getter(Method::endpoint("get", |_, _| Ok(Value::from(5))))
            .setter(Method::endpoint("set", |this, args| {
                this.set_field("_raw", args[0].clone());
                Ok(Value::Nil)
            }));
        let mut class = class_with("size", existing.into());
        let plumbing = Accessor::new().getter(doubling());
        let mut stacks = Stacks::new();
        stacks
            .fold(Instruction::plumb(plumbing).named("size"), &docs(), true)
            .unwrap();
        apply(&stacks, &mut class, &docs()).unwrap();

        let mut inst = Instance::new(Arc::new(class));
        assert_eq!(inst.get("size").unwrap(), Value::from(10));
        inst.set("size", Value::from(7)).unwrap();
        assert_eq!(inst.field("_raw"), Some(&Value::from(7)));
    }

    #[test]
    fn test_tags_are_collected() {
        let mut stacks = Stacks::new();
        stacks
            .fold(Instruction::implements(["b"]), &docs(), true)
            .unwrap();
        stacks
            .fold(Instruction::implements(["a"]), &docs(), true)
            .unwrap();
        let mut class = Class::bare("Target");
        let tags = apply(&stacks, &mut class, &docs()).unwrap();
        assert_eq!(tags.into_iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
