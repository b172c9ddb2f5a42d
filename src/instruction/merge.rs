//! Merge algebra: pairwise folding of instructions that share a name.
//!
//! | left \ right | default | extend | finalize           | overwrite          |
//! |--------------|---------|--------|--------------------|--------------------|
//! | default      | left    | right  | right              | right              |
//! | extend       | left    | left   | right              | right              |
//! | finalize     | left    | left   | left if equal, else collision | left if equal, else collision |
//! | overwrite    | left    | left   | right              | right              |
//!
//! Plumbing instructions fold with each other by chaining their payloads,
//! tag declarations fold by union. Every other pairing collides.

use std::collections::BTreeSet;

use super::{tags_value, Instruction, Policy};
use crate::core::error::Collision;
use crate::value::{DocMerger, Value};

enum Winner {
    Left,
    Right,
}

/// Fold `right` (declared later) into `left`
pub fn combine(
    left: &Instruction,
    right: &Instruction,
    docs: &DocMerger,
) -> Result<Instruction, Collision> {
    if left == right {
        return Ok(left.clone());
    }

    use Policy::*;
    let winner = match (left.policy(), right.policy()) {
        (Default, Default) => Winner::Left,
        (Default, Extend | Finalize | Overwrite) => Winner::Right,
        (Extend, Default | Extend) => Winner::Left,
        (Extend, Finalize | Overwrite) => Winner::Right,
        (Finalize, Default | Extend) => Winner::Left,
        (Finalize, Finalize | Overwrite) if left.payload() == right.payload() => Winner::Left,
        (Overwrite, Default | Extend) => Winner::Left,
        (Overwrite, Finalize | Overwrite) => Winner::Right,
        (Plumb | PlumbIfExists, Plumb | PlumbIfExists) => {
            return merge_plumbing(left, right, docs);
        }
        (Implements, Implements) => return Ok(merge_tags(left, right)),
        _ => return Err(Collision::between(left, right)),
    };

    Ok(match winner {
        Winner::Left => left.clone(),
        Winner::Right => right.clone(),
    })
}

fn merge_plumbing(
    left: &Instruction,
    right: &Instruction,
    docs: &DocMerger,
) -> Result<Instruction, Collision> {
    let payload = plumb_values(left.payload(), right.payload(), docs)
        .ok_or_else(|| Collision::between(left, right))?;

    // Only stays optional if every contribution was optional
    let policy = if left.policy() == Policy::PlumbIfExists
        && right.policy() == Policy::PlumbIfExists
    {
        Policy::PlumbIfExists
    } else {
        Policy::Plumb
    };

    Ok(left.with_item(payload).with_policy_of(policy))
}

fn merge_tags(left: &Instruction, right: &Instruction) -> Instruction {
    let mut tags: BTreeSet<String> = left.tags();
    tags.extend(right.tags());
    left.with_item(tags_value(&tags))
}

/// Chain a plumbing payload in front of `next`
///
/// Returns `None` when the kinds cannot be chained: text goes with text (or
/// nil), methods with methods, accessors with accessors.
pub fn plumb_values(left: &Value, next: &Value, docs: &DocMerger) -> Option<Value> {
    match (left, next) {
        (Value::Text(l), Value::Text(r)) => Some(Value::Text(docs.merge_text(l, r))),
        (Value::Text(l), Value::Nil) => Some(Value::Text(l.clone())),
        (Value::Method(l), Value::Method(r)) => Some(Value::Method(l.then(r, docs))),
        (Value::Accessor(l), Value::Accessor(r)) => Some(Value::Accessor(l.then(r, docs))),
        _ => None,
    }
}
