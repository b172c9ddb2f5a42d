//! Stage 1: install folded attribute instructions into the draft table.

use std::sync::Arc;

use crate::core::error::Collision;
use crate::core::types::Stage;
use crate::host::{AttrTable, AttributeSource};
use crate::instruction::{Instruction, Origin, Policy, Stacks};

/// Outcome of installing one folded instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Install {
    Written,
    /// The name was already provided; the instruction yielded
    Skipped,
    /// The class already declares an equal value
    Unchanged,
}

/// Apply one folded instruction to the draft
///
/// `draft` holds the target's own attributes plus everything installed so
/// far; `bases` answers whether an ancestor provides the name.
pub fn install(
    instruction: &Instruction,
    draft: &mut AttrTable,
    bases: &dyn AttributeSource,
    class_name: &str,
) -> Result<Install, Collision> {
    let name = instruction.name().unwrap_or("None");
    let payload = instruction.payload();

    match instruction.policy() {
        Policy::Default => {
            if draft.contains_key(name) || bases.has_attribute(name) {
                return Ok(Install::Skipped);
            }
        }
        Policy::Extend => {
            if draft.contains_key(name) {
                return Ok(Install::Skipped);
            }
        }
        Policy::Finalize | Policy::Overwrite | Policy::Bare => {
            if let Some(own) = draft.get(name) {
                if own == payload {
                    return Ok(Install::Unchanged);
                }
                let declared = Instruction::finalize(own.clone())
                    .named(name)
                    .declared_by(Origin::Class(Arc::from(class_name)));
                return Err(Collision::new(name, instruction.clone(), declared));
            }
        }
        Policy::Plumb | Policy::PlumbIfExists | Policy::Implements => {
            return Ok(Install::Skipped);
        }
    }

    draft.insert(name.to_string(), payload.clone());
    Ok(Install::Written)
}

/// Install every Stage-1 winner in first-seen order
pub fn apply(
    stacks: &Stacks,
    draft: &mut AttrTable,
    bases: &dyn AttributeSource,
    class_name: &str,
) -> Result<(), Collision> {
    for stack in stacks.stage(Stage::Stage1) {
        let Some(winner) = stack.top() else {
            continue;
        };
        match install(winner, draft, bases, class_name)? {
            Install::Written => {
                tracing::trace!("Installed {} on {}", winner, class_name)
            }
            Install::Skipped => {
                tracing::trace!("{} already provided on {}, skipped", stack.name(), class_name)
            }
            Install::Unchanged => {}
        }
    }
    Ok(())
}
