//! Turns a part's attribute table into named instructions.

use std::sync::Arc;

use super::Part;
use crate::core::config::PlumbingConfig;
use crate::core::types::TAGS_ATTR;
use crate::instruction::{Instruction, Origin};
use crate::value::Value;

/// Parse every contributed entry of a part
///
/// Undecorated values become `finalize`. Instruction-wrapped values keep
/// their policy. Every instruction is named after its key and declared by
/// the part. Keys with the reserved prefix are skipped; declared tags become
/// a single `implements` instruction.
pub fn parse_part(part: &Part, config: &PlumbingConfig) -> Vec<Instruction> {
    let origin = Origin::Part {
        id: part.id(),
        name: Arc::from(part.name()),
    };

    let mut instructions = Vec::with_capacity(part.attrs().len() + 1);
    for (key, value) in part.attrs() {
        if config.is_reserved(key) {
            tracing::trace!("Skipping reserved entry {} of part {}", key, part.name());
            continue;
        }
        let instruction = match value {
            Value::Instruction(instr) => (**instr).clone(),
            plain => Instruction::finalize(plain.clone()),
        };
        instructions.push(instruction.named(key.as_str()).declared_by(origin.clone()));
    }

    if !part.tags().is_empty() {
        instructions.push(
            Instruction::implements(part.tags().iter().cloned())
                .named(TAGS_ATTR)
                .declared_by(origin),
        );
    }

    tracing::debug!(
        "Parsed part {} into {} instructions",
        part.name(),
        instructions.len()
    );
    instructions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Policy;

    #[test]
    fn test_undecorated_entries_are_final() {
        let part = Part::builder("Greeter").attr("greet", "hi").build();
        let instructions = parse_part(&part, &PlumbingConfig::default());
        assert_eq!(instructions.len(), 1);
        assert_eq!(instructions[0].policy(), Policy::Finalize);
        assert_eq!(instructions[0].name(), Some("greet"));
        assert_eq!(instructions[0].payload(), &Value::from("hi"));
        assert!(matches!(
            instructions[0].origin(),
            Some(Origin::Part { name, .. }) if &**name == "Greeter"
        ));
    }

    #[test]
    fn test_wrapped_entries_keep_policy_and_take_key() {
        let part = Part::builder("Defaults")
            .instruction("name", Instruction::default("anon").named("ignored"))
            .build();
        let instructions = parse_part(&part, &PlumbingConfig::default());
        assert_eq!(instructions[0].policy(), Policy::Default);
        assert_eq!(instructions[0].name(), Some("name"));
    }

    #[test]
    fn test_reserved_entries_are_skipped() {
        let part = Part::builder("Meta")
            .attr("__plumbing_notes__", "internal")
            .attr("visible", 1)
            .build();
        let instructions = parse_part(&part, &PlumbingConfig::default());
        let names: Vec<_> = instructions.iter().filter_map(|i| i.name()).collect();
        assert_eq!(names, vec!["visible"]);
    }

    #[test]
    fn test_tags_become_one_implements() {
        let part = Part::builder("Tagged")
            .implements(["b", "a"])
            .implements(["a"])
            .build();
        let instructions = parse_part(&part, &PlumbingConfig::default());
        assert_eq!(instructions.len(), 1);
        assert_eq!(instructions[0].policy(), Policy::Implements);
        assert_eq!(instructions[0], Instruction::implements(["a", "b"]));
    }

    #[test]
    fn test_custom_prefix() {
        let config = PlumbingConfig {
            reserved_prefix: "_meta".to_string(),
            ..PlumbingConfig::default()
        };
        let part = Part::builder("P")
            .attr("_meta_version", 2)
            .attr("__plumbing_x", 1)
            .build();
        let instructions = parse_part(&part, &config);
        let names: Vec<_> = instructions.iter().filter_map(|i| i.name()).collect();
        assert_eq!(names, vec!["__plumbing_x"]);
    }
}
