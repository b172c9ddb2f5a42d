//! Load data-only parts from TOML
//!
//! ```toml
//! [part]
//! name = "Greeter"
//! tags = ["greeting"]
//!
//! [attrs]
//! greet = "hi"                      # finalize
//! salutation = { default = "Dear" }
//! __doc__ = { plumb = "Greets people." }
//! ```

use crate::instruction::{Instruction, Policy};
use crate::part::{Part, PartBuilder};
use crate::value::Value;

use super::RegistryError;

/// Parse one part declaration; `source` names the input in errors
pub fn parse_part_toml(content: &str, source: &str) -> Result<Part, RegistryError> {
    let toml: toml::Value = content.parse().map_err(|e| RegistryError::Parse {
        source_name: source.to_string(),
        message: format!("Invalid TOML: {}", e),
    })?;

    let header = toml.get("part").ok_or_else(|| RegistryError::Parse {
        source_name: source.to_string(),
        message: "missing [part] table".to_string(),
    })?;

    let name = header
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RegistryError::Parse {
            source_name: source.to_string(),
            message: "part missing name".to_string(),
        })?;

    let mut builder = Part::builder(name);

    if let Some(tags) = header.get("tags") {
        let tags = tags.as_array().ok_or_else(|| RegistryError::InvalidEntry {
            part: name.to_string(),
            key: "tags".to_string(),
            message: "tags must be an array of strings".to_string(),
        })?;
        let mut names = Vec::with_capacity(tags.len());
        for tag in tags {
            let tag = tag.as_str().ok_or_else(|| RegistryError::InvalidEntry {
                part: name.to_string(),
                key: "tags".to_string(),
                message: format!("tag {} is not a string", tag),
            })?;
            names.push(tag.to_string());
        }
        builder = builder.implements(names);
    }

    if let Some(attrs) = toml.get("attrs") {
        let attrs = attrs.as_table().ok_or_else(|| RegistryError::Parse {
            source_name: source.to_string(),
            message: "[attrs] must be a table".to_string(),
        })?;
        for (key, value) in attrs {
            builder = add_entry(builder, name, key, value)?;
        }
    }

    Ok(builder.build())
}

fn add_entry(
    builder: PartBuilder,
    part: &str,
    key: &str,
    value: &toml::Value,
) -> Result<PartBuilder, RegistryError> {
    let value = convert(value, part, key)?;
    Ok(match value {
        Value::Instruction(instruction) => builder.instruction(key, *instruction),
        plain => builder.attr(key, plain),
    })
}

/// Convert a TOML value; single-key policy tables become instructions
pub fn convert(value: &toml::Value, part: &str, key: &str) -> Result<Value, RegistryError> {
    let invalid = |message: String| RegistryError::InvalidEntry {
        part: part.to_string(),
        key: key.to_string(),
        message,
    };

    Ok(match value {
        toml::Value::String(s) => Value::Text(s.clone()),
        toml::Value::Integer(i) => Value::Int(*i),
        toml::Value::Float(f) => Value::from(*f),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(d) => Value::Text(d.to_string()),
        toml::Value::Array(items) => Value::List(
            items
                .iter()
                .map(|item| match item {
                    toml::Value::Table(_) => {
                        Err(invalid("tables are not allowed inside arrays".to_string()))
                    }
                    other => convert(other, part, key),
                })
                .collect::<Result<Vec<_>, _>>()?,
        ),
        toml::Value::Table(table) => {
            let mut entries = table.iter();
            let (keyword, inner) = match (entries.next(), entries.next()) {
                (Some(entry), None) => entry,
                _ => {
                    return Err(invalid(
                        "a table entry must hold exactly one policy key".to_string(),
                    ))
                }
            };
            let policy = Policy::parse(keyword).ok_or_else(|| RegistryError::UnknownPolicy {
                part: part.to_string(),
                key: key.to_string(),
                policy: keyword.clone(),
            })?;
            let inner = convert(inner, part, key)?;
            Value::from(instruction_for(policy, inner).map_err(invalid)?)
        }
    })
}

fn instruction_for(policy: Policy, item: Value) -> Result<Instruction, String> {
    Ok(match policy {
        Policy::Default => Instruction::default(item),
        Policy::Extend => Instruction::extend(item),
        Policy::Finalize => Instruction::finalize(item),
        Policy::Overwrite => Instruction::overwrite(item),
        Policy::Plumb | Policy::PlumbIfExists => {
            if !matches!(item, Value::Text(_) | Value::Instruction(_)) {
                return Err(format!("cannot plumb a {} from data", item.kind()));
            }
            if policy == Policy::Plumb {
                Instruction::plumb(item)
            } else {
                Instruction::plumb_if_exists(item)
            }
        }
        Policy::Implements | Policy::Bare => {
            return Err(format!("{} is not allowed in [attrs]; use [part] tags", policy))
        }
    })
}
