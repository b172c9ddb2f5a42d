//! Registry integration tests
//!
//! Loads declarative parts from the bundled data directory and from
//! temporary files, then composes targets by part name.

use plumber::compose::Composer;
use plumber::core::config::PlumbingConfig;
use plumber::host::AttributeSource;
use plumber::registry::{PartRegistry, RegistryError, TargetSpec};
use plumber::tags::TagLedger;
use plumber::value::Value;
use std::fs;
use std::path::Path;
use std::sync::Arc;

fn bundled() -> PartRegistry {
    let mut registry = PartRegistry::new();
    registry
        .load_directory(Path::new("data/parts"))
        .expect("bundled parts load");
    registry
}

fn composer() -> Composer {
    Composer::with_config(PlumbingConfig::default())
}

#[test]
fn test_bundled_parts_load_recursively() {
    let registry = bundled();
    assert_eq!(registry.len(), 4);
    for name in ["Greeter", "Formal", "Retry", "StrictRetry"] {
        assert!(registry.get(name).is_some(), "missing part {}", name);
    }
}

#[test]
fn test_compose_bundled_parts() {
    let ledger = Arc::new(TagLedger::new());
    let composer = composer().tag_registry(ledger.clone());
    let class = bundled()
        .compose(
            &composer,
            &TargetSpec::new("Client").part("Greeter").part("Retry"),
        )
        .unwrap();

    assert_eq!(class.lookup("greet"), Some(&Value::from("hi")));
    assert_eq!(class.lookup("salutation"), Some(&Value::from("Dear")));
    assert_eq!(class.lookup("retries"), Some(&Value::from(3)));
    assert_eq!(
        class.lookup("backoff"),
        Some(&Value::List(vec![Value::from(1), Value::from(2), Value::from(4)]))
    );
    assert_eq!(
        class.lookup("__doc__"),
        Some(&Value::from("Greets people.\nRetries failed calls.\n"))
    );
    assert!(ledger.provides(&class, "greeting"));
    assert!(ledger.provides(&class, "resilience"));
}

#[test]
fn test_bundled_collision_is_reported() {
    let err = bundled()
        .compose(
            &composer(),
            &TargetSpec::new("Confused").part("Greeter").part("Formal"),
        )
        .unwrap_err();
    match err {
        RegistryError::Composition { target, source } => {
            assert_eq!(target, "Confused");
            assert_eq!(source.as_collision().unwrap().name, "greet");
        }
        other => panic!("unexpected error {}", other),
    }
}

#[test]
fn test_finalize_beats_extend_across_files() {
    let class = bundled()
        .compose(
            &composer(),
            &TargetSpec::new("Careful").part("Retry").part("StrictRetry"),
        )
        .unwrap();
    assert_eq!(class.lookup("retries"), Some(&Value::from(1)));
    assert!(!class.has_attribute("__doc__"));
}

#[test]
fn test_load_from_temp_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("audit.toml"),
        "[part]\nname = \"Audit\"\ntags = [\"audit\"]\n\n[attrs]\nlevel = { default = \"info\" }\n",
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "not a part").unwrap();

    let mut registry = PartRegistry::new();
    let loaded = registry.load_directory(dir.path()).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name(), "Audit");

    let class = registry
        .compose(
            &composer(),
            &TargetSpec::new("Service").part("Audit").attr("level", "debug"),
        )
        .unwrap();
    assert_eq!(class.lookup("level"), Some(&Value::from("debug")));
}

#[test]
fn test_malformed_file_names_its_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[part\nname = ").unwrap();

    let err = PartRegistry::new().load_file(&path).unwrap_err();
    assert!(matches!(err, RegistryError::Parse { .. }));
    assert!(err.to_string().contains("broken.toml"));
}

#[test]
fn test_missing_directory_is_io_error() {
    let err = PartRegistry::new()
        .load_directory(Path::new("data/does-not-exist"))
        .unwrap_err();
    assert!(matches!(err, RegistryError::Io { .. }));
}

#[test]
fn test_compose_many_in_parallel() {
    let registry = bundled();
    let specs: Vec<TargetSpec> = (0..32)
        .map(|i| {
            let spec = TargetSpec::new(format!("Target{}", i)).part("Retry");
            if i % 2 == 0 {
                spec.part("Greeter")
            } else {
                spec.part("StrictRetry")
            }
        })
        .collect();

    let results = registry.compose_many(&composer(), &specs);
    assert_eq!(results.len(), 32);
    for (i, result) in results.iter().enumerate() {
        let class = result.as_ref().unwrap();
        assert_eq!(class.name(), format!("Target{}", i));
        let expected = if i % 2 == 0 { 3 } else { 1 };
        assert_eq!(class.lookup("retries"), Some(&Value::from(expected)));
    }
    assert!(registry.get("Retry").unwrap().is_parsed());
}
