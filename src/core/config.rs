//! Composition configuration
//!
//! The few knobs that change how parts are parsed and how plumbed
//! docstrings are stitched together. Loaded from TOML or left at defaults.

use serde::Deserialize;
use std::path::Path;

/// Configuration for parsing parts and applying instructions
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlumbingConfig {
    /// Part entries whose key starts with this prefix are composition
    /// metadata and never become instructions
    pub reserved_prefix: String,

    /// Line marker in a plumbed docstring that is replaced by the docstring
    /// of the next link
    ///
    /// Without the marker the next docstring is appended after a newline.
    pub doc_marker: String,

    /// Register folded capability tags with the tag registry
    ///
    /// When false, `implements` instructions are still folded (so they can
    /// collide) but nothing is registered.
    pub register_tags: bool,

    /// Skip recording an instruction equal to the current winner for the
    /// same name
    ///
    /// The fold itself is idempotent either way; this only keeps repeated
    /// declarations out of the stack history.
    pub drop_duplicates: bool,
}

impl Default for PlumbingConfig {
    fn default() -> Self {
        Self {
            reserved_prefix: "__plumbing".to_string(),
            doc_marker: ".. plbnext::".to_string(),
            register_tags: true,
            drop_duplicates: true,
        }
    }
}

impl PlumbingConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML, missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        let config: PlumbingConfig =
            toml::from_str(content).map_err(|e| format!("Invalid config TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.reserved_prefix.is_empty() {
            return Err("reserved_prefix must not be empty (it would reserve every name)".into());
        }

        if self.doc_marker.trim().is_empty() {
            return Err("doc_marker must contain non-whitespace characters".into());
        }

        if self.doc_marker.contains('\n') {
            return Err(format!(
                "doc_marker ({:?}) must fit on a single line",
                self.doc_marker
            ));
        }

        Ok(())
    }

    /// Whether an attribute key is composition metadata
    pub fn is_reserved(&self, key: &str) -> bool {
        key.starts_with(&self.reserved_prefix)
    }
}

// === GLOBAL CONFIG ACCESS ===

use std::sync::OnceLock;

static CONFIG: OnceLock<PlumbingConfig> = OnceLock::new();

/// Get the global plumbing config (initializes with defaults if not set)
pub fn config() -> &'static PlumbingConfig {
    CONFIG.get_or_init(PlumbingConfig::default)
}

/// Set the global plumbing config (can only be called once)
///
/// Returns Err if config was already set.
pub fn set_config(config: PlumbingConfig) -> Result<(), PlumbingConfig> {
    CONFIG.set(config)
}
