//! Import configuration
//!
//! The configuration controls how far the dependency resolver expands each
//! requested object and how the importer treats cycles and objects already
//! present in the target. It can be built in code or parsed from a TOML
//! file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sync_model::TypeTag;

use crate::error::Result;

fn default_true() -> bool {
    true
}

fn default_max_depth() -> usize {
    10
}

/// Knobs for one import run
///
/// # Example
///
/// ```
/// use sync_engine::ImportConfig;
///
/// let config = ImportConfig::parse(r#"
/// include_owned = true
/// max_depth = 3
/// owned_types = ["sense", "example"]
/// allow_cycles = true
/// "#).unwrap();
///
/// assert_eq!(config.max_depth, 3);
/// assert!(config.allow_cycles);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Expand into owned sub-objects
    #[serde(default = "default_true")]
    pub include_owned: bool,

    /// Follow reference fields to the objects they point at
    #[serde(default = "default_true")]
    pub resolve_references: bool,

    /// Maximum ownership depth to expand to
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Allow-list of owned types to expand into; `None` expands all
    #[serde(default)]
    pub owned_types: Option<Vec<TypeTag>>,

    /// Skip objects already present in the target instead of attempting
    /// (and failing) to create them again
    #[serde(default = "default_true")]
    pub skip_existing: bool,

    /// Tolerate cyclic graphs by severing their weakest edges; when false,
    /// any cycle fails the run immediately
    #[serde(default)]
    pub allow_cycles: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            include_owned: true,
            resolve_references: true,
            max_depth: default_max_depth(),
            owned_types: None,
            skip_existing: true,
            allow_cycles: false,
        }
    }
}

impl ImportConfig {
    /// Parse a configuration from TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let config: ImportConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load a configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Whether `ty` may be expanded as an owned sub-object
    pub fn allows_owned_type(&self, ty: &TypeTag) -> bool {
        match &self.owned_types {
            Some(allowed) => allowed.contains(ty),
            None => true,
        }
    }
}
