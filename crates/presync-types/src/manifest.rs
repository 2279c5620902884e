//! Package export manifest

use serde::Deserialize;
use std::collections::BTreeMap;

/// Preset exported when a package ships no manifest
pub const DEFAULT_PRESET: &str = "default";

/// Patterns used by the implicit manifest
pub const DEFAULT_RULES_PATTERN: &str = "rules/**/*.md";
pub const DEFAULT_PROMPTS_PATTERN: &str = "prompts/**/*.md";

/// Glob patterns that populate one exported preset
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PresetExports {
    #[serde(default)]
    pub rules: Vec<String>,
    #[serde(default)]
    pub prompts: Vec<String>,
}

/// A package's declaration of the presets it exports
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub exports: BTreeMap<String, PresetExports>,
}

impl Manifest {
    /// Manifest assumed for a package without a manifest file
    pub fn implicit(name: impl Into<String>) -> Self {
        let mut exports = BTreeMap::new();
        exports.insert(
            DEFAULT_PRESET.to_string(),
            PresetExports {
                rules: vec![DEFAULT_RULES_PATTERN.to_string()],
                prompts: vec![DEFAULT_PROMPTS_PATTERN.to_string()],
            },
        );
        Self {
            name: name.into(),
            exports,
        }
    }

    pub fn preset(&self, name: &str) -> Option<&PresetExports> {
        self.exports.get(name)
    }
}
