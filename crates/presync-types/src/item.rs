//! Canonical rule and prompt items and the aggregates built from them

use crate::uri::Uri;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Activation policy of a rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AttachType {
    Always,
    Glob,
    AgentRequested,
    #[default]
    Manual,
    /// A value outside the known set, kept verbatim so each agent can
    /// decide how strict to be about it
    Unrecognized(String),
}

impl AttachType {
    pub fn as_str(&self) -> &str {
        match self {
            AttachType::Always => "always",
            AttachType::Glob => "glob",
            AttachType::AgentRequested => "agent-requested",
            AttachType::Manual => "manual",
            AttachType::Unrecognized(value) => value,
        }
    }
}

impl From<&str> for AttachType {
    fn from(value: &str) -> Self {
        match value.trim() {
            "always" => AttachType::Always,
            "glob" => AttachType::Glob,
            "agent-requested" => AttachType::AgentRequested,
            "manual" => AttachType::Manual,
            other => AttachType::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for AttachType {
    fn from(value: String) -> Self {
        AttachType::from(value.as_str())
    }
}

impl From<AttachType> for String {
    fn from(value: AttachType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for AttachType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed metadata of a rule, as found in a source file's frontmatter
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuleMetadata {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attach: AttachType,
    #[serde(default, deserialize_with = "string_or_list")]
    pub globs: Vec<String>,
}

/// Typed metadata of a prompt
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PromptMetadata {
    #[serde(default)]
    pub description: String,
}

/// Accept `globs: "*.go"` as well as `globs: ["*.go"]`
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Nothing(()),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
        OneOrMany::Nothing(()) => Vec::new(),
    })
}

/// A canonical rule. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleItem {
    uri: Uri,
    content: String,
    metadata: RuleMetadata,
}

impl RuleItem {
    /// Build a rule, deriving an empty description from the content's
    /// first level-1 heading.
    pub fn new(uri: Uri, content: impl Into<String>, mut metadata: RuleMetadata) -> Self {
        let content = content.into();
        if metadata.description.is_empty() {
            metadata.description = derive_description(&content);
        }
        Self::restore(uri, content, metadata)
    }

    /// Rebuild a rule from metadata that was already derived once.
    pub fn restore(uri: Uri, content: impl Into<String>, mut metadata: RuleMetadata) -> Self {
        metadata.globs = if metadata.attach == AttachType::Glob {
            dedup_ordered(metadata.globs)
        } else {
            Vec::new()
        };
        Self {
            uri,
            content: content.into(),
            metadata,
        }
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn metadata(&self) -> &RuleMetadata {
        &self.metadata
    }
}

/// A canonical prompt. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptItem {
    uri: Uri,
    content: String,
    metadata: PromptMetadata,
}

impl PromptItem {
    /// Build a prompt, deriving an empty description from the content's
    /// first level-1 heading.
    pub fn new(uri: Uri, content: impl Into<String>, mut metadata: PromptMetadata) -> Self {
        let content = content.into();
        if metadata.description.is_empty() {
            metadata.description = derive_description(&content);
        }
        Self::restore(uri, content, metadata)
    }

    /// Rebuild a prompt from metadata that was already derived once.
    pub fn restore(uri: Uri, content: impl Into<String>, metadata: PromptMetadata) -> Self {
        Self {
            uri,
            content: content.into(),
            metadata,
        }
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn metadata(&self) -> &PromptMetadata {
        &self.metadata
    }
}

/// One named preset inside a package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentPreset {
    pub name: String,
    pub rules: Vec<RuleItem>,
    pub prompts: Vec<PromptItem>,
}

impl AgentPreset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            prompts: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.prompts.is_empty()
    }
}

/// All presets loaded from one package; the unit handed to a writer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentPresetPackage {
    pub package_name: String,
    pub presets: Vec<AgentPreset>,
}

impl AgentPresetPackage {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            presets: Vec::new(),
        }
    }

    pub fn item_count(&self) -> usize {
        self.presets
            .iter()
            .map(|p| p.rules.len() + p.prompts.len())
            .sum()
    }
}

fn dedup_ordered(values: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(values.len());
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

/// Text of the first `# heading`, with emphasis markers removed
fn derive_description(content: &str) -> String {
    let mut in_fence = false;
    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            continue;
        }
        if in_fence {
            continue;
        }
        if let Some(heading) = line.strip_prefix("# ").or_else(|| line.strip_prefix("#\t")) {
            return strip_emphasis(heading.trim().trim_end_matches('#').trim_end());
        }
    }
    String::new()
}

fn strip_emphasis(text: &str) -> String {
    text.replace('*', "")
        .split(' ')
        .map(|word| word.trim_matches('_'))
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}
