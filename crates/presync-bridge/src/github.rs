//! GitHub Copilot bridge
//!
//! Instructions (`.github/instructions/*.instructions.md`) carry a single
//! `applyTo` glob field; prompts (`.github/prompts/*.prompt.md`) carry an
//! optional `description`. Frontmatter is plain YAML and is left out
//! entirely when it would be empty.

use crate::frontmatter::{self, normalize_content};
use crate::Bridge;
use presync_types::{
    AttachType, ItemType, PresyncError, PromptItem, PromptMetadata, Result, RuleItem,
    RuleMetadata, Uri,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// `applyTo` value that attaches an instruction to every file
pub const APPLY_TO_ALL: &str = "**";

/// A Copilot instructions file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopilotRule {
    /// Address of the canonical item
    pub uri: Uri,
    /// Markdown body
    pub content: String,
    /// Comma-separated globs the instructions apply to
    pub apply_to: String,
}

/// A Copilot prompt file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopilotPrompt {
    /// Address of the canonical item
    pub uri: Uri,
    /// Markdown body
    pub content: String,
    /// Prompt description
    pub description: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RuleFrontmatter {
    #[serde(rename = "applyTo", default, skip_serializing_if = "String::is_empty")]
    apply_to: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PromptFrontmatter {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    description: String,
}

/// Converter for the GitHub Copilot formats
#[derive(Debug, Clone, Copy, Default)]
pub struct CopilotBridge;

impl Bridge for CopilotBridge {
    type Rule = CopilotRule;
    type Prompt = CopilotPrompt;

    const NAME: &'static str = "github";

    fn to_agent_rule(&self, rule: &RuleItem) -> Result<CopilotRule> {
        let metadata = rule.metadata();
        // Unknown attach types fall back to manual instead of failing.
        // TODO: align with the strict agents once the expected behavior is decided
        let apply_to = match &metadata.attach {
            AttachType::Always => APPLY_TO_ALL.to_string(),
            AttachType::Glob => metadata.globs.join(","),
            AttachType::AgentRequested | AttachType::Manual => String::new(),
            AttachType::Unrecognized(value) => {
                warn!(
                    "{}: rendering {} as manual, unsupported attach type '{}'",
                    Self::NAME,
                    rule.uri(),
                    value
                );
                String::new()
            }
        };

        Ok(CopilotRule {
            uri: rule.uri().clone(),
            content: rule.content().to_string(),
            apply_to,
        })
    }

    fn from_agent_rule(&self, rule: &CopilotRule) -> Result<RuleItem> {
        let apply_to = rule.apply_to.trim();
        let metadata = if apply_to == APPLY_TO_ALL {
            RuleMetadata {
                attach: AttachType::Always,
                ..Default::default()
            }
        } else if !apply_to.is_empty() {
            RuleMetadata {
                attach: AttachType::Glob,
                globs: apply_to
                    .split(',')
                    .map(str::trim)
                    .filter(|g| !g.is_empty())
                    .map(String::from)
                    .collect(),
                ..Default::default()
            }
        } else {
            RuleMetadata::default()
        };

        Ok(RuleItem::restore(rule.uri.clone(), rule.content.clone(), metadata))
    }

    fn serialize_agent_rule(&self, rule: &CopilotRule) -> Result<String> {
        let fields = RuleFrontmatter {
            apply_to: rule.apply_to.clone(),
        };
        with_frontmatter(&fields, &rule.content, &rule.uri)
    }

    fn deserialize_agent_rule(&self, slug: &str, text: &str) -> Result<CopilotRule> {
        let document = frontmatter::split(text)?;
        let parsed: RuleFrontmatter = match document.frontmatter {
            Some(yaml) => {
                frontmatter::parse(&frontmatter::requote(yaml, &["applyTo"]), Path::new(slug))?
            }
            None => RuleFrontmatter::default(),
        };

        Ok(CopilotRule {
            uri: Uri::from_slug(ItemType::Rules, slug),
            content: document.body.to_string(),
            apply_to: parsed.apply_to,
        })
    }

    fn to_agent_prompt(&self, prompt: &PromptItem) -> Result<CopilotPrompt> {
        Ok(CopilotPrompt {
            uri: prompt.uri().clone(),
            content: prompt.content().to_string(),
            description: prompt.metadata().description.clone(),
        })
    }

    fn from_agent_prompt(&self, prompt: &CopilotPrompt) -> Result<PromptItem> {
        Ok(PromptItem::restore(
            prompt.uri.clone(),
            prompt.content.clone(),
            PromptMetadata {
                description: prompt.description.clone(),
            },
        ))
    }

    fn serialize_agent_prompt(&self, prompt: &CopilotPrompt) -> Result<String> {
        let fields = PromptFrontmatter {
            description: prompt.description.clone(),
        };
        with_frontmatter(&fields, &prompt.content, &prompt.uri)
    }

    fn deserialize_agent_prompt(&self, slug: &str, text: &str) -> Result<CopilotPrompt> {
        let document = frontmatter::split(text)?;
        let parsed: PromptFrontmatter = match document.frontmatter {
            Some(yaml) => frontmatter::parse(
                &frontmatter::requote(yaml, &["description"]),
                Path::new(slug),
            )?,
            None => PromptFrontmatter::default(),
        };

        Ok(CopilotPrompt {
            uri: Uri::from_slug(ItemType::Prompts, slug),
            content: document.body.to_string(),
            description: parsed.description,
        })
    }
}

/// Marshal `fields` as YAML; an empty mapping leaves only the content
fn with_frontmatter<T: Serialize>(fields: &T, content: &str, uri: &Uri) -> Result<String> {
    let yaml = serde_yaml::to_string(fields)
        .map_err(|e| PresyncError::frontmatter(uri.path.as_str(), e))?;
    let yaml = yaml.trim_end();
    let content = normalize_content(content);

    if yaml.is_empty() || yaml == "{}" {
        return Ok(content);
    }
    Ok(format!("---\n{yaml}\n---\n{content}"))
}
