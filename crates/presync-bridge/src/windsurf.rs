//! Windsurf bridge
//!
//! Windsurf rules select their activation through a `trigger` field. The
//! frontmatter is assembled line by line: `trigger` first, then
//! `description` and `globs` when they are set, all unquoted. Reading it
//! back therefore re-quotes those values before handing them to YAML.

use crate::frontmatter::{self, normalize_content, raw_value, single_line};
use crate::Bridge;
use presync_types::{
    AttachType, ItemType, PresyncError, PromptItem, PromptMetadata, Result, RuleItem,
    RuleMetadata, Uri,
};
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// Activation mode of a Windsurf rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// `always_on`
    AlwaysOn,
    /// `glob`
    Glob,
    /// `model_decision`
    ModelDecision,
    /// `manual`
    Manual,
}

impl Trigger {
    /// Value written to the `trigger` field
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::AlwaysOn => "always_on",
            Trigger::Glob => "glob",
            Trigger::ModelDecision => "model_decision",
            Trigger::Manual => "manual",
        }
    }

    /// Parse a `trigger` value
    pub fn parse(value: &str) -> Result<Self> {
        match value.trim() {
            "always_on" => Ok(Trigger::AlwaysOn),
            "glob" => Ok(Trigger::Glob),
            "model_decision" => Ok(Trigger::ModelDecision),
            "manual" => Ok(Trigger::Manual),
            other => Err(PresyncError::UnsupportedAttach {
                agent: WindsurfBridge::NAME.to_string(),
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A Windsurf rule file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindsurfRule {
    /// Address of the canonical item
    pub uri: Uri,
    /// Markdown body
    pub content: String,
    /// Activation mode
    pub trigger: Trigger,
    /// Rule description
    pub description: String,
    /// Comma-separated globs, set for [`Trigger::Glob`] only
    pub globs: String,
}

/// A Windsurf workflow (prompt) file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindsurfPrompt {
    /// Address of the canonical item
    pub uri: Uri,
    /// Markdown body
    pub content: String,
    /// Workflow description
    pub description: String,
}

#[derive(Debug, Default, Deserialize)]
struct RuleFrontmatter {
    #[serde(default)]
    trigger: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    globs: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PromptFrontmatter {
    #[serde(default)]
    description: Option<String>,
}

/// Converter for the Windsurf formats
#[derive(Debug, Clone, Copy, Default)]
pub struct WindsurfBridge;

impl Bridge for WindsurfBridge {
    type Rule = WindsurfRule;
    type Prompt = WindsurfPrompt;

    const NAME: &'static str = "windsurf";

    fn to_agent_rule(&self, rule: &RuleItem) -> Result<WindsurfRule> {
        let metadata = rule.metadata();
        let (trigger, globs) = match &metadata.attach {
            AttachType::Always => (Trigger::AlwaysOn, String::new()),
            AttachType::Glob => (Trigger::Glob, metadata.globs.join(",")),
            AttachType::AgentRequested => (Trigger::ModelDecision, String::new()),
            AttachType::Manual => (Trigger::Manual, String::new()),
            AttachType::Unrecognized(value) => {
                return Err(PresyncError::UnsupportedAttach {
                    agent: Self::NAME.to_string(),
                    value: value.clone(),
                });
            }
        };

        Ok(WindsurfRule {
            uri: rule.uri().clone(),
            content: rule.content().to_string(),
            trigger,
            description: metadata.description.clone(),
            globs,
        })
    }

    fn from_agent_rule(&self, rule: &WindsurfRule) -> Result<RuleItem> {
        let attach = match rule.trigger {
            Trigger::AlwaysOn => AttachType::Always,
            Trigger::Glob => AttachType::Glob,
            Trigger::ModelDecision => AttachType::AgentRequested,
            Trigger::Manual => AttachType::Manual,
        };
        let globs = rule
            .globs
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(String::from)
            .collect();

        let metadata = RuleMetadata {
            description: rule.description.clone(),
            attach,
            globs,
        };
        Ok(RuleItem::restore(rule.uri.clone(), rule.content.clone(), metadata))
    }

    fn serialize_agent_rule(&self, rule: &WindsurfRule) -> Result<String> {
        let mut text = format!("---\ntrigger: {}\n", rule.trigger);

        let description = single_line(&rule.description);
        if !description.trim().is_empty() {
            text.push_str(&format!("description: {}\n", raw_value(description.trim())));
        }
        if !rule.globs.trim().is_empty() {
            text.push_str(&format!("globs: {}\n", raw_value(rule.globs.trim())));
        }

        text.push_str("---\n");
        text.push_str(&body(&rule.content));
        Ok(text)
    }

    fn deserialize_agent_rule(&self, slug: &str, text: &str) -> Result<WindsurfRule> {
        let document = frontmatter::split(text)?;
        let yaml = document
            .frontmatter
            .ok_or_else(|| PresyncError::frontmatter(slug, "no frontmatter block found"))?;
        let parsed: RuleFrontmatter = frontmatter::parse(
            &frontmatter::requote(yaml, &["description", "globs"]),
            Path::new(slug),
        )?;

        let trigger = parsed
            .trigger
            .ok_or_else(|| PresyncError::frontmatter(slug, "missing trigger"))?;

        Ok(WindsurfRule {
            uri: Uri::from_slug(ItemType::Rules, slug),
            content: document.body.to_string(),
            trigger: Trigger::parse(&trigger)?,
            description: parsed.description.unwrap_or_default(),
            globs: parsed.globs.unwrap_or_default(),
        })
    }

    fn to_agent_prompt(&self, prompt: &PromptItem) -> Result<WindsurfPrompt> {
        Ok(WindsurfPrompt {
            uri: prompt.uri().clone(),
            content: prompt.content().to_string(),
            description: prompt.metadata().description.clone(),
        })
    }

    fn from_agent_prompt(&self, prompt: &WindsurfPrompt) -> Result<PromptItem> {
        Ok(PromptItem::restore(
            prompt.uri.clone(),
            prompt.content.clone(),
            PromptMetadata {
                description: prompt.description.clone(),
            },
        ))
    }

    fn serialize_agent_prompt(&self, prompt: &WindsurfPrompt) -> Result<String> {
        let description = single_line(&prompt.description);
        if description.trim().is_empty() {
            return Ok(normalize_content(&prompt.content));
        }
        Ok(format!(
            "---\ndescription: {}\n---\n{}",
            raw_value(description.trim()),
            body(&prompt.content)
        ))
    }

    fn deserialize_agent_prompt(&self, slug: &str, text: &str) -> Result<WindsurfPrompt> {
        let document = frontmatter::split(text)?;
        let parsed: PromptFrontmatter = match document.frontmatter {
            Some(yaml) => frontmatter::parse(
                &frontmatter::requote(yaml, &["description"]),
                Path::new(slug),
            )?,
            None => PromptFrontmatter::default(),
        };

        Ok(WindsurfPrompt {
            uri: Uri::from_slug(ItemType::Prompts, slug),
            content: document.body.to_string(),
            description: parsed.description.unwrap_or_default(),
        })
    }
}

/// Body below a frontmatter block; empty content leaves a blank line
fn body(content: &str) -> String {
    let content = normalize_content(content);
    if content.is_empty() {
        "\n".to_string()
    } else {
        content
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rule(attach: AttachType, description: &str, globs: &[&str]) -> RuleItem {
        RuleItem::restore(
            Uri::from_slug(ItemType::Rules, "style"),
            "Body\n",
            RuleMetadata {
                description: description.into(),
                attach,
                globs: globs.iter().map(|g| g.to_string()).collect(),
            },
        )
    }

    #[test]
    fn test_trigger_mapping() {
        let bridge = WindsurfBridge;
        let cases = [
            (AttachType::Always, Trigger::AlwaysOn),
            (AttachType::Glob, Trigger::Glob),
            (AttachType::AgentRequested, Trigger::ModelDecision),
            (AttachType::Manual, Trigger::Manual),
        ];
        for (attach, trigger) in cases {
            let agent_rule = bridge.to_agent_rule(&rule(attach, "", &["*.py"])).unwrap();
            assert_eq!(agent_rule.trigger, trigger);
        }
    }

    #[test]
    fn test_unrecognized_attach_is_an_error() {
        let err = WindsurfBridge
            .to_agent_rule(&rule(AttachType::Unrecognized("often".into()), "", &[]))
            .unwrap_err();
        assert!(matches!(
            err,
            PresyncError::UnsupportedAttach { ref value, .. } if value == "often"
        ));
    }

    #[test]
    fn test_serialize_field_by_field() {
        let agent_rule = WindsurfBridge
            .to_agent_rule(&rule(AttachType::Glob, "  Python style  ", &["*.py", "tests/**"]))
            .unwrap();
        assert_eq!(
            WindsurfBridge.serialize_agent_rule(&agent_rule).unwrap(),
            "---\ntrigger: glob\ndescription: Python style\nglobs: *.py,tests/**\n---\nBody\n"
        );
    }

    #[test]
    fn test_serialize_minimal() {
        let agent_rule = WindsurfRule {
            uri: Uri::from_slug(ItemType::Rules, "x"),
            content: String::new(),
            trigger: Trigger::Manual,
            description: String::new(),
            globs: String::new(),
        };
        assert_eq!(
            WindsurfBridge.serialize_agent_rule(&agent_rule).unwrap(),
            "---\ntrigger: manual\n---\n\n"
        );
    }

    #[test]
    fn test_deserialize_requotes_globs() {
        let text = "---\ntrigger: glob\ndescription: Style: strict\nglobs: *.py,[ab]*.md\n---\nBody\n";
        let agent_rule = WindsurfBridge.deserialize_agent_rule("py", text).unwrap();
        assert_eq!(agent_rule.trigger, Trigger::Glob);
        assert_eq!(agent_rule.description, "Style: strict");
        assert_eq!(agent_rule.globs, "*.py,[ab]*.md");
    }

    #[test]
    fn test_deserialize_unknown_trigger() {
        let text = "---\ntrigger: sometimes\n---\nBody\n";
        assert!(matches!(
            WindsurfBridge.deserialize_agent_rule("x", text),
            Err(PresyncError::UnsupportedAttach { .. })
        ));
    }

    #[test]
    fn test_deserialize_requires_trigger() {
        assert!(matches!(
            WindsurfBridge.deserialize_agent_rule("x", "Body\n"),
            Err(PresyncError::Frontmatter { .. })
        ));
        assert!(matches!(
            WindsurfBridge.deserialize_agent_rule("x", "---\ndescription: d\n---\nBody\n"),
            Err(PresyncError::Frontmatter { .. })
        ));
    }

    #[test]
    fn test_prompt_without_description_is_plain() {
        let prompt = WindsurfPrompt {
            uri: Uri::from_slug(ItemType::Prompts, "deploy"),
            content: "Deploy it\n\n".into(),
            description: String::new(),
        };
        assert_eq!(
            WindsurfBridge.serialize_agent_prompt(&prompt).unwrap(),
            "Deploy it\n"
        );
    }

    #[test]
    fn test_quoted_descriptions_round_trip() {
        for description in ["\"Fast\" mode rules", "'tis the season", "| piped", "Style: strict"] {
            let agent_rule = WindsurfBridge
                .to_agent_rule(&rule(AttachType::AgentRequested, description, &[]))
                .unwrap();
            let text = WindsurfBridge.serialize_agent_rule(&agent_rule).unwrap();
            let back = WindsurfBridge.deserialize_agent_rule("x", &text).unwrap();
            assert_eq!(back.description, description, "{text}");

            let prompt = WindsurfPrompt {
                uri: Uri::from_slug(ItemType::Prompts, "deploy"),
                content: "Deploy it\n".into(),
                description: description.into(),
            };
            let text = WindsurfBridge.serialize_agent_prompt(&prompt).unwrap();
            let back = WindsurfBridge.deserialize_agent_prompt("deploy", &text).unwrap();
            assert_eq!(back.description, description, "{text}");
        }
    }
}
