//! Cursor bridge
//!
//! Rules live in `.cursor/rules/*.mdc` and carry a restricted frontmatter
//! dialect that Cursor parses line by line rather than as YAML:
//!
//! ```text
//! ---
//! description: 'Use tabs '
//! globs: *.go
//! alwaysApply: false
//! ---
//! ```
//!
//! Empty values are bare keys, descriptions are single-quoted with a
//! trailing space and globs are never quoted. Prompts are plain markdown.

use crate::frontmatter::{self, normalize_content, raw_value, single_line};
use crate::Bridge;
use presync_types::{
    AttachType, ItemType, PresyncError, PromptItem, PromptMetadata, Result, RuleItem,
    RuleMetadata, Uri,
};
use serde::Deserialize;
use std::path::Path;

/// A Cursor rule file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorRule {
    /// Address of the canonical item
    pub uri: Uri,
    /// Markdown body
    pub content: String,
    /// Shown to the agent when deciding whether to request the rule
    pub description: String,
    /// Comma-separated file globs
    pub globs: String,
    /// Attach the rule to every request
    pub always_apply: bool,
}

/// A Cursor prompt file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorPrompt {
    /// Address of the canonical item
    pub uri: Uri,
    /// Markdown body
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
struct CursorFrontmatter {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    globs: Option<String>,
    #[serde(default, rename = "alwaysApply")]
    always_apply: bool,
}

/// Converter for the Cursor formats
#[derive(Debug, Clone, Copy, Default)]
pub struct CursorBridge;

impl Bridge for CursorBridge {
    type Rule = CursorRule;
    type Prompt = CursorPrompt;

    const NAME: &'static str = "cursor";

    fn to_agent_rule(&self, rule: &RuleItem) -> Result<CursorRule> {
        let metadata = rule.metadata();
        let mut agent_rule = CursorRule {
            uri: rule.uri().clone(),
            content: rule.content().to_string(),
            description: String::new(),
            globs: String::new(),
            always_apply: false,
        };

        match &metadata.attach {
            AttachType::Always => {
                agent_rule.always_apply = true;
                agent_rule.description = metadata.description.clone();
            }
            AttachType::Glob => {
                agent_rule.globs = metadata.globs.join(",");
                agent_rule.description = metadata.description.clone();
            }
            AttachType::AgentRequested => {
                agent_rule.description = metadata.description.clone();
            }
            AttachType::Manual => {}
            AttachType::Unrecognized(value) => {
                return Err(PresyncError::UnsupportedAttach {
                    agent: Self::NAME.to_string(),
                    value: value.clone(),
                });
            }
        }

        Ok(agent_rule)
    }

    fn from_agent_rule(&self, rule: &CursorRule) -> Result<RuleItem> {
        let globs: Vec<String> = rule
            .globs
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(String::from)
            .collect();

        let attach = if rule.always_apply {
            AttachType::Always
        } else if !globs.is_empty() {
            AttachType::Glob
        } else if !rule.description.is_empty() {
            AttachType::AgentRequested
        } else {
            AttachType::Manual
        };

        let metadata = RuleMetadata {
            description: rule.description.clone(),
            attach,
            globs,
        };
        Ok(RuleItem::restore(rule.uri.clone(), rule.content.clone(), metadata))
    }

    fn serialize_agent_rule(&self, rule: &CursorRule) -> Result<String> {
        let description = if rule.description.is_empty() {
            "description:".to_string()
        } else {
            format!(
                "description: '{} '",
                single_line(&rule.description).replace('\'', "''")
            )
        };
        let globs = if rule.globs.is_empty() {
            "globs:".to_string()
        } else {
            format!("globs: {}", raw_value(&rule.globs))
        };

        Ok(format!(
            "---\n{description}\n{globs}\nalwaysApply: {}\n---\n{}",
            rule.always_apply,
            normalize_content(&rule.content)
        ))
    }

    fn deserialize_agent_rule(&self, slug: &str, text: &str) -> Result<CursorRule> {
        let document = frontmatter::split(text)?;
        let parsed: CursorFrontmatter = match document.frontmatter {
            Some(yaml) => frontmatter::parse(&frontmatter::requote(yaml, &["globs"]), Path::new(slug))?,
            None => CursorFrontmatter::default(),
        };

        let description = parsed.description.unwrap_or_default();
        let description = description
            .strip_suffix(' ')
            .map_or(description.clone(), String::from);

        Ok(CursorRule {
            uri: Uri::from_slug(ItemType::Rules, slug),
            content: document.body.to_string(),
            description,
            globs: parsed.globs.unwrap_or_default(),
            always_apply: parsed.always_apply,
        })
    }

    fn to_agent_prompt(&self, prompt: &PromptItem) -> Result<CursorPrompt> {
        Ok(CursorPrompt {
            uri: prompt.uri().clone(),
            content: prompt.content().to_string(),
        })
    }

    fn from_agent_prompt(&self, prompt: &CursorPrompt) -> Result<PromptItem> {
        Ok(PromptItem::restore(
            prompt.uri.clone(),
            prompt.content.clone(),
            PromptMetadata::default(),
        ))
    }

    fn serialize_agent_prompt(&self, prompt: &CursorPrompt) -> Result<String> {
        Ok(normalize_content(&prompt.content))
    }

    fn deserialize_agent_prompt(&self, slug: &str, text: &str) -> Result<CursorPrompt> {
        Ok(CursorPrompt {
            uri: Uri::from_slug(ItemType::Prompts, slug),
            content: text.to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn rule(attach: AttachType, description: &str, globs: &[&str]) -> RuleItem {
        RuleItem::restore(
            Uri::from_slug(ItemType::Rules, "style"),
            "Body text\n",
            RuleMetadata {
                description: description.into(),
                attach,
                globs: globs.iter().map(|g| g.to_string()).collect(),
            },
        )
    }

    #[test]
    fn test_attach_mapping() {
        let bridge = CursorBridge;

        let always = bridge.to_agent_rule(&rule(AttachType::Always, "", &[])).unwrap();
        assert!(always.always_apply);
        assert!(always.globs.is_empty());

        let glob = bridge
            .to_agent_rule(&rule(AttachType::Glob, "", &["*.ts", "*.tsx"]))
            .unwrap();
        assert_eq!(glob.globs, "*.ts,*.tsx");
        assert!(!glob.always_apply);

        let requested = bridge
            .to_agent_rule(&rule(AttachType::AgentRequested, "When testing", &[]))
            .unwrap();
        assert_eq!(requested.description, "When testing");

        let manual = bridge
            .to_agent_rule(&rule(AttachType::Manual, "dropped", &[]))
            .unwrap();
        assert!(manual.description.is_empty());
        assert!(manual.globs.is_empty());
        assert!(!manual.always_apply);
    }

    #[test]
    fn test_unrecognized_attach_is_an_error() {
        let err = CursorBridge
            .to_agent_rule(&rule(AttachType::Unrecognized("sometimes".into()), "", &[]))
            .unwrap_err();
        match err {
            PresyncError::UnsupportedAttach { agent, value } => {
                assert_eq!(agent, "cursor");
                assert_eq!(value, "sometimes");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_serialize_empty_values_as_bare_keys() {
        let agent_rule = CursorRule {
            uri: Uri::from_slug(ItemType::Rules, "x"),
            content: "Body".into(),
            description: String::new(),
            globs: String::new(),
            always_apply: true,
        };
        assert_eq!(
            CursorBridge.serialize_agent_rule(&agent_rule).unwrap(),
            "---\ndescription:\nglobs:\nalwaysApply: true\n---\nBody\n"
        );
    }

    #[test]
    fn test_serialize_quoting() {
        let agent_rule = CursorRule {
            uri: Uri::from_slug(ItemType::Rules, "x"),
            content: "Body\n\n\n".into(),
            description: "Line one\nit's two".into(),
            globs: "*.ts,src/**/*.{ts,tsx}".into(),
            always_apply: false,
        };
        let text = CursorBridge.serialize_agent_rule(&agent_rule).unwrap();
        assert!(text.contains("\ndescription: 'Line one it''s two '\n"));
        assert!(text.contains("\nglobs: *.ts,src/**/*.{ts,tsx}\n"));
        assert!(text.ends_with("---\nBody\n"));
    }

    #[test]
    fn test_serialize_empty_body() {
        let agent_rule = CursorRule {
            uri: Uri::from_slug(ItemType::Rules, "x"),
            content: String::new(),
            description: String::new(),
            globs: String::new(),
            always_apply: false,
        };
        assert!(CursorBridge
            .serialize_agent_rule(&agent_rule)
            .unwrap()
            .ends_with("alwaysApply: false\n---\n"));
    }

    #[test]
    fn test_deserialize_strips_quote_padding() {
        let text = "---\ndescription: 'When testing '\nglobs: *.go\nalwaysApply: false\n---\nBody\n";
        let agent_rule = CursorBridge.deserialize_agent_rule("go/test", text).unwrap();
        assert_eq!(agent_rule.description, "When testing");
        assert_eq!(agent_rule.globs, "*.go");
        assert_eq!(agent_rule.content, "Body\n");
        assert_eq!(agent_rule.uri.path, "go/test");
    }

    #[test]
    fn test_deserialize_without_frontmatter_is_manual() {
        let agent_rule = CursorBridge.deserialize_agent_rule("x", "Just body\n").unwrap();
        let item = CursorBridge.from_agent_rule(&agent_rule).unwrap();
        assert_eq!(item.metadata().attach, AttachType::Manual);
        assert_eq!(item.content(), "Just body\n");
    }

    #[test]
    fn test_prompt_is_plain_markdown() {
        let prompt = PromptItem::restore(
            Uri::from_slug(ItemType::Prompts, "review"),
            "Review this\n\n",
            PromptMetadata {
                description: "Review".into(),
            },
        );
        let agent_prompt = CursorBridge.to_agent_prompt(&prompt).unwrap();
        assert_eq!(
            CursorBridge.serialize_agent_prompt(&agent_prompt).unwrap(),
            "Review this\n"
        );
    }
}
