//! Registry of supported agents
//!
//! [`Agent`] selects one of the concrete bridges by name and exposes the
//! agent's on-disk layout, so writers can stay agent-agnostic.

use crate::{Bridge, CopilotBridge, CursorBridge, WindsurfBridge};
use presync_types::{PromptItem, Result, RuleItem};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Where an agent keeps its rules and prompts, relative to the workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Directory holding rule files
    pub rules_dir: &'static str,
    /// Extension of rule files, including the leading dot
    pub rule_extension: &'static str,
    /// Directory holding prompt files
    pub prompts_dir: &'static str,
    /// Extension of prompt files, including the leading dot
    pub prompt_extension: &'static str,
}

/// A supported coding agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Agent {
    /// Cursor
    Cursor,
    /// GitHub Copilot
    Github,
    /// Windsurf
    Windsurf,
}

impl Agent {
    /// Every supported agent
    pub const ALL: [Agent; 3] = [Agent::Cursor, Agent::Github, Agent::Windsurf];

    /// Registry key of the agent
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Agent::Cursor => CursorBridge::NAME,
            Agent::Github => CopilotBridge::NAME,
            Agent::Windsurf => WindsurfBridge::NAME,
        }
    }

    /// On-disk layout of the agent
    #[must_use]
    pub fn layout(&self) -> Layout {
        match self {
            Agent::Cursor => Layout {
                rules_dir: ".cursor/rules",
                rule_extension: ".mdc",
                prompts_dir: ".cursor/prompts",
                prompt_extension: ".md",
            },
            Agent::Github => Layout {
                rules_dir: ".github/instructions",
                rule_extension: ".instructions.md",
                prompts_dir: ".github/prompts",
                prompt_extension: ".prompt.md",
            },
            Agent::Windsurf => Layout {
                rules_dir: ".windsurf/rules",
                rule_extension: ".md",
                prompts_dir: ".windsurf/prompts",
                prompt_extension: ".md",
            },
        }
    }

    /// Render a canonical rule as the agent's file content
    pub fn render_rule(&self, rule: &RuleItem) -> Result<String> {
        match self {
            Agent::Cursor => render_rule_with(&CursorBridge, rule),
            Agent::Github => render_rule_with(&CopilotBridge, rule),
            Agent::Windsurf => render_rule_with(&WindsurfBridge, rule),
        }
    }

    /// Parse an agent rule file back into a canonical rule
    pub fn parse_rule(&self, slug: &str, text: &str) -> Result<RuleItem> {
        match self {
            Agent::Cursor => parse_rule_with(&CursorBridge, slug, text),
            Agent::Github => parse_rule_with(&CopilotBridge, slug, text),
            Agent::Windsurf => parse_rule_with(&WindsurfBridge, slug, text),
        }
    }

    /// Render a canonical prompt as the agent's file content
    pub fn render_prompt(&self, prompt: &PromptItem) -> Result<String> {
        match self {
            Agent::Cursor => render_prompt_with(&CursorBridge, prompt),
            Agent::Github => render_prompt_with(&CopilotBridge, prompt),
            Agent::Windsurf => render_prompt_with(&WindsurfBridge, prompt),
        }
    }

    /// Parse an agent prompt file back into a canonical prompt
    pub fn parse_prompt(&self, slug: &str, text: &str) -> Result<PromptItem> {
        match self {
            Agent::Cursor => parse_prompt_with(&CursorBridge, slug, text),
            Agent::Github => parse_prompt_with(&CopilotBridge, slug, text),
            Agent::Windsurf => parse_prompt_with(&WindsurfBridge, slug, text),
        }
    }
}

fn render_rule_with<B: Bridge>(bridge: &B, rule: &RuleItem) -> Result<String> {
    bridge.serialize_agent_rule(&bridge.to_agent_rule(rule)?)
}

fn parse_rule_with<B: Bridge>(bridge: &B, slug: &str, text: &str) -> Result<RuleItem> {
    bridge.from_agent_rule(&bridge.deserialize_agent_rule(slug, text)?)
}

fn render_prompt_with<B: Bridge>(bridge: &B, prompt: &PromptItem) -> Result<String> {
    bridge.serialize_agent_prompt(&bridge.to_agent_prompt(prompt)?)
}

fn parse_prompt_with<B: Bridge>(bridge: &B, slug: &str, text: &str) -> Result<PromptItem> {
    bridge.from_agent_prompt(&bridge.deserialize_agent_prompt(slug, text)?)
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Agent {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cursor" => Ok(Agent::Cursor),
            "github" | "copilot" | "github-copilot" => Ok(Agent::Github),
            "windsurf" => Ok(Agent::Windsurf),
            other => Err(format!("unknown agent '{other}'")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_names_round_trip() {
        for agent in Agent::ALL {
            assert_eq!(agent.name().parse::<Agent>().unwrap(), agent);
        }
        assert_eq!("Copilot".parse::<Agent>().unwrap(), Agent::Github);
        assert!("emacs".parse::<Agent>().is_err());
    }

    #[test]
    fn test_layouts() {
        let cursor = Agent::Cursor.layout();
        assert_eq!(cursor.rules_dir, ".cursor/rules");
        assert_eq!(cursor.rule_extension, ".mdc");

        let github = Agent::Github.layout();
        assert_eq!(github.rule_extension, ".instructions.md");
        assert_eq!(github.prompt_extension, ".prompt.md");

        let windsurf = Agent::Windsurf.layout();
        assert_eq!(windsurf.prompts_dir, ".windsurf/prompts");
    }
}
