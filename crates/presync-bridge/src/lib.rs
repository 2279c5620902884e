//! Presync Bridges
//!
//! One bridge per supported coding agent, each converting canonical
//! [`RuleItem`]s and [`PromptItem`]s to and from the agent's native file
//! shape, and that shape to and from text.
//!
//! ## Agents
//!
//! - [`cursor`]: `.cursor/rules/*.mdc` with a restricted frontmatter dialect
//! - [`github`]: GitHub Copilot `.instructions.md` / `.prompt.md`
//! - [`windsurf`]: `.windsurf/rules` with a `trigger` field
//!
//! Callers that do not care about the agent-specific shapes go through
//! [`Agent`], which dispatches to the right bridge.

#![deny(unsafe_code, dead_code, unused_imports, unused_variables, missing_docs)]

pub mod agent;
pub mod cursor;
pub mod frontmatter;
pub mod github;
pub mod windsurf;

use presync_types::{PromptItem, Result, RuleItem};

pub use agent::{Agent, Layout};
pub use cursor::CursorBridge;
pub use github::CopilotBridge;
pub use windsurf::WindsurfBridge;

/// Conversion between canonical items and one agent's native shapes
pub trait Bridge {
    /// Agent-specific rule shape
    type Rule;
    /// Agent-specific prompt shape
    type Prompt;

    /// Agent name used in error messages
    const NAME: &'static str;

    /// Map a canonical rule onto the agent's fields
    fn to_agent_rule(&self, rule: &RuleItem) -> Result<Self::Rule>;
    /// Rebuild a canonical rule from the agent's fields
    fn from_agent_rule(&self, rule: &Self::Rule) -> Result<RuleItem>;
    /// Render a rule file
    fn serialize_agent_rule(&self, rule: &Self::Rule) -> Result<String>;
    /// Parse a rule file; `slug` becomes the item's URI path
    fn deserialize_agent_rule(&self, slug: &str, text: &str) -> Result<Self::Rule>;

    /// Map a canonical prompt onto the agent's fields
    fn to_agent_prompt(&self, prompt: &PromptItem) -> Result<Self::Prompt>;
    /// Rebuild a canonical prompt from the agent's fields
    fn from_agent_prompt(&self, prompt: &Self::Prompt) -> Result<PromptItem>;
    /// Render a prompt file
    fn serialize_agent_prompt(&self, prompt: &Self::Prompt) -> Result<String>;
    /// Parse a prompt file; `slug` becomes the item's URI path
    fn deserialize_agent_prompt(&self, slug: &str, text: &str) -> Result<Self::Prompt>;
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{Agent, Bridge, CopilotBridge, CursorBridge, WindsurfBridge};
}
