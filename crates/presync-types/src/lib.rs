//! Presync Types - canonical preset model shared by every presync crate
//!
//! Items are addressed by a [`Uri`], carry markdown content plus typed
//! metadata, and are grouped into [`AgentPreset`]s and
//! [`AgentPresetPackage`]s.

pub mod error;
pub mod import;
pub mod item;
pub mod manifest;
pub mod uri;

pub use error::{PresyncError, Result};
pub use import::{Import, ImportDetails};
pub use item::{
    AgentPreset, AgentPresetPackage, AttachType, PromptItem, PromptMetadata, RuleItem,
    RuleMetadata,
};
pub use manifest::{Manifest, PresetExports, DEFAULT_PRESET};
pub use uri::{path_from_base_dir, ItemType, Uri, UriError, DEFAULT_SCHEME};
