//! Presync Loader
//!
//! Resolves the presets a workspace imports from a package and builds the
//! canonical model from the package's cached files.
//!
//! ## Resolution
//!
//! 1. Manifest: `preset.{toml,yaml,yml,json}` at the package root, or an
//!    implicit manifest exporting `default` from `rules/**/*.md` and
//!    `prompts/**/*.md`
//! 2. Presets: every export pattern of every included preset is walked
//!    concurrently; each matching markdown file must carry frontmatter
//!
//! A package either loads completely or fails with the first error.

#![deny(unsafe_code, dead_code, unused_imports, unused_variables, missing_docs)]

pub mod loader;
pub mod manifest;
pub mod pattern;

pub use loader::PackageLoader;
pub use manifest::{ConfigManifestSource, ManifestSource, MANIFEST_FILE_STEM};
pub use pattern::GlobPattern;
