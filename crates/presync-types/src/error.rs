//! Error taxonomy shared by the loader, bridges and writers

use crate::uri::UriError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, converting or writing presets
#[derive(Debug, Error)]
pub enum PresyncError {
    /// Package referenced but absent from the workspace imports
    #[error("package '{package}' is not imported by the workspace")]
    NotImported { package: String },

    /// Included preset missing from the manifest exports; callers log and
    /// skip it
    #[error("preset '{preset}' is not exported by package '{package}'")]
    NotExported { package: String, preset: String },

    /// Manifest file present but unreadable or malformed
    #[error("invalid manifest {path}: {reason}")]
    Manifest { path: PathBuf, reason: String },

    /// Missing or malformed frontmatter
    #[error("invalid frontmatter in {path}: {reason}")]
    Frontmatter { path: PathBuf, reason: String },

    /// Attach type or trigger an agent does not support
    #[error("{agent}: unsupported attach type '{value}'")]
    UnsupportedAttach { agent: String, value: String },

    /// Glob pattern that cannot be compiled
    #[error("invalid glob pattern '{pattern}': {reason}")]
    Glob { pattern: String, reason: String },

    /// Failure while evaluating one export pattern
    #[error("pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: Box<PresyncError>,
    },

    #[error(transparent)]
    Uri(#[from] UriError),

    /// Package content could not be fetched into the cache
    #[error("failed to fetch package '{package}': {reason}")]
    Fetch { package: String, reason: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PresyncError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PresyncError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn frontmatter(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        PresyncError::Frontmatter {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Attach the export pattern that produced this error
    pub fn in_pattern(self, pattern: impl Into<String>) -> Self {
        PresyncError::Pattern {
            pattern: pattern.into(),
            source: Box::new(self),
        }
    }
}

/// Convenient Result type alias
pub type Result<T> = std::result::Result<T, PresyncError>;
