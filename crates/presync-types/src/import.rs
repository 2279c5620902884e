//! Where a workspace import comes from

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::manifest::DEFAULT_PRESET;

/// Source of an imported package
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ImportDetails {
    /// A directory on the local filesystem
    Local { path: PathBuf },
    /// A git repository checked out at `revision`, optionally rooted at a
    /// sub-directory
    Git {
        repository: String,
        #[serde(default)]
        revision: Option<String>,
        #[serde(default)]
        directory: Option<PathBuf>,
    },
}

impl ImportDetails {
    /// Package root inside a fetched checkout
    pub fn package_root(&self, checkout: &Path) -> PathBuf {
        match self {
            ImportDetails::Local { .. } => checkout.to_path_buf(),
            ImportDetails::Git { directory, .. } => match directory {
                Some(dir) => checkout.join(dir),
                None => checkout.to_path_buf(),
            },
        }
    }
}

fn default_include() -> Vec<String> {
    vec![DEFAULT_PRESET.to_string()]
}

/// A package imported by the workspace
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Import {
    pub source: ImportDetails,
    /// Preset names to take from the package
    #[serde(default = "default_include")]
    pub include: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_import() {
        let import: Import =
            serde_yaml::from_str("source:\n  type: local\n  path: ../p1\n").unwrap();
        assert_eq!(
            import.source,
            ImportDetails::Local {
                path: PathBuf::from("../p1")
            }
        );
        assert_eq!(import.include, vec!["default"]);
    }

    #[test]
    fn test_git_import_with_directory() {
        let yaml = "source:\n  type: git\n  repository: https://example.com/p.git\n  revision: v1\n  directory: presets\ninclude: [go, rust]\n";
        let import: Import = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(import.include, vec!["go", "rust"]);
        assert_eq!(
            import.source.package_root(Path::new("/cache/p")),
            PathBuf::from("/cache/p/presets")
        );
    }

    #[test]
    fn test_unknown_source_type_is_rejected() {
        let result: Result<Import, _> =
            serde_yaml::from_str("source:\n  type: svn\n  path: x\n");
        assert!(result.is_err());
    }
}
