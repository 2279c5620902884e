use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Scheme used for items built from a package cache
pub const DEFAULT_SCHEME: &str = "presync";

/// Which half of a preset an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Rules,
    Prompts,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Rules => "rules",
            ItemType::Prompts => "prompts",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical, extension-free address of a preset item.
///
/// `path` always uses forward slashes. The canonical string and the
/// filesystem-relative path are derived on demand and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Uri {
    pub scheme: String,
    pub package: String,
    pub preset: String,
    pub item_type: ItemType,
    pub path: String,
}

impl Uri {
    pub fn new(
        scheme: impl Into<String>,
        package: impl Into<String>,
        preset: impl Into<String>,
        item_type: ItemType,
        path: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            package: package.into(),
            preset: preset.into(),
            item_type,
            path: path.into().replace('\\', "/"),
        }
    }

    /// Address an item known only by its slug, e.g. one read back from an
    /// agent directory.
    pub fn from_slug(item_type: ItemType, slug: impl Into<String>) -> Self {
        Self::new("", "", "", item_type, slug)
    }

    /// `package/preset/path` followed by `extension`
    pub fn internal_path(&self, extension: &str) -> String {
        format!(
            "{}/{}/{}{}",
            self.package, self.preset, self.path, extension
        )
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}/{}/{}/{}",
            self.scheme, self.package, self.preset, self.item_type, self.path
        )
    }
}

/// Failures computing a URI path from filesystem locations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UriError {
    #[error("base must be an absolute directory path without extension: {0}")]
    InvalidBase(PathBuf),

    #[error("target must be an absolute file path with an extension: {0}")]
    InvalidTarget(PathBuf),

    #[error("target {target} is outside base directory {base}")]
    OutsideBase { base: PathBuf, target: PathBuf },
}

/// Compute the `path` component of a URI for `target` under `base`.
///
/// The result is relative to `base`, has its extension stripped and uses
/// forward slashes.
pub fn path_from_base_dir(base: &Path, target: &Path) -> Result<String, UriError> {
    if !base.is_absolute() || base.extension().is_some() {
        return Err(UriError::InvalidBase(base.to_path_buf()));
    }
    if !target.is_absolute() || target.extension().is_none() {
        return Err(UriError::InvalidTarget(target.to_path_buf()));
    }

    let base = lexical_clean(base);
    let target = lexical_clean(target);

    let relative = target
        .strip_prefix(&base)
        .map_err(|_| UriError::OutsideBase {
            base: base.clone(),
            target: target.clone(),
        })?;

    let segments: Vec<String> = relative
        .with_extension("")
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if segments.is_empty() {
        return Err(UriError::InvalidTarget(target));
    }

    Ok(segments.join("/"))
}

/// Resolve `.` and `..` without touching the filesystem
fn lexical_clean(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}
