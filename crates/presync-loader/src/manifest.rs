//! Manifest lookup

use presync_types::{Manifest, PresyncError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name, without extension, of a package manifest
pub const MANIFEST_FILE_STEM: &str = "preset";

/// Extensions tried, in order, when looking for a manifest
const MANIFEST_EXTENSIONS: [&str; 4] = ["toml", "yaml", "yml", "json"];

/// Reads a package manifest from a package root
pub trait ManifestSource: Send + Sync {
    /// Load the manifest stored under `root`.
    ///
    /// Returns `Ok(None)` when the package has no manifest file; a manifest
    /// that exists but cannot be parsed is an error.
    fn load(&self, root: &Path) -> Result<Option<Manifest>>;
}

/// [`ManifestSource`] backed by the `config` crate, accepting TOML, YAML
/// and JSON manifests
#[derive(Debug, Clone, Default)]
pub struct ConfigManifestSource;

impl ConfigManifestSource {
    fn find(root: &Path) -> Option<PathBuf> {
        MANIFEST_EXTENSIONS
            .iter()
            .map(|ext| root.join(format!("{MANIFEST_FILE_STEM}.{ext}")))
            .find(|path| path.is_file())
    }
}

impl ManifestSource for ConfigManifestSource {
    fn load(&self, root: &Path) -> Result<Option<Manifest>> {
        let Some(path) = Self::find(root) else {
            debug!("No manifest under {:?}", root);
            return Ok(None);
        };

        debug!("Loading manifest {:?}", path);
        let manifest = config::Config::builder()
            .add_source(config::File::from(path.clone()))
            .build()
            .and_then(|c| c.try_deserialize::<Manifest>())
            .map_err(|e| PresyncError::Manifest {
                path,
                reason: e.to_string(),
            })?;

        Ok(Some(manifest))
    }
}

/// Load the manifest for `package`, falling back to the implicit one
pub fn resolve(source: &dyn ManifestSource, root: &Path, package: &str) -> Result<Manifest> {
    let mut manifest = source
        .load(root)?
        .unwrap_or_else(|| Manifest::implicit(package));
    if manifest.name.is_empty() {
        manifest.name = package.to_string();
    }
    Ok(manifest)
}
