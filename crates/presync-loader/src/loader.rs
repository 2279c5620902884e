//! Package loader

use crate::manifest::{self, ConfigManifestSource, ManifestSource};
use crate::pattern::GlobPattern;
use presync_bridge::frontmatter;
use presync_common::{ErrorPolicy, FanOut};
use presync_types::{
    path_from_base_dir, AgentPreset, AgentPresetPackage, AttachType, Import, ItemType,
    PresyncError, PromptItem, PromptMetadata, Result, RuleItem, RuleMetadata, Uri,
    DEFAULT_SCHEME,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Items produced by one export pattern
enum PatternItems {
    Rules(Vec<RuleItem>),
    Prompts(Vec<PromptItem>),
}

/// Loads [`AgentPresetPackage`]s from a package cache.
///
/// Each imported package is expected under `<cache_dir>/<package>`.
#[derive(Clone)]
pub struct PackageLoader {
    cache_dir: PathBuf,
    manifests: Arc<dyn ManifestSource>,
}

impl PackageLoader {
    /// Loader reading manifests with [`ConfigManifestSource`]
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self::with_manifest_source(cache_dir, Arc::new(ConfigManifestSource))
    }

    /// Loader reading manifests through a custom source
    pub fn with_manifest_source(
        cache_dir: impl Into<PathBuf>,
        manifests: Arc<dyn ManifestSource>,
    ) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            manifests,
        }
    }

    /// Directory packages are fetched into
    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Cache location of `package`'s checkout
    #[must_use]
    pub fn checkout_dir(&self, package: &str) -> PathBuf {
        self.cache_dir.join(package)
    }

    /// Load the presets the workspace includes from `package`.
    ///
    /// Fails with [`PresyncError::NotImported`] when `package` is not one of
    /// `imports`.
    pub async fn load(
        &self,
        imports: &BTreeMap<String, Import>,
        package: &str,
    ) -> Result<AgentPresetPackage> {
        let import = imports
            .get(package)
            .ok_or_else(|| PresyncError::NotImported {
                package: package.to_string(),
            })?;

        let root = import.source.package_root(&self.checkout_dir(package));
        self.load_from_root(package, &root, &import.include).await
    }

    /// Load `include`d presets of a package rooted at `root`.
    ///
    /// Item paths are computed relative to each pattern's base directory,
    /// which must not carry an extension. Patterns such as `**/*.md` use
    /// `root` itself as the base, so they fail with
    /// [`UriError::InvalidBase`](presync_types::UriError::InvalidBase) when
    /// the package root is named like `my.presets`.
    pub async fn load_from_root(
        &self,
        package: &str,
        root: &Path,
        include: &[String],
    ) -> Result<AgentPresetPackage> {
        let root = fs::canonicalize(root).map_err(|e| PresyncError::io(root, e))?;
        let manifest = manifest::resolve(self.manifests.as_ref(), &root, package)?;

        let mut presets: Vec<AgentPreset> = Vec::new();
        let mut fanout: FanOut<(usize, PatternItems), PresyncError> =
            FanOut::new(ErrorPolicy::RunToCompletion);

        for name in include {
            let Some(exports) = manifest.preset(name) else {
                let skipped = PresyncError::NotExported {
                    package: package.to_string(),
                    preset: name.clone(),
                };
                warn!("Skipping preset: {}", skipped);
                continue;
            };
            if presets.iter().any(|p| &p.name == name) {
                continue;
            }

            let index = presets.len();
            presets.push(AgentPreset::new(name.as_str()));

            let kinds = exports
                .rules
                .iter()
                .map(|p| (ItemType::Rules, p))
                .chain(exports.prompts.iter().map(|p| (ItemType::Prompts, p)));

            for (item_type, pattern) in kinds {
                let task = PatternTask {
                    root: root.clone(),
                    package: package.to_string(),
                    preset: name.clone(),
                    pattern: pattern.clone(),
                };
                fanout.spawn_blocking(move || {
                    let pattern = task.pattern.clone();
                    task.run(item_type)
                        .map(|items| (index, items))
                        .map_err(|e| match e {
                            PresyncError::Glob { .. } => e,
                            other => other.in_pattern(pattern),
                        })
                });
            }
        }

        debug!(
            "Evaluating {} pattern(s) for package '{}'",
            fanout.len(),
            package
        );

        for (index, items) in fanout.join().await? {
            let preset = &mut presets[index];
            match items {
                PatternItems::Rules(rules) => {
                    for rule in rules {
                        if !preset.rules.iter().any(|r| r.uri().path == rule.uri().path) {
                            preset.rules.push(rule);
                        }
                    }
                }
                PatternItems::Prompts(prompts) => {
                    for prompt in prompts {
                        if !preset
                            .prompts
                            .iter()
                            .any(|p| p.uri().path == prompt.uri().path)
                        {
                            preset.prompts.push(prompt);
                        }
                    }
                }
            }
        }

        let package = AgentPresetPackage {
            package_name: package.to_string(),
            presets,
        };
        info!(
            "Loaded package '{}': {} preset(s), {} item(s)",
            package.package_name,
            package.presets.len(),
            package.item_count()
        );
        Ok(package)
    }
}

/// Everything one blocking pattern evaluation needs, owned
struct PatternTask {
    root: PathBuf,
    package: String,
    preset: String,
    pattern: String,
}

impl PatternTask {
    fn run(&self, item_type: ItemType) -> Result<PatternItems> {
        let glob = GlobPattern::parse(&self.pattern)?;
        let base_dir = self.root.join(glob.base());
        let files = glob.walk(&self.root)?;

        match item_type {
            ItemType::Rules => files
                .iter()
                .map(|file| self.read_rule(&base_dir, file))
                .collect::<Result<Vec<_>>>()
                .map(PatternItems::Rules),
            ItemType::Prompts => files
                .iter()
                .map(|file| self.read_prompt(&base_dir, file))
                .collect::<Result<Vec<_>>>()
                .map(PatternItems::Prompts),
        }
    }

    fn uri(&self, item_type: ItemType, base_dir: &Path, file: &Path) -> Result<Uri> {
        let path = path_from_base_dir(base_dir, file)?;
        Ok(Uri::new(
            DEFAULT_SCHEME,
            self.package.as_str(),
            self.preset.as_str(),
            item_type,
            path,
        ))
    }

    fn read_rule(&self, base_dir: &Path, file: &Path) -> Result<RuleItem> {
        debug!("Reading rule {:?}", file);
        let text = fs::read_to_string(file).map_err(|e| PresyncError::io(file, e))?;
        let (metadata, body): (RuleMetadata, String) = frontmatter::parse_required(&text, file)?;

        if metadata.attach == AttachType::Glob && metadata.globs.is_empty() {
            return Err(PresyncError::frontmatter(
                file,
                "attach: glob requires at least one glob",
            ));
        }

        let uri = self.uri(ItemType::Rules, base_dir, file)?;
        Ok(RuleItem::new(uri, body, metadata))
    }

    fn read_prompt(&self, base_dir: &Path, file: &Path) -> Result<PromptItem> {
        debug!("Reading prompt {:?}", file);
        let text = fs::read_to_string(file).map_err(|e| PresyncError::io(file, e))?;
        let (metadata, body): (PromptMetadata, String) =
            frontmatter::parse_required(&text, file)?;

        let uri = self.uri(ItemType::Prompts, base_dir, file)?;
        Ok(PromptItem::new(uri, body, metadata))
    }
}
