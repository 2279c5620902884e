//! Bringing imported packages into the local cache

use presync_common::{ensure_dir, remove_dir_all_if_exists};
use presync_types::{ImportDetails, PresyncError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Revision checked out when a git import does not name one
const DEFAULT_REVISION: &str = "origin/HEAD";

/// Copies or checks out an import's content into `destination`.
///
/// Called from the blocking pool, once per import.
pub trait ContentFetcher: Send + Sync {
    /// Make `destination` hold the current content of `source`
    fn fetch(&self, package: &str, source: &ImportDetails, destination: &Path) -> Result<()>;
}

/// Fetcher for local directories and git repositories
#[derive(Debug, Clone)]
pub struct DefaultFetcher {
    base_dir: PathBuf,
}

impl DefaultFetcher {
    /// Relative local paths are resolved against `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn copy_local(&self, package: &str, path: &Path, destination: &Path) -> Result<()> {
        let source = self.base_dir.join(path);
        if !source.is_dir() {
            return Err(PresyncError::Fetch {
                package: package.to_string(),
                reason: format!("{} is not a directory", source.display()),
            });
        }

        debug!("Copying {:?} to {:?}", source, destination);
        remove_dir_all_if_exists(destination)?;
        ensure_dir(destination)?;

        let walker = WalkDir::new(&source)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.file_name() != ".git");
        for entry in walker {
            let entry = entry.map_err(|e| {
                let at = e.path().unwrap_or(&source).to_path_buf();
                PresyncError::io(at, std::io::Error::from(e))
            })?;
            let Ok(relative) = entry.path().strip_prefix(&source) else {
                continue;
            };
            let target = destination.join(relative);

            if entry.file_type().is_dir() {
                ensure_dir(&target)?;
            } else if entry.file_type().is_file() {
                fs::copy(entry.path(), &target).map_err(|e| PresyncError::io(&target, e))?;
            }
        }
        Ok(())
    }

    fn checkout_git(
        &self,
        package: &str,
        repository: &str,
        revision: Option<&str>,
        destination: &Path,
    ) -> Result<()> {
        if destination.join(".git").is_dir() {
            debug!("Updating checkout of {} in {:?}", repository, destination);
            git(package, Some(destination), &["fetch", "--tags", "--force", "origin"])?;
        } else {
            debug!("Cloning {} into {:?}", repository, destination);
            remove_dir_all_if_exists(destination)?;
            if let Some(parent) = destination.parent() {
                ensure_dir(parent)?;
            }
            let target = destination.to_string_lossy();
            git(package, None, &["clone", "--quiet", repository, target.as_ref()])?;
        }

        let revision = revision.unwrap_or(DEFAULT_REVISION);
        git(
            package,
            Some(destination),
            &["checkout", "--quiet", "--force", "--detach", revision],
        )
    }
}

impl ContentFetcher for DefaultFetcher {
    fn fetch(&self, package: &str, source: &ImportDetails, destination: &Path) -> Result<()> {
        match source {
            ImportDetails::Local { path } => self.copy_local(package, path, destination)?,
            ImportDetails::Git {
                repository,
                revision,
                ..
            } => self.checkout_git(package, repository, revision.as_deref(), destination)?,
        }
        info!("Fetched package '{}'", package);
        Ok(())
    }
}

/// Run `git` and turn a failure into [`PresyncError::Fetch`] carrying stderr
fn git(package: &str, dir: Option<&Path>, args: &[&str]) -> Result<()> {
    let mut command = Command::new("git");
    if let Some(dir) = dir {
        command.arg("-C").arg(dir);
    }
    let output = command.args(args).output().map_err(|e| PresyncError::Fetch {
        package: package.to_string(),
        reason: format!("failed to run git: {e}"),
    })?;

    if output.status.success() {
        return Ok(());
    }
    Err(PresyncError::Fetch {
        package: package.to_string(),
        reason: format!(
            "git {} exited with {}: {}",
            args.first().copied().unwrap_or_default(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ),
    })
}
