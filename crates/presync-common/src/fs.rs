//! Filesystem helpers

use presync_types::{PresyncError, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Mode given to files written by [`write_atomic`]
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

/// Create `dir` and all of its parents
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| PresyncError::io(dir, e))
}

/// `true` if `path` exists and is a directory
pub fn is_dir_exists(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

/// Write `contents` to `path` through a temporary file in the same
/// directory, then rename it over the target.
///
/// The target is either untouched or fully replaced; readers never see a
/// partial file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| PresyncError::io(parent, e))?;
    debug!("Writing to temp file: {:?}", temp.path());

    temp.write_all(contents)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|e| PresyncError::io(temp.path(), e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(temp.path(), fs::Permissions::from_mode(FILE_MODE))
            .map_err(|e| PresyncError::io(temp.path(), e))?;
    }

    temp.persist(path)
        .map_err(|e| PresyncError::io(path, e.error))?;
    Ok(())
}

/// Recursively remove `dir`; a directory that is already gone is not an
/// error.
pub fn remove_dir_all_if_exists(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PresyncError::io(dir, e)),
    }
}
