//! Filesystem helpers shared by the store and the snapshot manager.

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Write `content` to `path` through a sibling temp file and a rename, so
/// readers see either the old file or the complete new one.
pub fn atomic_write(path: &Path, content: &[u8], sync: bool) -> StoreResult<()> {
    let parent = path
        .parent()
        .ok_or_else(|| StoreError::OutsideRepository(path.to_path_buf()))?;

    let mut tmp = tempfile::Builder::new()
        .prefix(".tmp-")
        .tempfile_in(parent)
        .map_err(StoreError::io(parent))?;
    tmp.write_all(content).map_err(StoreError::io(tmp.path()))?;
    if sync {
        tmp.as_file().sync_all().map_err(StoreError::io(path))?;
    }
    tmp.persist(path)
        .map_err(|e| StoreError::io(path)(e.error))?;
    Ok(())
}

/// Copy one file, creating missing parent directories of `to`.
pub fn copy_file(from: &Path, to: &Path) -> StoreResult<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(StoreError::io(parent))?;
    }
    fs::copy(from, to).map_err(StoreError::io(from))?;
    debug!(from = %from.display(), to = %to.display(), "copied");
    Ok(())
}

/// Remove a file. Returns `false` if it was already gone, including when an
/// ancestor of `path` is a regular file.
pub fn remove_file_if_exists(path: &Path) -> StoreResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(_) if shadowed_by_file(path) => Ok(false),
        Err(e) => Err(StoreError::io(path)(e)),
    }
}

fn shadowed_by_file(path: &Path) -> bool {
    path.ancestors().skip(1).any(Path::is_file)
}
