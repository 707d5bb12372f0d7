// ABOUTME: Atomic file replacement: write a sibling temp file, fsync it, then rename over the target.
// ABOUTME: A failed write leaves the previous file contents in place.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Returns the sibling temp path used while replacing `path` (`dir/.name.tmp`).
pub fn temp_path(path: &Path) -> Result<PathBuf, StoreError> {
    let file_name = path.file_name().ok_or_else(|| {
        StoreError::invalid(path, "path has no file name")
    })?;
    let tmp_name = format!(".{}.tmp", file_name.to_string_lossy());
    Ok(match path.parent() {
        Some(parent) => parent.join(tmp_name),
        None => PathBuf::from(tmp_name),
    })
}

/// Replaces the contents of `path` with `bytes` atomically.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
    }

    let tmp_path = temp_path(path)?;
    let result = write_and_sync(&tmp_path, bytes)
        .and_then(|()| fs::rename(&tmp_path, path).map_err(|e| StoreError::io(path, e)));

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn write_and_sync(tmp_path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut file = File::create(tmp_path).map_err(|e| StoreError::io(tmp_path, e))?;
    file.write_all(bytes)
        .map_err(|e| StoreError::io(tmp_path, e))?;
    file.sync_all().map_err(|e| StoreError::io(tmp_path, e))
}
