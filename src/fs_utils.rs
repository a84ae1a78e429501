//! Filesystem utility functions
//!
//! This module provides common filesystem operations used across the codebase.

use std::fs;
use std::io;
use std::path::Path;

/// Create the parent directory of `path` if it is missing
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

/// Write `contents` to `path` atomically
///
/// Writes to a sibling temp file and renames it over the target, so readers
/// never observe a half-written file even if the process dies mid-write.
///
/// # Errors
/// Returns an error if the parent directory cannot be created, or the temp
/// file cannot be written or renamed.
pub fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    ensure_parent_dir(path)?;

    let mut temp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    fs::write(&temp_path, contents)?;
    fs::rename(&temp_path, path)
}
