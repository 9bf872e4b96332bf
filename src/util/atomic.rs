//! Atomic file writing.
//!
//! Writes go to a [`tempfile::NamedTempFile`] in the target's directory and
//! are renamed into place, so a crash mid-write never leaves a truncated
//! file behind. Parent directories are created on demand — the tools that
//! call this (`create_file`, `write_file`) expect the destination tree to
//! come into existence as part of the write.

use std::io::Write as _;
use std::path::Path;

use anyhow::{Context as _, Result};

/// Atomically write `content` to `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if directory creation, the temp-file write, or the
/// final rename fails (e.g. cross-device rename).
pub fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .with_context(|| format!("no parent directory for {}", path.display()))?;

    std::fs::create_dir_all(parent)
        .with_context(|| format!("failed to create directory {}", parent.display()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("failed to create temp file in {}", parent.display()))?;

    tmp.write_all(content.as_bytes())
        .and_then(|()| tmp.flush())
        .with_context(|| format!("failed to write temp file for {}", path.display()))?;

    tmp.persist(path)
        .with_context(|| format!("failed to atomically replace {}", path.display()))?;

    Ok(())
}
