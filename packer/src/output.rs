// Licensed under the Apache-2.0 license

//! File output for finished images.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

/// Write `bytes` to `path` through a temporary file in the same directory,
/// renamed into place only once the write has completed. A failure on any
/// path leaves nothing at `path`.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("cannot create temporary file next to '{}'", path.display()))?;
    tmp.write_all(bytes)
        .with_context(|| format!("cannot write image to '{}'", path.display()))?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("cannot finalize image at '{}'", path.display()))?;
    Ok(())
}
