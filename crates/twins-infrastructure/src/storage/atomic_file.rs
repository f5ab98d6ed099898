//! Atomic file writes.
//!
//! Writers go through a temporary sibling file which is fsynced and then
//! renamed over the target, so readers see either the old or the new
//! content and never a torn write.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Reads `path` as UTF-8.
///
/// # Returns
///
/// - `Ok(Some(content))`: file exists and is not blank
/// - `Ok(None)`: file doesn't exist or is empty
/// - `Err`: the file exists but could not be read
pub async fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path).await {
        Ok(content) if content.trim().is_empty() => Ok(None),
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Writes `content` to `path` atomically, creating parent directories.
pub async fn write_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let tmp_path = temp_path(path)?;
    let mut tmp_file = fs::File::create(&tmp_path).await?;
    tmp_file.write_all(content).await?;
    tmp_file.sync_all().await?;
    drop(tmp_file);

    if let Err(e) = fs::rename(&tmp_path, path).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(e);
    }
    Ok(())
}

fn temp_path(path: &Path) -> io::Result<PathBuf> {
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "Path has no parent directory")
    })?;
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no file name"))?;

    Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
}
