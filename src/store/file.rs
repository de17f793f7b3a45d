//! Whole-document JSON persistence

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use super::StoreError;

/// Replace `path` with the pretty-printed JSON of `value`.
///
/// The document goes to a sibling temp file which is fsynced and renamed over
/// the target, so a crash leaves either the old or the new document. The
/// parent directory is fsynced afterwards so the rename itself is durable.
pub fn write_json_durable<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_vec_pretty(value)?;
    let tmp_path = path.with_extension("json.tmp");

    let mut file = File::create(&tmp_path)?;
    file.write_all(&json)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp_path, path)?;

    if let Err(e) = sync_parent_dir(path) {
        tracing::warn!("Failed to sync directory of {}: {}", path.display(), e);
    }
    Ok(())
}

/// Flush the directory entry of `path` to disk
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    File::open(dir)?.sync_all()
}

// Directories cannot be opened for syncing here; the rename is left to the OS.
#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Read a JSON document. Missing or blank files yield `None`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    if !path.exists() {
        return Ok(None);
    }

    let data = fs::read(path)?;
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    Ok(Some(serde_json::from_slice(&data)?))
}
