//! Completion marker protocol
//!
//! A zero-byte sentinel next to an extraction directory records that the
//! directory was fully extracted and its metadata parsed. The sentinel is
//! written last, so a crash mid-extraction leaves no marker behind.

use crate::error::{CacheError, CacheResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name prefix of the sentinel
pub const MARKER_PREFIX: &str = "unpacked.";

/// Sentinel path for an extraction directory: `<parent>/unpacked.<name>`
pub fn marker_path(unpack_dir: &Path) -> PathBuf {
    let name = unpack_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent = unpack_dir.parent().unwrap_or_else(|| Path::new("."));
    parent.join(format!("{}{}", MARKER_PREFIX, name))
}

/// Whether the extraction directory is marked complete
pub fn is_complete(unpack_dir: &Path) -> bool {
    marker_path(unpack_dir).is_file()
}

/// Mark the extraction directory complete
pub fn mark_complete(unpack_dir: &Path) -> CacheResult<()> {
    let path = marker_path(unpack_dir);
    fs::File::create(&path)
        .and_then(|file| file.sync_all())
        .map_err(|e| CacheError::io(format!("writing completion marker {}", path.display()), e))?;
    debug!("Marked complete: {}", path.display());
    Ok(())
}

/// Remove the completion marker
///
/// A marker that is already gone counts as cleared. Any other failure is
/// escalated: a stale marker over damaged content must not survive.
pub fn clear(unpack_dir: &Path) -> CacheResult<()> {
    let path = marker_path(unpack_dir);
    match fs::remove_file(&path) {
        Ok(()) => {
            debug!("Cleared marker: {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(CacheError::MarkerClear { path, source }),
    }
}
