//! Directory layout for unpacked packages
//!
//! ```text
//! <root>/<store>/UnpackedPlugin/<app>/<fingerprint>/<archive-file-name>/...
//! <root>/<store>/UnpackedPlugin/<app>/<fingerprint>/unpacked.<archive-file-name>
//! <root>/<store>/UnpackedPlugin/.locks/<app>/<fingerprint>.lock
//! ```
//!
//! Names are stable across restarts; the on-disk layout is the only record
//! of what has been unpacked.

use crate::cache::marker::MARKER_PREFIX;
use crate::error::{CacheError, CacheResult};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Default store directory name under the cache root
pub const DEFAULT_STORE_NAME: &str = "ShadowPluginManager";

/// Directory under the store holding every application's unpacked packages
pub const UNPACKED_DIR_NAME: &str = "UnpackedPlugin";

/// Directory under `UnpackedPlugin` holding per-version lock files
const LOCKS_DIR_NAME: &str = ".locks";

/// Resolves cache paths for one application
#[derive(Debug, Clone)]
pub struct CacheLayout {
    unpacked_dir: PathBuf,
    app_name: String,
}

impl CacheLayout {
    /// Create a layout rooted at `<root>/<store_name>/UnpackedPlugin`
    ///
    /// Creates the `UnpackedPlugin` directory if it doesn't exist.
    pub fn new(root: &Path, store_name: &str, app_name: &str) -> CacheResult<Self> {
        if !is_single_segment(store_name) {
            return Err(CacheError::User(format!(
                "Invalid store name {:?}: must be a single path segment",
                store_name
            )));
        }
        if !is_single_segment(app_name) || app_name == LOCKS_DIR_NAME {
            return Err(CacheError::InvalidAppName(app_name.to_string()));
        }

        let unpacked_dir = root.join(store_name).join(UNPACKED_DIR_NAME);
        fs::create_dir_all(&unpacked_dir).map_err(|e| {
            CacheError::io(format!("creating {}", unpacked_dir.display()), e)
        })?;

        Ok(Self {
            unpacked_dir,
            app_name: app_name.to_string(),
        })
    }

    /// Application name this layout is scoped to
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// `<root>/<store>/UnpackedPlugin/<app>`
    pub fn app_dir(&self) -> PathBuf {
        self.unpacked_dir.join(&self.app_name)
    }

    /// `<app_dir>/<fingerprint>`
    pub fn version_dir(&self, fingerprint: &str) -> CacheResult<PathBuf> {
        validate_fingerprint(fingerprint)?;
        Ok(self.app_dir().join(fingerprint))
    }

    /// `<app_dir>/<fingerprint>/<archive file name>`
    ///
    /// Keyed by the archive's file name so byte-identical archives with
    /// different names get separate extraction directories. Names starting
    /// with the marker prefix are rejected: they would collide with another
    /// archive's completion marker.
    pub fn unpack_dir(&self, fingerprint: &str, archive: &Path) -> CacheResult<PathBuf> {
        let name = archive
            .file_name()
            .ok_or_else(|| CacheError::PathNotFound(archive.to_path_buf()))?;
        if name.to_string_lossy().starts_with(MARKER_PREFIX) {
            return Err(CacheError::InvalidArchiveName(
                name.to_string_lossy().into_owned(),
            ));
        }
        Ok(self.version_dir(fingerprint)?.join(name))
    }

    /// Lock file guarding one version directory
    pub fn lock_path(&self, fingerprint: &str) -> CacheResult<PathBuf> {
        validate_fingerprint(fingerprint)?;
        Ok(self
            .unpacked_dir
            .join(LOCKS_DIR_NAME)
            .join(&self.app_name)
            .join(format!("{}.lock", fingerprint)))
    }
}

/// Reject fingerprints that would not map to exactly one directory name
pub fn validate_fingerprint(fingerprint: &str) -> CacheResult<()> {
    if is_single_segment(fingerprint) {
        Ok(())
    } else {
        Err(CacheError::InvalidFingerprint(fingerprint.to_string()))
    }
}

fn is_single_segment(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn layout_paths() {
        let dir = TempDir::new().unwrap();
        let layout = CacheLayout::new(dir.path(), DEFAULT_STORE_NAME, "demo").unwrap();

        let base = dir.path().join("ShadowPluginManager").join("UnpackedPlugin");
        assert!(base.is_dir());
        assert_eq!(layout.app_dir(), base.join("demo"));
        assert_eq!(layout.version_dir("abc").unwrap(), base.join("demo").join("abc"));
        assert_eq!(
            layout.unpack_dir("abc", Path::new("/downloads/plugin-debug.zip")).unwrap(),
            base.join("demo").join("abc").join("plugin-debug.zip")
        );
        assert_eq!(
            layout.lock_path("abc").unwrap(),
            base.join(".locks").join("demo").join("abc.lock")
        );
    }

    #[test]
    fn lock_dir_is_outside_app_dir() {
        let dir = TempDir::new().unwrap();
        let layout = CacheLayout::new(dir.path(), DEFAULT_STORE_NAME, "demo").unwrap();
        let lock = layout.lock_path("abc").unwrap();
        assert!(!lock.starts_with(layout.app_dir()));
    }

    #[test]
    fn same_fingerprint_different_archive_names() {
        let dir = TempDir::new().unwrap();
        let layout = CacheLayout::new(dir.path(), DEFAULT_STORE_NAME, "demo").unwrap();
        let a = layout.unpack_dir("abc", Path::new("a.zip")).unwrap();
        let b = layout.unpack_dir("abc", Path::new("b.zip")).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.parent(), b.parent());
    }

    #[test]
    fn rejects_bad_fingerprints() {
        let dir = TempDir::new().unwrap();
        let layout = CacheLayout::new(dir.path(), DEFAULT_STORE_NAME, "demo").unwrap();
        for bad in ["", "..", ".", "a/b", "../x", "a\\b"] {
            assert!(
                matches!(layout.version_dir(bad), Err(CacheError::InvalidFingerprint(_))),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn rejects_bad_app_name() {
        let dir = TempDir::new().unwrap();
        let err = CacheLayout::new(dir.path(), DEFAULT_STORE_NAME, "../other").unwrap_err();
        assert!(matches!(err, CacheError::InvalidAppName(_)));
    }

    #[test]
    fn lock_dir_name_is_not_an_app_name() {
        let dir = TempDir::new().unwrap();
        let err = CacheLayout::new(dir.path(), DEFAULT_STORE_NAME, LOCKS_DIR_NAME).unwrap_err();
        assert!(matches!(err, CacheError::InvalidAppName(_)));
    }

    #[test]
    fn archive_named_like_a_marker_is_rejected() {
        let dir = TempDir::new().unwrap();
        let layout = CacheLayout::new(dir.path(), DEFAULT_STORE_NAME, "demo").unwrap();

        let err = layout
            .unpack_dir("abc", Path::new("/downloads/unpacked.plugin.zip"))
            .unwrap_err();
        assert!(matches!(err, CacheError::InvalidArchiveName(ref n) if n == "unpacked.plugin.zip"));
        // Only the prefix is reserved
        assert!(layout.unpack_dir("abc", Path::new("plugin.unpacked.zip")).is_ok());
    }
}
