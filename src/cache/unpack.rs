//! Unpack coordinator
//!
//! Serves one `unpack` request: look up the version directory for the
//! archive's fingerprint, reuse it if it is marked complete and still parses,
//! otherwise extract afresh, mark it complete and sweep older versions.

use crate::cache::extract::extract_archive;
use crate::cache::fingerprint::hash_file;
use crate::cache::layout::{validate_fingerprint, CacheLayout};
use crate::cache::lock::VersionLock;
use crate::cache::marker;
use crate::cache::sweep::{is_protected, sweep_expired, SweepReport, DEFAULT_PROTECTED_MARKERS};
use crate::config::schema::CacheConfig;
use crate::error::{CacheError, CacheResult};
use crate::metadata::{ConfigJsonParser, MetadataParser};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Tunables for an [`Unpacker`]
#[derive(Debug, Clone)]
pub struct UnpackOptions {
    /// Directory-name substrings that exempt a version from sweeping
    pub protected_markers: Vec<String>,
    /// How long to wait for another unpack of the same version
    pub lock_timeout: Duration,
}

impl Default for UnpackOptions {
    fn default() -> Self {
        Self {
            protected_markers: DEFAULT_PROTECTED_MARKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            lock_timeout: Duration::from_secs(300),
        }
    }
}

/// Whether an extraction directory is marked complete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionState {
    /// Marker present
    Complete,
    /// No marker: never extracted, interrupted, or failed
    Incomplete,
}

impl fmt::Display for VersionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete => write!(f, "complete"),
            Self::Incomplete => write!(f, "incomplete"),
        }
    }
}

/// One extraction directory found on disk
#[derive(Debug, Clone, Serialize)]
pub struct VersionEntry {
    pub fingerprint: String,
    pub archive_name: String,
    pub unpack_dir: PathBuf,
    pub state: VersionState,
    /// Exempt from retention sweeps
    pub protected: bool,
    /// Marker modification time
    pub completed_at: Option<DateTime<Utc>>,
}

/// Content-addressed unpack cache for one application
#[derive(Debug)]
pub struct Unpacker<P = ConfigJsonParser> {
    layout: CacheLayout,
    parser: P,
    options: UnpackOptions,
}

impl Unpacker<ConfigJsonParser> {
    /// Create an unpacker with the default `config.json` parser
    pub fn new(root: &Path, store_name: &str, app_name: &str) -> CacheResult<Self> {
        let layout = CacheLayout::new(root, store_name, app_name)?;
        Ok(Self::with_parser(layout, ConfigJsonParser, UnpackOptions::default()))
    }

    /// Create an unpacker from the `[cache]` configuration table
    pub fn from_config(config: &CacheConfig) -> CacheResult<Self> {
        let layout = CacheLayout::new(&config.root_dir(), &config.store_name, &config.app_name)?;
        let options = UnpackOptions {
            protected_markers: config.protected_markers.clone(),
            lock_timeout: Duration::from_secs(config.lock_timeout_secs),
        };
        Ok(Self::with_parser(layout, ConfigJsonParser, options))
    }
}

impl<P: MetadataParser> Unpacker<P> {
    /// Create an unpacker with a custom metadata parser
    pub fn with_parser(layout: CacheLayout, parser: P, options: UnpackOptions) -> Self {
        Self {
            layout,
            parser,
            options,
        }
    }

    /// Directory layout in use
    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    /// Caller-supplied fingerprint, or the archive's content hash
    pub fn resolve_fingerprint(
        &self,
        fingerprint: Option<&str>,
        archive: &Path,
    ) -> CacheResult<String> {
        match fingerprint {
            Some(fingerprint) => {
                validate_fingerprint(fingerprint)?;
                Ok(fingerprint.to_string())
            }
            None => hash_file(archive),
        }
    }

    /// Whether this archive's version is already unpacked and marked complete
    pub fn is_unpacked(&self, fingerprint: Option<&str>, archive: &Path) -> CacheResult<bool> {
        let fingerprint = self.resolve_fingerprint(fingerprint, archive)?;
        let unpack_dir = self.layout.unpack_dir(&fingerprint, archive)?;
        Ok(marker::is_complete(&unpack_dir))
    }

    /// Unpack `archive` (or reuse an earlier unpack) and return its metadata
    ///
    /// Extraction happens at most once per fingerprint. A complete version
    /// whose metadata no longer parses is treated as damaged: its marker is
    /// cleared and the archive is extracted again. After a fresh extraction,
    /// superseded versions of the application are swept.
    pub fn unpack(&self, fingerprint: Option<&str>, archive: &Path) -> CacheResult<P::Record> {
        let fingerprint = self.resolve_fingerprint(fingerprint, archive)?;
        let unpack_dir = self.layout.unpack_dir(&fingerprint, archive)?;

        let record = {
            let _lock = VersionLock::acquire(
                &self.layout.lock_path(&fingerprint)?,
                self.options.lock_timeout,
            )?;

            fs::create_dir_all(&unpack_dir)
                .map_err(|e| CacheError::io(format!("creating {}", unpack_dir.display()), e))?;

            if marker::is_complete(&unpack_dir) {
                match self.parser.parse(&unpack_dir, &fingerprint) {
                    Ok(record) => {
                        debug!("Cache hit for {} ({})", archive.display(), fingerprint);
                        return Ok(record);
                    }
                    Err(e) if e.is_corruption() => {
                        warn!(
                            "Unpacked content at {} is damaged ({}), extracting again",
                            unpack_dir.display(),
                            e
                        );
                        marker::clear(&unpack_dir)?;
                    }
                    Err(e) => {
                        marker::clear(&unpack_dir)?;
                        return Err(e.into());
                    }
                }
            }

            reset_dir(&unpack_dir)?;
            let report = extract_archive(archive, &unpack_dir)?;
            let record = self.parser.parse(&unpack_dir, &fingerprint)?;
            marker::mark_complete(&unpack_dir)?;

            info!(
                "Unpacked {} ({} files) into {}",
                archive.display(),
                report.files,
                unpack_dir.display()
            );
            record
        };

        self.sweep(Some(fingerprint.as_str()), false);
        Ok(record)
    }

    /// Run the retention sweep, keeping `keep` and protected directories
    pub fn sweep(&self, keep: Option<&str>, dry_run: bool) -> SweepReport {
        let report = sweep_expired(&self.layout, keep, &self.options.protected_markers, dry_run);
        for (path, reason) in &report.failed {
            warn!("Could not sweep {}: {}", path.display(), reason);
        }
        report
    }

    /// Remove every version of the application that is not being unpacked,
    /// protected ones included
    pub fn clear_app(&self) -> SweepReport {
        sweep_expired(&self.layout, None, &[], false)
    }

    /// Fingerprint of the most recently completed version, if any
    ///
    /// This is the version a host is most likely serving; `gc` keeps it
    /// unless told otherwise.
    pub fn latest_complete(&self) -> CacheResult<Option<String>> {
        Ok(self
            .list_versions()?
            .into_iter()
            .filter_map(|v| v.completed_at.map(|at| (at, v.fingerprint)))
            .max()
            .map(|(_, fingerprint)| fingerprint))
    }

    /// Every extraction directory of the application, sorted by fingerprint
    pub fn list_versions(&self) -> CacheResult<Vec<VersionEntry>> {
        let app_dir = self.layout.app_dir();
        let mut versions = Vec::new();

        for version_dir in read_subdirs(&app_dir)? {
            let fingerprint = file_name_string(&version_dir);
            let protected = is_protected(&fingerprint, &self.options.protected_markers);

            for unpack_dir in read_subdirs(&version_dir)? {
                let marker_path = marker::marker_path(&unpack_dir);
                let completed_at = fs::metadata(&marker_path)
                    .ok()
                    .filter(|m| m.is_file())
                    .and_then(|m| m.modified().ok())
                    .map(DateTime::<Utc>::from);
                let state = if completed_at.is_some() {
                    VersionState::Complete
                } else {
                    VersionState::Incomplete
                };

                versions.push(VersionEntry {
                    fingerprint: fingerprint.clone(),
                    archive_name: file_name_string(&unpack_dir),
                    unpack_dir,
                    state,
                    protected,
                    completed_at,
                });
            }
        }

        versions.sort_by(|a, b| {
            (a.fingerprint.as_str(), a.archive_name.as_str())
                .cmp(&(b.fingerprint.as_str(), b.archive_name.as_str()))
        });
        Ok(versions)
    }
}

/// Empty `dir`, leaving it in place
fn reset_dir(dir: &Path) -> CacheResult<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(CacheError::io(format!("cleaning {}", dir.display()), e)),
    }
    fs::create_dir_all(dir).map_err(|e| CacheError::io(format!("creating {}", dir.display()), e))
}

fn read_subdirs(dir: &Path) -> CacheResult<Vec<PathBuf>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(CacheError::io(format!("listing {}", dir.display()), e)),
    };

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CacheError::io(format!("listing {}", dir.display()), e))?;
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            dirs.push(entry.path());
        }
    }
    Ok(dirs)
}

fn file_name_string(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
