//! Retention sweep of superseded versions
//!
//! After a successful unpack every other version directory of the
//! application is deleted, except directories whose name contains a
//! protected marker (native libraries, precompiled dex output) and
//! directories whose version lock is currently held. Sweeping is
//! best-effort: failures are logged and reported, never returned.

use crate::cache::layout::CacheLayout;
use crate::cache::lock::VersionLock;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default protected markers
pub const DEFAULT_PROTECTED_MARKERS: &[&str] = &["lib", "oDex"];

/// Outcome of one sweep
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    /// Directories deleted (or that would be, on a dry run)
    pub removed: Vec<PathBuf>,
    /// Directories kept because they hold the current fingerprint
    pub kept: Vec<PathBuf>,
    /// Directories kept because their name contains a protected marker
    pub protected: Vec<PathBuf>,
    /// Directories skipped because an unpack holds their lock
    pub busy: Vec<PathBuf>,
    /// Directories that could not be deleted, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl SweepReport {
    /// Whether every candidate was handled without error
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Whether a directory name contains any protected marker
pub fn is_protected(name: &str, protected_markers: &[String]) -> bool {
    protected_markers
        .iter()
        .any(|marker| !marker.is_empty() && name.contains(marker.as_str()))
}

/// Delete every version directory of the application that is not `keep`,
/// not protected, and not locked
pub fn sweep_expired(
    layout: &CacheLayout,
    keep: Option<&str>,
    protected_markers: &[String],
    dry_run: bool,
) -> SweepReport {
    let app_dir = layout.app_dir();
    let mut report = SweepReport::default();

    let entries = match fs::read_dir(&app_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return report,
        Err(e) => {
            warn!("Cannot list {} for sweeping: {}", app_dir.display(), e);
            report.failed.push((app_dir, e.to_string()));
            return report;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Cannot read entry in {}: {}", app_dir.display(), e);
                report.failed.push((app_dir.clone(), e.to_string()));
                continue;
            }
        };

        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir {
            continue;
        }

        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        if keep.is_some_and(|fingerprint| name.contains(fingerprint)) {
            report.kept.push(path);
            continue;
        }
        if is_protected(&name, protected_markers) {
            debug!("Keeping protected directory {}", path.display());
            report.protected.push(path);
            continue;
        }

        sweep_one(layout, &name, &path, dry_run, &mut report);
    }

    if !report.removed.is_empty() {
        info!(
            "Swept {} expired version(s) of {}{}",
            report.removed.len(),
            layout.app_name(),
            if dry_run { " (dry run)" } else { "" }
        );
    }
    report
}

fn sweep_one(layout: &CacheLayout, name: &str, path: &Path, dry_run: bool, report: &mut SweepReport) {
    let lock = match layout
        .lock_path(name)
        .and_then(|lock_path| VersionLock::try_acquire(&lock_path))
    {
        Ok(Some(lock)) => lock,
        Ok(None) => {
            debug!("Skipping {}: unpack in progress", path.display());
            report.busy.push(path.to_path_buf());
            return;
        }
        Err(e) => {
            warn!("Cannot lock {} for sweeping: {}", path.display(), e);
            report.failed.push((path.to_path_buf(), e.to_string()));
            return;
        }
    };

    if dry_run {
        report.removed.push(path.to_path_buf());
        return;
    }

    match fs::remove_dir_all(path) {
        Ok(()) => {
            debug!("Removed expired version {}", path.display());
            report.removed.push(path.to_path_buf());
        }
        Err(e) => {
            warn!("Failed to remove {}: {}", path.display(), e);
            report.failed.push((path.to_path_buf(), e.to_string()));
        }
    }
    drop(lock);
}
