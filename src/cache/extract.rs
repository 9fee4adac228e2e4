//! Safe zip extraction
//!
//! Every entry name is normalized lexically before anything is written. An
//! entry whose path would leave the target directory (`../x`, `/etc/x`,
//! `a/../../x`) aborts the whole extraction with an integrity error.

use crate::error::{CacheError, CacheResult};
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};
use zip::result::ZipError;
use zip::ZipArchive;

/// Summary of a finished extraction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractReport {
    /// Regular files written
    pub files: usize,
    /// Uncompressed bytes written
    pub bytes: u64,
    /// Entries that overwrote an earlier entry with the same resolved path
    pub overwritten: usize,
}

/// Resolve an archive entry name to a path inside `target`
///
/// `.` segments are dropped and `..` segments pop the previous segment;
/// popping past the target root, absolute names, and names that resolve to
/// the target itself are rejected. Backslashes are treated as separators.
pub fn resolve_entry_path(target: &Path, entry_name: &str) -> CacheResult<PathBuf> {
    let normalized = entry_name.replace('\\', "/");
    let mut parts: Vec<&OsStr> = Vec::new();

    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() {
                    return Err(CacheError::integrity(
                        entry_name,
                        "path escapes the target directory",
                    ));
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(CacheError::integrity(entry_name, "absolute path"));
            }
        }
    }

    if parts.is_empty() {
        return Err(CacheError::integrity(entry_name, "does not name a file"));
    }

    let resolved: PathBuf = parts.iter().fold(target.to_path_buf(), |acc, p| acc.join(p));
    if !resolved.starts_with(target) || resolved == target {
        return Err(CacheError::integrity(
            entry_name,
            "path escapes the target directory",
        ));
    }
    Ok(resolved)
}

/// Extract every non-directory entry of `archive` into `target`
///
/// Entries are written in archive order; a later entry resolving to the same
/// path overwrites the earlier one and is logged. The archive handle is
/// closed when this function returns, on success or failure.
pub fn extract_archive(archive: &Path, target: &Path) -> CacheResult<ExtractReport> {
    let read_err = |source: ZipError| CacheError::ArchiveRead {
        path: archive.to_path_buf(),
        source,
    };

    let file = File::open(archive).map_err(|e| read_err(ZipError::Io(e)))?;
    let mut zip = ZipArchive::new(BufReader::new(file)).map_err(read_err)?;

    fs::create_dir_all(target)
        .map_err(|e| CacheError::io(format!("creating {}", target.display()), e))?;

    debug!(
        "Extracting {} entries from {} into {}",
        zip.len(),
        archive.display(),
        target.display()
    );

    let mut report = ExtractReport::default();
    let mut written: HashSet<PathBuf> = HashSet::new();

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(read_err)?;
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        let out_path = resolve_entry_path(target, &name)?;

        if !written.insert(out_path.clone()) {
            warn!("Archive entry {:?} overwrites an earlier entry", name);
            report.overwritten += 1;
        }

        let write_err = |source: io::Error| CacheError::EntryWrite {
            entry: name.clone(),
            path: out_path.clone(),
            source,
        };

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let mut out = BufWriter::new(File::create(&out_path).map_err(write_err)?);
        let bytes = io::copy(&mut entry, &mut out).map_err(write_err)?;
        out.flush().map_err(write_err)?;

        report.files += 1;
        report.bytes += bytes;
    }

    debug!(
        "Extracted {} files ({} bytes) from {}",
        report.files,
        report.bytes,
        archive.display()
    );
    Ok(report)
}
