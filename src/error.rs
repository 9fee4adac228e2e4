//! Error types for plugin-cache
//!
//! All modules use `CacheResult<T>` as their return type.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for plugin-cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Coarse error classes callers can branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The archive container could not be opened or parsed
    ArchiveRead,
    /// An entry escaped the target directory or could not be written
    ArchiveIntegrity,
    /// Directory, sentinel or lock I/O failed
    Filesystem,
    /// The package metadata record is missing, malformed or unsupported
    MetadataParse,
    /// Configuration could not be read or written
    Config,
    /// Anything else (bad input, serialization, internal)
    Other,
}

/// Failures parsing the package metadata record out of an extraction directory
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Metadata file missing or unreadable: {path}")]
    Missing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed metadata in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Package references {apk} but it is not present in {dir}")]
    MissingApk { apk: String, dir: PathBuf },

    #[error("Package references {apk}, which lies outside the package directory")]
    ApkOutsidePackage { apk: String },

    #[error("Unsupported metadata version {found} (max supported: {max})")]
    UnsupportedVersion { found: i64, max: i64 },
}

impl MetadataError {
    /// Whether this failure indicates damaged on-disk content.
    ///
    /// Schema incompatibility and unsafe manifests are not corruption:
    /// re-extracting the same bytes would produce the same record.
    pub fn is_corruption(&self) -> bool {
        !matches!(
            self,
            Self::UnsupportedVersion { .. } | Self::ApkOutsidePackage { .. }
        )
    }
}

/// All errors that can occur in plugin-cache
#[derive(Error, Debug)]
pub enum CacheError {
    // Archive errors
    #[error("Cannot read archive {path}: {source}")]
    ArchiveRead {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Archive entry {entry:?} rejected: {reason}")]
    ArchiveIntegrity { entry: String, reason: String },

    #[error("Failed to write archive entry {entry:?} to {path}")]
    EntryWrite {
        entry: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Cache state errors
    #[error("Metadata parse failed and completion marker could not be removed: {path}")]
    MarkerClear {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    #[error("Timed out after {timeout:?} waiting for lock {path}")]
    LockTimeout { path: PathBuf, timeout: Duration },

    #[error("Invalid fingerprint {0:?}: must be a non-empty single path segment")]
    InvalidFingerprint(String),

    #[error("Invalid application name {0:?}: must be a non-empty single path segment")]
    InvalidAppName(String),

    #[error("Invalid archive name {0:?}: names starting with \"unpacked.\" are reserved")]
    InvalidArchiveName(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl CacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create an integrity error for a rejected entry
    pub fn integrity(entry: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ArchiveIntegrity {
            entry: entry.into(),
            reason: reason.into(),
        }
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ArchiveRead { .. } => ErrorKind::ArchiveRead,
            Self::ArchiveIntegrity { .. } | Self::EntryWrite { .. } => ErrorKind::ArchiveIntegrity,
            Self::MarkerClear { .. }
            | Self::LockTimeout { .. }
            | Self::Io { .. }
            | Self::PathNotFound(_) => ErrorKind::Filesystem,
            Self::Metadata(_) => ErrorKind::MetadataParse,
            Self::ConfigInvalid { .. } | Self::ConfigDirCreate { .. } | Self::TomlParse(_) => {
                ErrorKind::Config
            }
            _ => ErrorKind::Other,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ArchiveRead { .. } => Some("The archive is not a valid zip file; download it again"),
            Self::ArchiveIntegrity { .. } => {
                Some("The archive contains unsafe entry names and was not extracted")
            }
            Self::MarkerClear { .. } => {
                Some("Remove the cache directory manually: plugin-cache clear")
            }
            Self::InvalidArchiveName(_) => Some("Rename the archive before unpacking it"),
            Self::LockTimeout { .. } => {
                Some("Another process is unpacking the same package; retry later")
            }
            Self::Metadata(MetadataError::UnsupportedVersion { .. }) => {
                Some("Upgrade plugin-cache to read this package format")
            }
            _ => None,
        }
    }
}
