//! Content-addressed unpack cache for plugin packages
//!
//! Each package archive is extracted at most once per content fingerprint.
//! Completion is recorded by a sentinel file written after extraction and a
//! successful metadata parse, so the filesystem alone is the source of truth
//! and an interrupted extraction is simply retried on the next request.
//!
//! # Security Model
//!
//! - Version directories are keyed by the archive's SHA256 digest
//! - Entry names are normalized before writing; any entry that would land
//!   outside the extraction directory aborts the extraction
//! - Unpacks of one version are serialized by an advisory file lock
//!
//! # Version States
//!
//! | State | Marker | Description |
//! |-------|--------|-------------|
//! | Absent | no | Never extracted |
//! | Extracting | no | In progress or crashed, re-extracted on next request |
//! | Complete | yes | Extracted and metadata parsed, served as-is |

pub mod extract;
pub mod fingerprint;
pub mod layout;
pub mod lock;
pub mod marker;
pub mod sweep;
pub mod unpack;

pub use extract::{extract_archive, resolve_entry_path, ExtractReport};
pub use fingerprint::hash_file;
pub use layout::{CacheLayout, DEFAULT_STORE_NAME};
pub use lock::VersionLock;
pub use sweep::{sweep_expired, SweepReport};
pub use unpack::{UnpackOptions, Unpacker, VersionEntry, VersionState};
