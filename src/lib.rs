//! plugin-cache - Content-addressed unpack cache for plugin packages
//!
//! Extracts a downloaded package archive once per content fingerprint,
//! reuses the extraction on later requests, recovers from damaged
//! extractions and sweeps superseded versions.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod metadata;
pub mod ui;

pub use cache::Unpacker;
pub use error::{CacheError, CacheResult};
pub use metadata::{ConfigJsonParser, MetadataParser, PluginConfig};
