//! Package metadata parsed from an extraction directory
//!
//! Every plugin package carries a `config.json` manifest at its root naming
//! the loader, runtime and plugin APKs it ships. A package is considered
//! intact only if the manifest parses and every APK it names is present.

use crate::cache::extract::resolve_entry_path;
use crate::error::MetadataError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest file name at the root of every package
pub const CONFIG_FILENAME: &str = "config.json";

/// Highest manifest `version` this build understands
pub const MAX_CONFIG_VERSION: i64 = 4;

/// Parses the metadata record of an extracted package
///
/// Success is the cache's proof that an extraction directory is intact.
pub trait MetadataParser {
    /// The parsed record handed back to callers
    type Record;

    /// Parse the record from `unpack_dir`
    fn parse(&self, unpack_dir: &Path, fingerprint: &str) -> Result<Self::Record, MetadataError>;
}

/// A single APK shipped in a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApkEntry {
    #[serde(rename = "apkName")]
    pub apk_name: String,
    #[serde(default)]
    pub hash: Option<String>,
}

/// A business plugin shipped in a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginEntry {
    #[serde(rename = "partKey")]
    pub part_key: String,
    #[serde(rename = "apkName")]
    pub apk_name: String,
    #[serde(rename = "businessName", default)]
    pub business_name: Option<String>,
    #[serde(rename = "hostWhiteList", default)]
    pub host_white_list: Vec<String>,
    #[serde(rename = "dependsOn", default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub hash: Option<String>,
}

/// Parsed `config.json` plus where it was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Manifest format version
    pub version: i64,
    /// Package UUID
    #[serde(rename = "UUID")]
    pub uuid: String,
    /// Human-readable package name
    #[serde(rename = "UUID_NickName", default)]
    pub uuid_nickname: String,
    /// Older manifest versions this package stays compatible with
    #[serde(default)]
    pub compact_version: Vec<i64>,
    #[serde(rename = "pluginLoader", default)]
    pub plugin_loader: Option<ApkEntry>,
    #[serde(default)]
    pub runtime: Option<ApkEntry>,
    #[serde(default)]
    pub plugins: Vec<PluginEntry>,

    /// Extraction directory the record was parsed from
    #[serde(skip_deserializing)]
    pub unpack_dir: PathBuf,
    /// Fingerprint of the archive the directory was extracted from
    #[serde(skip_deserializing)]
    pub fingerprint: String,
}

impl PluginConfig {
    /// Every APK file name the manifest references
    pub fn apk_names(&self) -> impl Iterator<Item = &str> {
        self.plugin_loader
            .iter()
            .chain(self.runtime.iter())
            .map(|e| e.apk_name.as_str())
            .chain(self.plugins.iter().map(|p| p.apk_name.as_str()))
    }

    /// Parse from JSON text, stamping in the directory and fingerprint
    pub fn from_json(
        json: &str,
        unpack_dir: &Path,
        fingerprint: &str,
    ) -> Result<Self, serde_json::Error> {
        let mut config: Self = serde_json::from_str(json)?;
        config.unpack_dir = unpack_dir.to_path_buf();
        config.fingerprint = fingerprint.to_string();
        Ok(config)
    }
}

/// Default parser: reads `config.json` and checks the referenced APKs exist
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigJsonParser;

impl MetadataParser for ConfigJsonParser {
    type Record = PluginConfig;

    fn parse(&self, unpack_dir: &Path, fingerprint: &str) -> Result<PluginConfig, MetadataError> {
        let path = unpack_dir.join(CONFIG_FILENAME);
        let json = fs::read_to_string(&path).map_err(|source| MetadataError::Missing {
            path: path.clone(),
            source,
        })?;

        let config = PluginConfig::from_json(&json, unpack_dir, fingerprint)
            .map_err(|source| MetadataError::Malformed { path, source })?;

        if config.version > MAX_CONFIG_VERSION {
            return Err(MetadataError::UnsupportedVersion {
                found: config.version,
                max: MAX_CONFIG_VERSION,
            });
        }

        for name in config.apk_names() {
            let apk_path = resolve_entry_path(unpack_dir, name).map_err(|_| {
                MetadataError::ApkOutsidePackage {
                    apk: name.to_string(),
                }
            })?;
            if !apk_path.is_file() {
                return Err(MetadataError::MissingApk {
                    apk: name.to_string(),
                    dir: unpack_dir.to_path_buf(),
                });
            }
        }

        Ok(config)
    }
}
