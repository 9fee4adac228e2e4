//! Configuration schema for plugin-cache
//!
//! Configuration is stored at `~/.config/plugin-cache/config.toml`

use crate::cache::layout::DEFAULT_STORE_NAME;
use crate::cache::sweep::DEFAULT_PROTECTED_MARKERS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Cache settings
    pub cache: CacheConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log line format
    pub log_format: LogFormat,
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: LogFormat::Text,
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache root directory (default: platform data dir)
    pub root: Option<PathBuf>,

    /// Store directory name under the root
    pub store_name: String,

    /// Application whose packages are cached
    pub app_name: String,

    /// Version directories whose name contains any of these survive sweeps
    pub protected_markers: Vec<String>,

    /// Seconds to wait for a concurrent unpack of the same version
    pub lock_timeout_secs: u64,
}

impl CacheConfig {
    /// Configured root, or `<data_local_dir>/plugin-cache`
    pub fn root_dir(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("plugin-cache")
        })
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: None,
            store_name: DEFAULT_STORE_NAME.to_string(),
            app_name: "default".to_string(),
            protected_markers: DEFAULT_PROTECTED_MARKERS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            lock_timeout_secs: 300,
        }
    }
}
