//! Configuration file handling
//!
//! A single TOML file, `<config_dir>/plugin-cache/config.toml` unless
//! `--config` points elsewhere. A missing file means all defaults.

pub mod schema;

pub use schema::Config;

use crate::error::{CacheError, CacheResult};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Reads and writes the configuration file
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Manager for the per-user config file
    pub fn new() -> Self {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::with_path(base.join("plugin-cache").join("config.toml"))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the file, or return defaults when it does not exist
    pub async fn load(&self) -> CacheResult<Config> {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No config at {}, using defaults", self.path.display());
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(CacheError::io(
                    format!("reading config from {}", self.path.display()),
                    e,
                ))
            }
        };

        toml::from_str(&text).map_err(|e| CacheError::ConfigInvalid {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    /// Write `config`, creating the parent directory
    pub async fn save(&self, config: &Config) -> CacheResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| CacheError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let text = toml::to_string_pretty(config)?;
        fs::write(&self.path, text)
            .await
            .map_err(|e| CacheError::io(format!("writing config to {}", self.path.display()), e))?;
        info!("Wrote config {}", self.path.display());
        Ok(())
    }

    /// Write a default config unless one exists and `force` is off
    ///
    /// Returns whether the file was written.
    pub async fn init(&self, force: bool) -> CacheResult<bool> {
        if !force && fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(false);
        }
        self.save(&Config::default()).await?;
        Ok(true)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
