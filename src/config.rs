use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::filter::AppFilter;
use crate::tree::{DEFAULT_CACHE_MOUNT, DEFAULT_DATA_MOUNT};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    /// Filter used when none has been saved
    pub filter: AppFilter,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Internal storage mount point
    pub data_mount: PathBuf,
    /// Cache partition mount point
    pub cache_mount: PathBuf,
    /// Display block size in bytes (0 = use the data volume's)
    pub block_size: u64,
    /// Only accept mount points listed in /proc/mounts
    pub require_mount_point: bool,
    /// Package manifest (JSON) to read installed packages from
    pub manifest: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Maximum tree depth to display
    pub max_depth: usize,
    /// Entries shown per container
    pub top: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_mount: PathBuf::from(DEFAULT_DATA_MOUNT),
            cache_mount: PathBuf::from(DEFAULT_CACHE_MOUNT),
            block_size: 0,
            require_mount_point: false,
            manifest: None,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            top: 20,
        }
    }
}

impl Config {
    /// Load configuration from `path`, or from the default location when
    /// `path` is `None`. A missing default file yields the defaults; a
    /// missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !required && !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
            path: path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.clone(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// `<config dir>/app-usage/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("app-usage").join("config.toml"))
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.storage.data_mount.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data_mount must not be empty".into()));
        }
        if self.storage.cache_mount.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("cache_mount must not be empty".into()));
        }
        if self.report.top == 0 {
            return Err(ConfigError::Invalid("report.top must be at least 1".into()));
        }
        Ok(())
    }
}
