//! Persistence of the last applied filter.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result, UsageError};
use crate::filter::AppFilter;

/// Load and save the filter across sessions.
pub trait FilterStore {
    /// The saved filter, or `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<AppFilter>>;

    fn save(&self, filter: &AppFilter) -> Result<()>;
}

/// Filter stored as a small TOML file.
#[derive(Debug, Clone)]
pub struct TomlFilterStore {
    path: PathBuf,
}

impl TomlFilterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in `<config dir>/app-usage/filter.toml`.
    pub fn in_config_dir() -> Option<Self> {
        dirs::config_dir().map(|dir| Self::new(dir.join("app-usage").join("filter.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forget the saved filter.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(UsageError::Io {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}

impl FilterStore for TomlFilterStore {
    fn load(&self) -> Result<Option<AppFilter>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| ConfigError::ReadError {
            path: self.path.clone(),
            source: e,
        })?;

        let filter = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: self.path.clone(),
            source: e,
        })?;

        Ok(Some(filter))
    }

    fn save(&self, filter: &AppFilter) -> Result<()> {
        let content = toml::to_string_pretty(filter).map_err(|e| ConfigError::WriteError {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| UsageError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        fs::write(&self.path, content).map_err(|e| UsageError::Io {
            path: self.path.clone(),
            source: e,
        })?;

        tracing::debug!(path = %self.path.display(), ?filter, "Saved filter");
        Ok(())
    }
}
