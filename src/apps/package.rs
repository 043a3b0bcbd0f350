//! Installed package records and where they come from.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, UsageError};
use crate::filter::AppFilter;
use crate::tree::{applications_container, EntryTree, PackageSizes};

/// One installed application as reported by the package manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRecord {
    /// Package identifier
    pub id: String,

    /// Human-readable label, falls back to the id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default)]
    pub apk_bytes: u64,

    #[serde(default)]
    pub data_bytes: u64,

    #[serde(default)]
    pub cache_bytes: u64,
}

impl PackageRecord {
    pub fn new(id: impl Into<String>, apk_bytes: u64, data_bytes: u64, cache_bytes: u64) -> Self {
        Self {
            id: id.into(),
            label: None,
            apk_bytes,
            data_bytes,
            cache_bytes,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    pub fn sizes(&self) -> PackageSizes {
        PackageSizes {
            id: self.id.clone(),
            apk_bytes: self.apk_bytes,
            data_bytes: self.data_bytes,
            cache_bytes: self.cache_bytes,
        }
    }
}

/// Enumerates installed packages.
pub trait PackageSource {
    fn packages(&self) -> Result<Vec<PackageRecord>>;
}

impl PackageSource for Vec<PackageRecord> {
    fn packages(&self) -> Result<Vec<PackageRecord>> {
        Ok(self.clone())
    }
}

impl<S: PackageSource + ?Sized> PackageSource for &S {
    fn packages(&self) -> Result<Vec<PackageRecord>> {
        (**self).packages()
    }
}

impl<S: PackageSource + ?Sized> PackageSource for Box<S> {
    fn packages(&self) -> Result<Vec<PackageRecord>> {
        (**self).packages()
    }
}

/// Package records read from a JSON array on disk.
///
/// ```json
/// [{ "id": "org.example.maps", "label": "Maps", "apk_bytes": 1024, "data_bytes": 0, "cache_bytes": 0 }]
/// ```
#[derive(Debug, Clone)]
pub struct ManifestSource {
    path: PathBuf,
}

impl ManifestSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PackageSource for ManifestSource {
    fn packages(&self) -> Result<Vec<PackageRecord>> {
        let content = fs::read_to_string(&self.path).map_err(|e| UsageError::Io {
            path: self.path.clone(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| {
            UsageError::PackageSource(format!("{}: {}", self.path.display(), e))
        })
    }
}

/// Build the applications container for `records` under `filter`.
pub fn applications_from_records(
    records: &[PackageRecord],
    filter: &AppFilter,
    block_size: u64,
) -> Result<EntryTree> {
    applications_container(
        records
            .iter()
            .map(|r| (r.display_name().to_string(), r.sizes())),
        filter,
        block_size,
    )
}
