use std::path::PathBuf;

use super::entry::{bytes_to_blocks, EntryKind, EntryTree};
use crate::error::{Result, UsageError};
use crate::filter::AppFilter;
use crate::space::{SpaceAccountant, VolumeStatsProvider};

/// Name of the entry for used space not attributed to any package
pub const SYSTEM_SPACE_NAME: &str = "System data";
/// Name of the entry for available space
pub const FREE_SPACE_NAME: &str = "Free space";

/// Default internal storage mount
pub const DEFAULT_DATA_MOUNT: &str = "/data";
/// Default cache partition mount
pub const DEFAULT_CACHE_MOUNT: &str = "/cache";

/// Byte totals gathered from the volumes a filter accounts against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpaceTotals {
    pub free_bytes: u64,
    pub used_bytes: u64,
}

/// Wraps a scanned applications container with synthetic space entries.
#[derive(Debug, Clone)]
pub struct TreeBuilder<P> {
    accountant: SpaceAccountant<P>,
    data_mount: PathBuf,
    cache_mount: PathBuf,
}

impl<P: VolumeStatsProvider> TreeBuilder<P> {
    pub fn new(provider: P) -> Self {
        Self {
            accountant: SpaceAccountant::new(provider),
            data_mount: PathBuf::from(DEFAULT_DATA_MOUNT),
            cache_mount: PathBuf::from(DEFAULT_CACHE_MOUNT),
        }
    }

    pub fn with_data_mount(mut self, mount: impl Into<PathBuf>) -> Self {
        self.data_mount = mount.into();
        self
    }

    pub fn with_cache_mount(mut self, mount: impl Into<PathBuf>) -> Self {
        self.cache_mount = mount.into();
        self
    }

    /// Block size of the internal storage volume.
    pub fn data_block_size(&self) -> Result<u64> {
        Ok(self.accountant.space_stats(&self.data_mount)?.block_size)
    }

    /// Free and used bytes over the partitions `filter` accounts against.
    /// Unavailable volumes contribute zero.
    pub fn space_totals(&self, filter: &AppFilter) -> SpaceTotals {
        let mut totals = SpaceTotals::default();

        if filter.counts_internal_data() {
            let data = self.accountant.space_stats_or_zero(&self.data_mount);
            totals.free_bytes += data.free_bytes;
            totals.used_bytes += data.used_bytes();
        }

        if filter.counts_cache_partition() {
            let cache = self.accountant.space_stats_or_zero(&self.cache_mount);
            totals.free_bytes += cache.free_bytes;
            totals.used_bytes += cache.used_bytes();
        }

        totals
    }

    /// Build the display tree around `apps`, whose root must be the
    /// applications container. Sizes in `apps` are in `display_block_size`
    /// units.
    ///
    /// Internal storage layout:
    ///
    /// ```text
    /// (root)
    /// └── Data | Cache | Data and Cache
    ///     ├── Applications
    ///     ├── System data   (only if > 0)
    ///     └── Free space    (only if > 0)
    /// ```
    ///
    /// Removable storage has no synthetic entries: `(root) └── Applications`.
    pub fn build(
        &self,
        apps: EntryTree,
        filter: &AppFilter,
        display_block_size: u64,
    ) -> Result<EntryTree> {
        let mut tree = apps;
        let apps_id = tree.root();
        if !matches!(tree.entry(apps_id).kind, EntryKind::Special { .. }) {
            return Err(UsageError::UnexpectedEntry {
                expected: "special container",
                found: tree.entry(apps_id).kind.label(),
            });
        }
        tree.set_block_size(display_block_size);

        let totals = self.space_totals(filter);
        let apps_bytes = tree.total_blocks().saturating_mul(display_block_size);
        let system_bytes = match totals.used_bytes.checked_sub(apps_bytes) {
            Some(bytes) => bytes,
            None => {
                tracing::debug!(
                    used = totals.used_bytes,
                    apps = apps_bytes,
                    "Applications exceed used space, clamping system space to zero"
                );
                0
            }
        };

        let root = tree.branch(None, EntryKind::Wrapper, &[])?;
        tree.set_root(root)?;

        if filter.use_sd {
            tree.attach(root, apps_id)?;
        } else {
            let container = tree.branch(
                Some(filter.container_name().to_string()),
                EntryKind::Wrapper,
                &[apps_id],
            )?;

            if system_bytes > 0 {
                let system = tree.leaf(
                    Some(SYSTEM_SPACE_NAME.to_string()),
                    EntryKind::SystemSpace,
                    bytes_to_blocks(system_bytes, display_block_size),
                );
                tree.attach(container, system)?;
            }

            if totals.free_bytes > 0 {
                let free = tree.leaf(
                    Some(FREE_SPACE_NAME.to_string()),
                    EntryKind::FreeSpace,
                    bytes_to_blocks(totals.free_bytes, display_block_size),
                );
                tree.attach(container, free)?;
            }

            tree.attach(root, container)?;
        }

        tree.validate()?;
        Ok(tree)
    }
}
