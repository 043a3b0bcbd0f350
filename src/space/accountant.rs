use std::path::Path;

use super::volume::VolumeStatsProvider;
use crate::error::Result;

/// Byte totals for one mount point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpaceStats {
    pub block_size: u64,
    pub total_bytes: u64,
    pub free_bytes: u64,
}

impl SpaceStats {
    pub fn used_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.free_bytes)
    }
}

/// Converts provider block counts into byte counts.
#[derive(Debug, Clone)]
pub struct SpaceAccountant<P> {
    provider: P,
}

impl<P: VolumeStatsProvider> SpaceAccountant<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn space_stats(&self, mount: &Path) -> Result<SpaceStats> {
        let stats = self.provider.stats(mount)?;
        Ok(SpaceStats {
            block_size: stats.block_size,
            total_bytes: stats.total_blocks.saturating_mul(stats.block_size),
            free_bytes: stats.available_blocks.saturating_mul(stats.block_size),
        })
    }

    /// Like [`space_stats`](Self::space_stats), but an unavailable volume
    /// contributes nothing instead of failing.
    pub fn space_stats_or_zero(&self, mount: &Path) -> SpaceStats {
        match self.space_stats(mount) {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!("Treating {} as empty: {}", mount.display(), e);
                SpaceStats::default()
            }
        }
    }
}
