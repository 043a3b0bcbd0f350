use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use nix::sys::statvfs::statvfs;

use crate::error::{Result, UsageError};

/// Raw block counts reported for one mount point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VolumeStats {
    pub block_size: u64,
    pub total_blocks: u64,
    pub available_blocks: u64,
}

impl VolumeStats {
    pub fn new(block_size: u64, total_blocks: u64, available_blocks: u64) -> Self {
        Self {
            block_size,
            total_blocks,
            available_blocks,
        }
    }
}

/// Source of volume statistics for a mount path.
pub trait VolumeStatsProvider {
    /// Stats for `mount`, or [`UsageError::VolumeUnavailable`].
    fn stats(&self, mount: &Path) -> Result<VolumeStats>;
}

impl<P: VolumeStatsProvider + ?Sized> VolumeStatsProvider for &P {
    fn stats(&self, mount: &Path) -> Result<VolumeStats> {
        (**self).stats(mount)
    }
}

impl<P: VolumeStatsProvider + ?Sized> VolumeStatsProvider for Box<P> {
    fn stats(&self, mount: &Path) -> Result<VolumeStats> {
        (**self).stats(mount)
    }
}

/// Volume stats read with `statvfs(3)`.
#[derive(Debug, Clone, Default)]
pub struct StatvfsProvider {
    /// Only answer for paths listed in `/proc/mounts`
    require_mount_point: bool,
}

impl StatvfsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject paths that are directories on some other filesystem rather
    /// than mount points of their own.
    pub fn with_require_mount_point(mut self, enabled: bool) -> Self {
        self.require_mount_point = enabled;
        self
    }
}

impl VolumeStatsProvider for StatvfsProvider {
    fn stats(&self, mount: &Path) -> Result<VolumeStats> {
        if self.require_mount_point {
            let mounts = mount_points()?;
            if !mounts.iter().any(|m| m == mount) {
                return Err(UsageError::VolumeUnavailable {
                    path: mount.to_path_buf(),
                    reason: "not a mount point".to_string(),
                });
            }
        }

        let stat = statvfs(mount).map_err(|e| UsageError::VolumeUnavailable {
            path: mount.to_path_buf(),
            reason: e.to_string(),
        })?;

        // Block counts are expressed in fragment-size units
        Ok(VolumeStats {
            block_size: stat.fragment_size() as u64,
            total_blocks: stat.blocks() as u64,
            available_blocks: stat.blocks_available() as u64,
        })
    }
}

/// Mount point paths listed in `/proc/mounts`.
pub fn mount_points() -> Result<Vec<PathBuf>> {
    let path = Path::new("/proc/mounts");
    let file = File::open(path).map_err(|e| UsageError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut mounts = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| UsageError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        if let Some(mount_point) = line.split_whitespace().nth(1) {
            mounts.push(PathBuf::from(mount_point));
        }
    }

    Ok(mounts)
}

/// Fixed, in-memory volume table.
#[derive(Debug, Clone, Default)]
pub struct StaticVolumes {
    volumes: HashMap<PathBuf, VolumeStats>,
}

impl StaticVolumes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_volume(mut self, mount: impl Into<PathBuf>, stats: VolumeStats) -> Self {
        self.volumes.insert(mount.into(), stats);
        self
    }
}

impl VolumeStatsProvider for StaticVolumes {
    fn stats(&self, mount: &Path) -> Result<VolumeStats> {
        self.volumes
            .get(mount)
            .copied()
            .ok_or_else(|| UsageError::VolumeUnavailable {
                path: mount.to_path_buf(),
                reason: "unknown volume".to_string(),
            })
    }
}
