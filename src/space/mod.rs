pub mod accountant;
pub mod volume;

pub use accountant::{SpaceAccountant, SpaceStats};
pub use volume::{mount_points, StaticVolumes, StatvfsProvider, VolumeStats, VolumeStatsProvider};
