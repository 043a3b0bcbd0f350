pub mod package;
pub mod session;
pub mod store;

pub use package::{applications_from_records, ManifestSource, PackageRecord, PackageSource};
pub use session::{AppUsage, FilterUpdate, FALLBACK_BLOCK_SIZE};
pub use store::{FilterStore, TomlFilterStore};
