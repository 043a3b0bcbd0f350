mod builder;
mod entry;
mod ordering;
mod package;
mod refilter;

pub use builder::{
    SpaceTotals, TreeBuilder, DEFAULT_CACHE_MOUNT, DEFAULT_DATA_MOUNT, FREE_SPACE_NAME,
    SYSTEM_SPACE_NAME,
};
pub use entry::{bytes_to_blocks, Entry, EntryId, EntryKind, EntryTree, PackageSizes};
pub use ordering::{compare_entries, is_sorted, sort_children};
pub use package::{add_package, applications_container, refilter_package, APPLICATIONS_NAME};
pub use refilter::{applied_filter, apply_filter, locate_applications};
