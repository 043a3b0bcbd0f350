//! Package entries and the applications container that holds them.

use super::entry::{bytes_to_blocks, Entry, EntryId, EntryKind, EntryTree, PackageSizes};
use super::ordering::sort_children;
use crate::error::{Result, UsageError};
use crate::filter::AppFilter;

/// Name of the container holding scanned packages
pub const APPLICATIONS_NAME: &str = "Applications";

/// Add a detached package entry sized under `filter`.
pub fn add_package(
    tree: &mut EntryTree,
    name: String,
    sizes: PackageSizes,
    filter: &AppFilter,
) -> Result<EntryId> {
    let id = tree.leaf(Some(name), EntryKind::Package(sizes), 0);
    refilter_package(tree, id, filter)?;
    Ok(id)
}

/// Recompute a package entry's size (and component children) under `filter`.
/// The package keeps its identity and position in the tree.
pub fn refilter_package(tree: &mut EntryTree, id: EntryId, filter: &AppFilter) -> Result<()> {
    let sizes = match &tree.entry(id).kind {
        EntryKind::Package(sizes) => sizes.clone(),
        other => {
            return Err(UsageError::UnexpectedEntry {
                expected: "package",
                found: other.label(),
            })
        }
    };
    let block_size = tree.block_size();

    for child in tree.child_ids(id) {
        tree.remove(child);
    }

    if !filter.drill_down {
        return tree.resize_leaf(id, sizes.filtered_blocks(filter, block_size));
    }

    tree.resize_leaf(id, 0)?;
    for component in filter.components() {
        let blocks = bytes_to_blocks(sizes.bytes(component), block_size);
        if blocks == 0 {
            continue;
        }
        let leaf = tree.leaf(
            Some(component.label().to_string()),
            EntryKind::Component(component),
            blocks,
        );
        tree.attach(id, leaf)?;
    }
    sort_children(tree, id);

    Ok(())
}

/// Build a standalone tree rooted at a sorted "Applications" container.
pub fn applications_container<I>(packages: I, filter: &AppFilter, block_size: u64) -> Result<EntryTree>
where
    I: IntoIterator<Item = (String, PackageSizes)>,
{
    let mut tree = EntryTree::new(
        Entry::new(
            Some(APPLICATIONS_NAME.to_string()),
            EntryKind::Special { filter: *filter },
            0,
        ),
        block_size,
    );
    let root = tree.root();

    for (name, sizes) in packages {
        let id = add_package(&mut tree, name, sizes, filter)?;
        tree.attach(root, id)?;
    }
    sort_children(&mut tree, root);

    Ok(tree)
}
