//! Incremental rebuild of a tree when only the filter changes.

use std::sync::Arc;

use super::builder::TreeBuilder;
use super::entry::{EntryId, EntryKind, EntryTree};
use super::ordering::sort_children;
use super::package::refilter_package;
use crate::error::{Result, UsageError};
use crate::filter::AppFilter;
use crate::space::VolumeStatsProvider;

/// Wrapper levels between the root and the applications container
const MAX_WRAPPER_DEPTH: usize = 2;

/// Find the applications container by following first children down from
/// the root through the wrapper levels.
pub fn locate_applications(tree: &EntryTree) -> Result<EntryId> {
    let mut current = tree.root();

    for _ in 0..=MAX_WRAPPER_DEPTH {
        match &tree.entry(current).kind {
            EntryKind::Special { .. } => return Ok(current),
            EntryKind::Package(_) => {
                // Landed one level too deep: the container is the parent
                let parent = tree.parent(current).ok_or_else(|| {
                    UsageError::InconsistentTreeState("package entry without a parent".to_string())
                })?;
                return match &tree.entry(parent).kind {
                    EntryKind::Special { .. } => Ok(parent),
                    other => Err(UsageError::UnexpectedEntry {
                        expected: "special container",
                        found: other.label(),
                    }),
                };
            }
            EntryKind::Wrapper => {
                current = tree.first_child(current).ok_or_else(|| {
                    UsageError::InconsistentTreeState(
                        "wrapper without an applications container".to_string(),
                    )
                })?;
            }
            other => {
                return Err(UsageError::UnexpectedEntry {
                    expected: "special container",
                    found: other.label(),
                })
            }
        }
    }

    Err(UsageError::InconsistentTreeState(
        "applications container not found below the wrapper levels".to_string(),
    ))
}

/// Filter the applications in `tree` were last sized with.
pub fn applied_filter(tree: &EntryTree) -> Result<AppFilter> {
    let apps = locate_applications(tree)?;
    match &tree.entry(apps).kind {
        EntryKind::Special { filter } => Ok(*filter),
        other => Err(UsageError::UnexpectedEntry {
            expected: "special container",
            found: other.label(),
        }),
    }
}

/// Re-size every package under `new_filter` and rebuild the wrapper levels.
///
/// Returns `current` itself when `new_filter` is already applied. Otherwise
/// the snapshot in `current` is left untouched and a new tree is returned.
pub fn apply_filter<P: VolumeStatsProvider>(
    current: &Arc<EntryTree>,
    new_filter: &AppFilter,
    builder: &TreeBuilder<P>,
) -> Result<Arc<EntryTree>> {
    if applied_filter(current)? == *new_filter {
        tracing::debug!(?new_filter, "Filter already applied");
        return Ok(Arc::clone(current));
    }

    let mut tree = EntryTree::clone(current);
    let apps = locate_applications(&tree)?;
    let block_size = tree.block_size();
    let name = tree.entry(apps).name.clone();

    let packages = tree.child_ids(apps);
    for &package in &packages {
        refilter_package(&mut tree, package, new_filter)?;
    }

    let container = tree.branch(name, EntryKind::Special { filter: *new_filter }, &[])?;
    let old_root = tree.root();
    tree.set_root(container)?;
    for &package in &packages {
        tree.attach(container, package)?;
    }
    sort_children(&mut tree, container);
    tree.remove(old_root);

    tracing::debug!(packages = packages.len(), ?new_filter, "Re-filtered applications");

    let rebuilt = builder.build(tree, new_filter, block_size)?;
    Ok(Arc::new(rebuilt))
}
