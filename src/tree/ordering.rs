use std::cmp::Ordering;

use super::entry::{Entry, EntryId, EntryKind, EntryTree};

/// Sibling order: larger entries first, ties broken by name, then by
/// package id so that packages sharing a label keep a stable order.
pub fn compare_entries(a: &Entry, b: &Entry) -> Ordering {
    b.size_in_blocks
        .cmp(&a.size_in_blocks)
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| package_id(a).cmp(&package_id(b)))
}

fn package_id(entry: &Entry) -> Option<&str> {
    match &entry.kind {
        EntryKind::Package(sizes) => Some(sizes.id.as_str()),
        _ => None,
    }
}

/// Sort the children of `parent` in place.
pub fn sort_children(tree: &mut EntryTree, parent: EntryId) {
    tree.sort_children_by(parent, compare_entries);
}

/// True when the children of `parent` are in sibling order.
pub fn is_sorted(tree: &EntryTree, parent: EntryId) -> bool {
    let children = tree.child_ids(parent);
    children.windows(2).all(|pair| {
        compare_entries(tree.entry(pair[0]), tree.entry(pair[1])) != Ordering::Greater
    })
}
