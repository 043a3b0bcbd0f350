use indextree::{Arena, NodeId};
use serde::Serialize;

use crate::error::{Result, UsageError};
use crate::filter::{AppFilter, Component};

/// Index of an entry inside its [`EntryTree`].
pub type EntryId = NodeId;

/// Raw component sizes of one installed package, in bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageSizes {
    /// Package identifier (e.g. `org.example.app`)
    pub id: String,
    pub apk_bytes: u64,
    pub data_bytes: u64,
    pub cache_bytes: u64,
}

impl PackageSizes {
    pub fn bytes(&self, component: Component) -> u64 {
        match component {
            Component::Apk => self.apk_bytes,
            Component::Data => self.data_bytes,
            Component::Cache => self.cache_bytes,
        }
    }

    /// Size under `filter`, each selected component rounded up to whole blocks.
    pub fn filtered_blocks(&self, filter: &AppFilter, block_size: u64) -> u64 {
        filter
            .components()
            .map(|c| bytes_to_blocks(self.bytes(c), block_size))
            .sum()
    }
}

/// What an entry stands for. Structural role is the same for every kind;
/// only the origin of the size differs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Structural node: the unnamed root wrapper or a named container
    Wrapper,
    /// Container of scanned packages, tagged with the filter that sized them
    Special { filter: AppFilter },
    Package(PackageSizes),
    Component(Component),
    SystemSpace,
    FreeSpace,
}

impl EntryKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntryKind::Wrapper => "wrapper",
            EntryKind::Special { .. } => "special container",
            EntryKind::Package(_) => "package",
            EntryKind::Component(_) => "component",
            EntryKind::SystemSpace => "system space",
            EntryKind::FreeSpace => "free space",
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, EntryKind::SystemSpace | EntryKind::FreeSpace)
    }
}

/// One node of the size-accounting tree.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Display name (`None` for structural wrappers)
    pub name: Option<String>,

    /// Size in units of the tree's block size
    pub size_in_blocks: u64,

    pub kind: EntryKind,
}

impl Entry {
    pub fn new(name: Option<String>, kind: EntryKind, size_in_blocks: u64) -> Self {
        Self {
            name,
            size_in_blocks,
            kind,
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

/// Convert a byte count into whole blocks, rounding up.
pub fn bytes_to_blocks(bytes: u64, block_size: u64) -> u64 {
    if block_size == 0 {
        return bytes;
    }
    bytes.div_ceil(block_size)
}

/// Arena-backed entry tree.
///
/// Children are owned by the arena; the parent link is a [`NodeId`] index.
/// Every structural mutation goes through this type so that the
/// sum-of-children aggregate stays correct along the ancestor chain.
#[derive(Debug, Clone)]
pub struct EntryTree {
    arena: Arena<Entry>,
    root: EntryId,
    block_size: u64,
}

impl EntryTree {
    /// Create a tree whose root is `root`.
    pub fn new(root: Entry, block_size: u64) -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(root);
        Self {
            arena,
            root,
            block_size,
        }
    }

    pub fn root(&self) -> EntryId {
        self.root
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    pub fn set_block_size(&mut self, block_size: u64) {
        self.block_size = block_size;
    }

    pub fn entry(&self, id: EntryId) -> &Entry {
        self.arena[id].get()
    }

    pub fn entry_mut(&mut self, id: EntryId) -> &mut Entry {
        self.arena[id].get_mut()
    }

    pub fn parent(&self, id: EntryId) -> Option<EntryId> {
        self.arena[id].parent()
    }

    pub fn children(&self, id: EntryId) -> impl Iterator<Item = EntryId> + '_ {
        id.children(&self.arena)
    }

    pub fn child_ids(&self, id: EntryId) -> Vec<EntryId> {
        self.children(id).collect()
    }

    pub fn first_child(&self, id: EntryId) -> Option<EntryId> {
        self.arena[id].first_child()
    }

    pub fn is_leaf(&self, id: EntryId) -> bool {
        self.first_child(id).is_none()
    }

    pub fn total_blocks(&self) -> u64 {
        self.entry(self.root).size_in_blocks
    }

    pub fn size_bytes(&self, id: EntryId) -> u64 {
        self.entry(id).size_in_blocks.saturating_mul(self.block_size.max(1))
    }

    /// Number of entries reachable from the root, the root included.
    pub fn entry_count(&self) -> usize {
        self.root.descendants(&self.arena).count()
    }

    /// Add a detached leaf with an explicit size.
    pub fn leaf(&mut self, name: Option<String>, kind: EntryKind, size_in_blocks: u64) -> EntryId {
        self.arena.new_node(Entry::new(name, kind, size_in_blocks))
    }

    /// Add a detached branch whose size is the sum of `children`.
    pub fn branch(
        &mut self,
        name: Option<String>,
        kind: EntryKind,
        children: &[EntryId],
    ) -> Result<EntryId> {
        let id = self.arena.new_node(Entry::new(name, kind, 0));
        for &child in children {
            self.attach(id, child)?;
        }
        Ok(id)
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first. Ancestor sizes on both sides are updated.
    pub fn attach(&mut self, parent: EntryId, child: EntryId) -> Result<()> {
        if child == self.root {
            return Err(UsageError::InconsistentTreeState(
                "cannot attach the root below another entry".to_string(),
            ));
        }
        self.detach(child);

        parent
            .checked_append(child, &mut self.arena)
            .map_err(|e| UsageError::InconsistentTreeState(e.to_string()))?;

        let size = self.entry(child).size_in_blocks;
        self.grow_from(parent, size);
        Ok(())
    }

    /// Detach `id` from its parent, keeping it (and its subtree) in the arena.
    pub fn detach(&mut self, id: EntryId) {
        if let Some(old_parent) = self.parent(id) {
            let size = self.entry(id).size_in_blocks;
            self.shrink_from(old_parent, size);
            id.detach(&mut self.arena);
        }
    }

    /// Detach and drop `id` together with all its descendants.
    pub fn remove(&mut self, id: EntryId) {
        self.detach(id);
        id.remove_subtree(&mut self.arena);
    }

    /// Make a parentless entry the new root.
    pub fn set_root(&mut self, id: EntryId) -> Result<()> {
        if self.parent(id).is_some() {
            return Err(UsageError::InconsistentTreeState(
                "root entry must not have a parent".to_string(),
            ));
        }
        self.root = id;
        Ok(())
    }

    /// Change the size of a leaf and propagate the difference upward.
    pub fn resize_leaf(&mut self, id: EntryId, size_in_blocks: u64) -> Result<()> {
        if !self.is_leaf(id) {
            return Err(UsageError::InconsistentTreeState(format!(
                "cannot set an explicit size on non-leaf {}",
                self.entry(id).kind.label()
            )));
        }
        let old = self.entry(id).size_in_blocks;
        self.entry_mut(id).size_in_blocks = size_in_blocks;
        if let Some(parent) = self.parent(id) {
            if size_in_blocks >= old {
                self.grow_from(parent, size_in_blocks - old);
            } else {
                self.shrink_from(parent, old - size_in_blocks);
            }
        }
        Ok(())
    }

    /// Reorder the children of `parent` with `compare`. Sizes are unaffected.
    pub fn sort_children_by<F>(&mut self, parent: EntryId, mut compare: F)
    where
        F: FnMut(&Entry, &Entry) -> std::cmp::Ordering,
    {
        let mut children = self.child_ids(parent);
        children.sort_by(|a, b| compare(self.arena[*a].get(), self.arena[*b].get()));
        for child in children {
            child.detach(&mut self.arena);
            parent.append(child, &mut self.arena);
        }
    }

    /// Check the aggregation invariant and that no entry is orphaned.
    pub fn validate(&self) -> Result<()> {
        if self.parent(self.root).is_some() {
            return Err(UsageError::InconsistentTreeState(
                "root entry has a parent".to_string(),
            ));
        }

        for id in self.root.descendants(&self.arena) {
            if self.is_leaf(id) {
                continue;
            }
            let entry = self.entry(id);
            let sum: u64 = self
                .children(id)
                .map(|c| self.entry(c).size_in_blocks)
                .sum();
            if sum != entry.size_in_blocks {
                return Err(UsageError::InconsistentTreeState(format!(
                    "{} '{}' has size {} but its children sum to {}",
                    entry.kind.label(),
                    entry.display_name(),
                    entry.size_in_blocks,
                    sum
                )));
            }
        }

        let live = self.arena.iter().filter(|n| !n.is_removed()).count();
        let reachable = self.entry_count();
        if live != reachable {
            return Err(UsageError::InconsistentTreeState(format!(
                "{} entries are not reachable from the root",
                live.saturating_sub(reachable)
            )));
        }

        Ok(())
    }

    fn grow_from(&mut self, start: EntryId, blocks: u64) {
        let chain: Vec<EntryId> = start.ancestors(&self.arena).collect();
        for id in chain {
            let entry = self.arena[id].get_mut();
            entry.size_in_blocks = entry.size_in_blocks.saturating_add(blocks);
        }
    }

    fn shrink_from(&mut self, start: EntryId, blocks: u64) {
        let chain: Vec<EntryId> = start.ancestors(&self.arena).collect();
        for id in chain {
            let entry = self.arena[id].get_mut();
            entry.size_in_blocks = entry.size_in_blocks.saturating_sub(blocks);
        }
    }
}
