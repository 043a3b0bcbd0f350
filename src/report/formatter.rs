use serde::Serialize;

use crate::error::Result;
use crate::filter::Component;
use crate::tree::{EntryId, EntryKind, EntryTree};

/// Format options for tree output
#[derive(Debug, Clone)]
pub struct FormatOptions {
    /// Maximum depth to display
    pub max_depth: Option<usize>,
    /// Show only top N entries per container
    pub top_n: Option<usize>,
    /// Show share of the parent's size
    pub show_percent: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            max_depth: Some(4),
            top_n: Some(20),
            show_percent: false,
        }
    }
}

impl FormatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_top_n(mut self, n: usize) -> Self {
        self.top_n = Some(n);
        self
    }

    pub fn with_percent(mut self, show: bool) -> Self {
        self.show_percent = show;
        self
    }

    pub fn unlimited() -> Self {
        Self {
            max_depth: None,
            top_n: None,
            show_percent: false,
        }
    }
}

/// Human-readable byte count
pub fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

fn entry_label(tree: &EntryTree, id: EntryId) -> String {
    let entry = tree.entry(id);
    match (&entry.name, &entry.kind) {
        (Some(name), EntryKind::Package(sizes)) if *name != sizes.id => {
            format!("{} ({})", name, sizes.id)
        }
        (Some(name), _) => name.clone(),
        (None, _) => "(total)".to_string(),
    }
}

/// Format a tree with box-drawing connectors
pub fn format_tree(tree: &EntryTree, options: &FormatOptions) -> String {
    let mut output = String::new();
    format_tree_recursive(tree, tree.root(), &mut output, "", true, 0, options);
    output
}

fn format_tree_recursive(
    tree: &EntryTree,
    id: EntryId,
    output: &mut String,
    prefix: &str,
    is_last: bool,
    depth: usize,
    options: &FormatOptions,
) {
    if let Some(max_depth) = options.max_depth {
        if depth > max_depth {
            return;
        }
    }

    let connector = if depth == 0 {
        ""
    } else if is_last {
        "└── "
    } else {
        "├── "
    };

    let size = tree.size_bytes(id);
    let percent = match tree.parent(id) {
        Some(parent) if options.show_percent => {
            let parent_size = tree.size_bytes(parent);
            if parent_size > 0 {
                format!(" {:>5.1}%", size as f64 / parent_size as f64 * 100.0)
            } else {
                String::new()
            }
        }
        _ => String::new(),
    };

    output.push_str(&format!(
        "{}{}{:>10}{}  {}\n",
        prefix,
        connector,
        format_size(size),
        percent,
        entry_label(tree, id)
    ));

    let children = tree.child_ids(id);
    if children.is_empty() {
        return;
    }

    let new_prefix = if depth == 0 {
        String::new()
    } else if is_last {
        format!("{}    ", prefix)
    } else {
        format!("{}│   ", prefix)
    };

    let shown = options.top_n.map_or(children.len(), |n| n.min(children.len()));
    let has_more = shown < children.len();

    for (i, child) in children.iter().take(shown).enumerate() {
        let is_last_child = i + 1 == shown && !has_more;
        format_tree_recursive(tree, *child, output, &new_prefix, is_last_child, depth + 1, options);
    }

    if has_more {
        output.push_str(&format!(
            "{}└── ... and {} more entries\n",
            new_prefix,
            children.len() - shown
        ));
    }
}

/// Serializable view of one entry and its descendants.
#[derive(Debug, Clone, Serialize)]
pub struct EntryReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<Component>,
    pub size_blocks: u64,
    pub size_bytes: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<EntryReport>,
}

impl EntryReport {
    pub fn from_tree(tree: &EntryTree) -> Self {
        Self::from_entry(tree, tree.root())
    }

    fn from_entry(tree: &EntryTree, id: EntryId) -> Self {
        let entry = tree.entry(id);
        let (package_id, component) = match &entry.kind {
            EntryKind::Package(sizes) => (Some(sizes.id.clone()), None),
            EntryKind::Component(component) => (None, Some(*component)),
            _ => (None, None),
        };

        Self {
            name: entry.name.clone(),
            kind: entry.kind.label(),
            package_id,
            component,
            size_blocks: entry.size_in_blocks,
            size_bytes: tree.size_bytes(id),
            children: tree
                .children(id)
                .map(|child| Self::from_entry(tree, child))
                .collect(),
        }
    }
}

/// Format a tree as JSON
pub fn format_json(tree: &EntryTree, pretty: bool) -> Result<String> {
    let report = EntryReport::from_tree(tree);
    let json = if pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    Ok(json)
}
