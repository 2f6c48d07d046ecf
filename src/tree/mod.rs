pub mod arena;
pub mod metrics;
pub mod sample;

use std::path::Path;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use self::arena::{LayoutTree, NodeId, Side};
use crate::error::{Error, Result};

/// Externally supplied tree node. Any number of children may be present, but
/// only the first two take part in the layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResponseNode {
    pub child_count: Option<i32>,
    pub children: Option<Vec<ResponseNode>>,
    pub name: Option<CompactString>,
    pub level: Option<i32>,
    /// "Red", "Blue", or a `#RRGGBB` / `#AARRGGBB` hex string
    pub color: Option<CompactString>,
}

impl ResponseNode {
    /// A named node without children.
    pub fn leaf(name: impl Into<CompactString>) -> Self {
        ResponseNode {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// A named node with the given children.
    pub fn branch(name: impl Into<CompactString>, children: Vec<ResponseNode>) -> Self {
        ResponseNode {
            child_count: Some(children.len() as i32),
            children: Some(children),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: impl Into<CompactString>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Children as a slice; absent children read as empty.
    pub fn children(&self) -> &[ResponseNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// A node with absent or empty `children` is a leaf.
    pub fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }

    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Load a tree from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let node = serde_json::from_str(&text).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Loaded tree from {}", path.display());
        Ok(node)
    }
}

/// Build the binary layout tree for `root`.
///
/// The first child of every response node becomes `left`, the second `right`;
/// further children are ignored. Uses an explicit stack so deep inputs cannot
/// overflow the call stack.
pub fn build_tree(root: &ResponseNode) -> LayoutTree<'_> {
    let mut tree = LayoutTree::new(root);
    let mut pending: Vec<NodeId> = vec![tree.root];
    let mut ignored = 0usize;

    while let Some(id) = pending.pop() {
        let source = tree.get(id).source;
        let children = source.children();
        ignored += children.len().saturating_sub(2);

        let mut attached = [None, None];
        for (slot, (child, side)) in children
            .iter()
            .zip([Side::Left, Side::Right])
            .enumerate()
        {
            attached[slot] = Some(tree.attach(id, side, child));
        }
        // Push right before left so nodes are expanded in pre-order.
        pending.extend(attached.into_iter().rev().flatten());
    }

    if ignored > 0 {
        tracing::debug!(
            "Built layout tree with {} nodes, ignored {} children beyond the second",
            tree.len(),
            ignored
        );
    }

    tree
}
