use super::ResponseNode;

/// Index into the arena `Vec<LayoutNode>`. Uses u32 to save memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Which slot of the parent a child occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// A single node of the binary layout tree, stored in a flat arena.
#[derive(Debug, Clone)]
pub struct LayoutNode<'a> {
    /// The response node this layout node was built from (borrowed, not owned)
    pub source: &'a ResponseNode,
    /// First child of the source, if any
    pub left: Option<NodeId>,
    /// Second child of the source, if any
    pub right: Option<NodeId>,
    /// Depth in the tree (root = 0)
    pub depth: u16,
}

impl LayoutNode<'_> {
    /// True when the node has neither a left nor a right child.
    pub fn is_terminal(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// The binary layout tree stored as a flat arena of nodes.
///
/// Built fresh for every layout pass and dropped afterwards; it borrows the
/// response tree it was built from.
#[derive(Debug, Clone)]
pub struct LayoutTree<'a> {
    /// All nodes in contiguous memory
    pub nodes: Vec<LayoutNode<'a>>,
    /// Root node index
    pub root: NodeId,
}

impl<'a> LayoutTree<'a> {
    /// Create a tree holding only a root node.
    pub fn new(root_source: &'a ResponseNode) -> Self {
        LayoutTree {
            nodes: vec![LayoutNode {
                source: root_source,
                left: None,
                right: None,
                depth: 0,
            }],
            root: NodeId(0),
        }
    }

    /// Attach `source` as the `side` child of `parent`. Returns the new node's ID.
    /// An existing child on that side is detached and left unreachable.
    pub fn attach(&mut self, parent: NodeId, side: Side, source: &'a ResponseNode) -> NodeId {
        let new_id = NodeId(self.nodes.len() as u32);
        let depth = self.nodes[parent.index()].depth + 1;

        self.nodes.push(LayoutNode {
            source,
            left: None,
            right: None,
            depth,
        });

        let slot = &mut self.nodes[parent.index()];
        match side {
            Side::Left => slot.left = Some(new_id),
            Side::Right => slot.right = Some(new_id),
        }
        new_id
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> &LayoutNode<'a> {
        &self.nodes[id.index()]
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Pre-order walk (self, left subtree, right subtree) starting at `from`.
    /// Yields each node together with its depth relative to `from`.
    pub fn preorder(&self, from: NodeId) -> Preorder<'_, 'a> {
        Preorder {
            tree: self,
            stack: vec![(from, 0)],
        }
    }
}

/// Iterator behind [`LayoutTree::preorder`].
pub struct Preorder<'t, 'a> {
    tree: &'t LayoutTree<'a>,
    stack: Vec<(NodeId, usize)>,
}

impl Iterator for Preorder<'_, '_> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<(NodeId, usize)> {
        let (id, rel_depth) = self.stack.pop()?;
        let node = self.tree.get(id);
        // Right first so that left is popped first.
        if let Some(right) = node.right {
            self.stack.push((right, rel_depth + 1));
        }
        if let Some(left) = node.left {
            self.stack.push((left, rel_depth + 1));
        }
        Some((id, rel_depth))
    }
}
