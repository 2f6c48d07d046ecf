use super::arena::{LayoutTree, NodeId};
use super::ResponseNode;

/// Number of terminal nodes under `node` (0 for an absent node, 1 for a
/// node without children). Proportions horizontal space between siblings.
pub fn leaf_count(tree: &LayoutTree<'_>, node: Option<NodeId>) -> usize {
    match node {
        None => 0,
        Some(id) => tree
            .preorder(id)
            .filter(|&(n, _)| tree.get(n).is_terminal())
            .count(),
    }
}

/// Height of the response tree: a node without children counts 1, every
/// other node is one more than its deepest child. Purely structural: the
/// `level` hint carried by response nodes is deliberately ignored, even when
/// it is larger than the deepest child and would otherwise raise the height.
pub fn max_depth(response: &ResponseNode) -> u32 {
    response
        .children()
        .iter()
        .map(max_depth)
        .max()
        .unwrap_or(0)
        + 1
}

/// True when the node's source has no children.
pub fn is_last_level(tree: &LayoutTree<'_>, id: NodeId) -> bool {
    tree.get(id).source.is_leaf()
}

/// Second-to-last row test used to compact the lower rows of the drawing.
///
/// Walks the subtree of `id` in pre-order, collecting every node whose depth
/// relative to `id` equals `id`'s own absolute depth, then checks whether
/// `id` sits at index `len - 2` of that collection. A node absent from the
/// collection has index -1, so for any non-root node the test holds exactly
/// when the collection has a single entry.
pub fn is_penultimate(tree: &LayoutTree<'_>, id: NodeId) -> bool {
    let depth = tree.get(id).depth as usize;
    let row: Vec<NodeId> = tree
        .preorder(id)
        .filter(|&(_, rel)| rel == depth)
        .map(|(n, _)| n)
        .collect();

    let index = row
        .iter()
        .position(|&n| n == id)
        .map(|i| i as isize)
        .unwrap_or(-1);
    index == row.len() as isize - 2
}
