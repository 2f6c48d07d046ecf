//! Property-based tests for tree metrics and the dendrogram layout.
//!
//! Trees are generated with at most two children per node so every response
//! node is part of the laid-out binary tree.

use dendroview_rs::layout::{compute_layout, ApproxMeasure, LayoutConfig, Size};
use dendroview_rs::tree::metrics::{leaf_count, max_depth};
use dendroview_rs::tree::{build_tree, ResponseNode};
use proptest::prelude::*;

fn arb_tree() -> impl Strategy<Value = ResponseNode> {
    let leaf = (0u32..100).prop_map(|n| ResponseNode::leaf(n.to_string()));
    leaf.prop_recursive(6, 64, 2, |inner| {
        prop::collection::vec(inner, 1..=2)
            .prop_map(|children| ResponseNode::branch("node", children))
    })
}

fn node_count(response: &ResponseNode) -> usize {
    1 + response.children().iter().map(node_count).sum::<usize>()
}

const CANVAS: Size = Size::new(1024.0, 768.0);

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn leaf_count_is_additive(response in arb_tree()) {
        let tree = build_tree(&response);
        for (i, node) in tree.nodes.iter().enumerate() {
            let id = dendroview_rs::tree::arena::NodeId(i as u32);
            let total = leaf_count(&tree, Some(id));
            if node.is_terminal() {
                prop_assert_eq!(total, 1);
            } else {
                prop_assert_eq!(total, leaf_count(&tree, node.left) + leaf_count(&tree, node.right));
            }
        }
        prop_assert_eq!(leaf_count(&tree, None), 0);
    }

    #[test]
    fn max_depth_is_one_more_than_deepest_child(response in arb_tree()) {
        let depth = max_depth(&response);
        prop_assert!(depth >= 1);
        let deepest = response.children().iter().map(max_depth).max().unwrap_or(0);
        prop_assert_eq!(depth, deepest + 1);
    }

    #[test]
    fn layout_is_deterministic(response in arb_tree()) {
        let config = LayoutConfig::default();
        let first = compute_layout(Some(&response), CANVAS, &config, &mut ApproxMeasure);
        let second = compute_layout(Some(&response), CANVAS, &config, &mut ApproxMeasure);
        prop_assert_eq!(first.commands, second.commands);
    }

    #[test]
    fn every_edge_is_one_elbow(response in arb_tree()) {
        let config = LayoutConfig::default();
        let layout = compute_layout(Some(&response), CANVAS, &config, &mut ApproxMeasure);
        prop_assert_eq!(layout.lines().count(), 2 * (node_count(&response) - 1));
    }

    #[test]
    fn unclipped_layout_labels_every_leaf(response in arb_tree()) {
        let config = LayoutConfig {
            clip_labels: false,
            ..LayoutConfig::default()
        };
        let layout = compute_layout(Some(&response), CANVAS, &config, &mut ApproxMeasure);
        prop_assert_eq!(layout.labels().count(), layout.leaf_count);

        let clipped = compute_layout(Some(&response), CANVAS, &LayoutConfig::default(), &mut ApproxMeasure);
        prop_assert!(clipped.labels().count() <= layout.leaf_count);
    }
}
