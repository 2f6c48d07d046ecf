use compact_str::CompactString;

use super::{DrawCommand, LayoutConfig, Point, SegmentKind, Size, TextMeasure};
use crate::render::colors::resolve_node_color;
use crate::tree::arena::{LayoutTree, NodeId};
use crate::tree::metrics::{is_last_level, is_penultimate, leaf_count};

/// Label text for a leaf without a name.
pub const UNNAMED_LEAF: &str = "0";

/// Lay out the subtree at `root`, placing it at `origin`.
///
/// `level` is the number of rows still available below `origin`; the
/// top-level call passes the tree height. Commands come out in pre-order:
/// left elbow, left subtree, right elbow, right subtree, then the label of the
/// node itself when it is a leaf. Pure: the same inputs always produce the
/// same commands.
pub fn layout(
    tree: &LayoutTree<'_>,
    root: Option<NodeId>,
    level: i32,
    origin: Point,
    canvas: Size,
    config: &LayoutConfig,
    measure: &mut dyn TextMeasure,
) -> Vec<DrawCommand> {
    let mut walker = Walker {
        tree,
        config,
        canvas,
        measure,
        commands: Vec::with_capacity(tree.len() * 2),
    };
    if let Some(root) = root {
        walker.visit(root, level, origin);
    }
    walker.commands
}

struct Walker<'t, 'a, 'm> {
    tree: &'t LayoutTree<'a>,
    config: &'t LayoutConfig,
    canvas: Size,
    measure: &'m mut dyn TextMeasure,
    commands: Vec<DrawCommand>,
}

impl Walker<'_, '_, '_> {
    fn visit(&mut self, id: NodeId, level: i32, at: Point) {
        let tree = self.tree;
        let node = tree.get(id);
        let step = self.config.step;

        if let Some(left) = node.left {
            let right_leaves = leaf_count(tree, node.right) as f32;
            // A leaf child sits half a step further in so the last elbow is centered.
            let dx = if is_last_level(tree, left) {
                (right_leaves - 0.5) * step
            } else {
                right_leaves * step
            };
            let child = Point::new(at.x - dx, self.child_y(left, level, at.y));
            self.elbow(at, child, tree.get(left).depth);
            self.visit(left, level - 1, child);
        }

        if let Some(right) = node.right {
            let dx = leaf_count(tree, node.left) as f32 * step;
            let child = Point::new(at.x + dx, self.child_y(right, level, at.y));
            self.elbow(at, child, tree.get(right).depth);
            self.visit(right, level - 1, child);
        }

        if is_last_level(tree, id) {
            self.label(id, at);
        }
    }

    /// Leaves and penultimate nodes drop all remaining rows at once; every
    /// other child descends a single step.
    fn child_y(&self, child: NodeId, level: i32, y: f32) -> f32 {
        if is_last_level(self.tree, child) || is_penultimate(self.tree, child) {
            y + level as f32 * self.config.step
        } else {
            y + self.config.step
        }
    }

    fn elbow(&mut self, from: Point, to: Point, depth: u16) {
        let corner = Point::new(to.x, from.y);
        self.commands.push(DrawCommand::Line {
            from,
            to: corner,
            kind: SegmentKind::Horizontal,
            depth,
        });
        self.commands.push(DrawCommand::Line {
            from: corner,
            to,
            kind: SegmentKind::Vertical,
            depth,
        });
    }

    fn label(&mut self, id: NodeId, anchor: Point) {
        let tree = self.tree;
        let node = tree.get(id);
        let text = node
            .source
            .name
            .clone()
            .unwrap_or_else(|| CompactString::const_new(UNNAMED_LEAF));

        let size = self.measure.measure(&text, self.config.font_size);
        let top_left = Point::new(anchor.x - size.width / 2.0, anchor.y);

        if self.config.clip_labels && !overlaps_canvas(top_left, size, self.canvas) {
            tracing::trace!(
                "Skipping off-canvas label '{}' at ({:.1}, {:.1})",
                text,
                top_left.x,
                top_left.y
            );
            return;
        }

        self.commands.push(DrawCommand::Label {
            text,
            anchor,
            top_left,
            size,
            color: resolve_node_color(node.source.color.as_deref(), node.depth),
            depth: node.depth,
        });
    }
}

fn overlaps_canvas(top_left: Point, size: Size, canvas: Size) -> bool {
    top_left.x < canvas.width
        && top_left.x + size.width > 0.0
        && top_left.y < canvas.height
        && top_left.y + size.height > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ApproxMeasure;
    use crate::tree::arena::Side;
    use crate::tree::{build_tree, ResponseNode};

    const CANVAS: Size = Size::new(400.0, 400.0);

    fn run(tree: &LayoutTree<'_>, level: i32, at: Point) -> Vec<DrawCommand> {
        layout(
            tree,
            Some(tree.root),
            level,
            at,
            CANVAS,
            &LayoutConfig::default(),
            &mut ApproxMeasure,
        )
    }

    fn segments(commands: &[DrawCommand]) -> Vec<(Point, Point)> {
        commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Line { from, to, .. } => Some((*from, *to)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn single_leaf_yields_one_label_at_origin() {
        let leaf = ResponseNode::leaf("solo");
        let tree = build_tree(&leaf);
        let at = Point::new(200.0, 190.0);
        let commands = run(&tree, 1, at);

        assert_eq!(commands.len(), 1);
        match &commands[0] {
            DrawCommand::Label {
                text,
                anchor,
                top_left,
                size,
                ..
            } => {
                assert_eq!(text.as_str(), "solo");
                assert_eq!(*anchor, at);
                assert_eq!(top_left.x, at.x - size.width / 2.0);
                assert_eq!(top_left.y, at.y);
            }
            other => panic!("expected label, got {other:?}"),
        }
    }

    #[test]
    fn two_leaves_form_two_elbows() {
        let root = ResponseNode::branch("r", vec![ResponseNode::leaf("a"), ResponseNode::leaf("b")]);
        let tree = build_tree(&root);
        let at = Point::new(100.0, 75.0);
        let commands = run(&tree, 2, at);

        assert_eq!(
            segments(&commands),
            vec![
                (at, Point::new(90.0, 75.0)),
                (Point::new(90.0, 75.0), Point::new(90.0, 115.0)),
                (at, Point::new(120.0, 75.0)),
                (Point::new(120.0, 75.0), Point::new(120.0, 115.0)),
            ]
        );
        // Each leaf label follows the elbow that reaches it.
        assert!(commands[2].is_label());
        assert!(commands[5].is_label());
    }

    #[test]
    fn interior_children_descend_one_step() {
        // Both children have two leaves, so neither is penultimate.
        let root = ResponseNode::branch(
            "r",
            vec![
                ResponseNode::branch("a", vec![ResponseNode::leaf("1"), ResponseNode::leaf("2")]),
                ResponseNode::branch("b", vec![ResponseNode::leaf("3"), ResponseNode::leaf("4")]),
            ],
        );
        let tree = build_tree(&root);
        let at = Point::new(200.0, 100.0);
        let segs = segments(&run(&tree, 3, at));

        // Left child shifts by the right subtree's two leaves.
        assert_eq!(segs[0], (at, Point::new(160.0, 100.0)));
        assert_eq!(segs[1].1, Point::new(160.0, 120.0));
        // Its leaves drop the remaining two rows.
        assert_eq!(segs[3].1, Point::new(160.0 - 10.0, 160.0));
        assert_eq!(segs[5].1, Point::new(180.0, 160.0));
        // Right child shifts by the left subtree's two leaves.
        assert_eq!(segs[6], (at, Point::new(240.0, 100.0)));
    }

    #[test]
    fn penultimate_child_drops_remaining_rows() {
        let root = ResponseNode::branch(
            "r",
            vec![ResponseNode::branch("a", vec![ResponseNode::leaf("1")])],
        );
        let tree = build_tree(&root);
        let at = Point::new(200.0, 100.0);
        let segs = segments(&run(&tree, 3, at));
        assert_eq!(segs[1].1, Point::new(200.0, 100.0 + 3.0 * 20.0));
    }

    #[test]
    fn right_only_child_sits_directly_below() {
        let r = ResponseNode::branch("r", vec![ResponseNode::leaf("only")]);
        let only = ResponseNode::leaf("only");
        let mut tree = LayoutTree::new(&r);
        tree.attach(tree.root, Side::Right, &only);

        let at = Point::new(200.0, 100.0);
        let commands = run(&tree, 2, at);
        let segs = segments(&commands);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0], (at, at));
        assert_eq!(segs[1].1, Point::new(200.0, 140.0));
    }

    #[test]
    fn off_canvas_labels_are_skipped() {
        let root = ResponseNode::branch("r", vec![ResponseNode::leaf("a"), ResponseNode::leaf("b")]);
        let tree = build_tree(&root);
        let config = LayoutConfig::default();

        let far = Point::new(-500.0, 100.0);
        let commands = layout(&tree, Some(tree.root), 2, far, CANVAS, &config, &mut ApproxMeasure);
        assert_eq!(commands.iter().filter(|c| c.is_line()).count(), 4);
        assert_eq!(commands.iter().filter(|c| c.is_label()).count(), 0);

        let unclipped = LayoutConfig {
            clip_labels: false,
            ..config
        };
        let commands = layout(&tree, Some(tree.root), 2, far, CANVAS, &unclipped, &mut ApproxMeasure);
        assert_eq!(commands.iter().filter(|c| c.is_label()).count(), 2);
    }

    #[test]
    fn absent_root_emits_nothing() {
        let leaf = ResponseNode::leaf("x");
        let tree = build_tree(&leaf);
        let config = LayoutConfig::default();
        assert!(layout(&tree, None, 1, Point::default(), CANVAS, &config, &mut ApproxMeasure).is_empty());
    }

    #[test]
    fn nameless_leaf_gets_placeholder_label() {
        let nameless = ResponseNode::default();
        let tree = build_tree(&nameless);
        let commands = run(&tree, 1, Point::new(200.0, 200.0));

        assert_eq!(commands.len(), 1);
        match &commands[0] {
            DrawCommand::Label { text, .. } => assert_eq!(text.as_str(), UNNAMED_LEAF),
            other => panic!("expected label, got {other:?}"),
        }

        // An empty name is kept as given.
        let empty = ResponseNode::leaf("");
        let tree = build_tree(&empty);
        assert_eq!(run(&tree, 1, Point::new(200.0, 200.0)).iter().filter(|c| c.is_label()).count(), 1);
    }

    #[test]
    fn repeated_layout_is_identical() {
        let root = crate::tree::sample::seeded_binary_tree(4, 3);
        let tree = build_tree(&root);
        let at = Point::new(200.0, 50.0);
        assert_eq!(run(&tree, 5, at), run(&tree, 5, at));
    }
}
