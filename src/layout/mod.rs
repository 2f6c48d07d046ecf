pub mod dendrogram;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::render::colors::Rgba;
use crate::tree::{self, metrics, ResponseNode};

pub use dendrogram::layout;

/// A position in dendrogram (world) space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Horizontal,
    Vertical,
}

/// One drawing instruction produced by the layout engine, in traversal order.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Half of an elbow connector from a parent toward a child.
    Line {
        from: Point,
        to: Point,
        kind: SegmentKind,
        /// Depth of the child the segment leads to
        depth: u16,
    },
    /// Text placed under a leaf.
    Label {
        text: CompactString,
        /// The leaf position the label belongs to
        anchor: Point,
        /// Top-left corner of the text box, horizontally centered on `anchor`
        top_left: Point,
        /// Measured text box
        size: Size,
        color: Rgba,
        depth: u16,
    },
}

impl DrawCommand {
    pub fn is_line(&self) -> bool {
        matches!(self, DrawCommand::Line { .. })
    }

    pub fn is_label(&self) -> bool {
        matches!(self, DrawCommand::Label { .. })
    }
}

/// Configuration for dendrogram layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Distance units per level (vertical step and per-leaf horizontal spacing)
    pub step: f32,
    /// Extra offset reserved for the leaf row, used when centering vertically
    pub leaf_step: f32,
    /// Label font size in world units
    pub font_size: f32,
    /// Skip labels whose box lies entirely outside the canvas
    pub clip_labels: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            step: 20.0,
            leaf_step: 10.0,
            font_size: 10.0,
            clip_labels: true,
        }
    }
}

/// Measures rendered text so labels can be centered.
pub trait TextMeasure {
    /// Returns (width, height) of `text` at `font_size`.
    fn measure(&mut self, text: &str, font_size: f32) -> Size;
}

/// Font-free estimate: 0.58 em per character, 1.2 em line height.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxMeasure;

impl TextMeasure for ApproxMeasure {
    fn measure(&mut self, text: &str, font_size: f32) -> Size {
        let chars = text.chars().count() as f32;
        Size::new(chars * font_size * 0.58, font_size * 1.2)
    }
}

/// The full layout result for one response tree and canvas.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub commands: Vec<DrawCommand>,
    /// Height of the response tree (0 when there is no tree)
    pub max_depth: u32,
    pub leaf_count: usize,
    /// Where the root was placed
    pub origin: Point,
    pub canvas: Size,
}

impl Layout {
    pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter(|c| c.is_line())
    }

    pub fn labels(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter(|c| c.is_label())
    }

    /// Horizontal extent used to fit the dendrogram into a viewport,
    /// including `padding` on both sides.
    pub fn fit_width(&self, config: &LayoutConfig, padding: f32) -> f32 {
        (self.leaf_count as f32 * config.step + config.leaf_step * 2.0 + padding * 2.0) * 2.0
    }
}

/// Root placement for a tree of height `max_depth` on `canvas`: horizontally
/// centered, vertically centered on the drawing's nominal height.
pub fn origin_for(max_depth: u32, canvas: Size, config: &LayoutConfig) -> Point {
    Point::new(
        canvas.width / 2.0,
        canvas.height / 2.0 - (max_depth as f32 * config.step + config.leaf_step) / 2.0,
    )
}

/// Compute the draw commands for `response` on a canvas of the given size.
/// An absent tree yields an empty layout.
pub fn compute_layout(
    response: Option<&ResponseNode>,
    canvas: Size,
    config: &LayoutConfig,
    measure: &mut dyn TextMeasure,
) -> Layout {
    let Some(response) = response else {
        return Layout {
            canvas,
            ..Default::default()
        };
    };

    let tree = tree::build_tree(response);
    let max_depth = metrics::max_depth(response);
    let origin = origin_for(max_depth, canvas, config);

    let commands = layout(
        &tree,
        Some(tree.root),
        max_depth as i32,
        origin,
        canvas,
        config,
        measure,
    );

    let layout = Layout {
        leaf_count: metrics::leaf_count(&tree, Some(tree.root)),
        commands,
        max_depth,
        origin,
        canvas,
    };

    tracing::debug!(
        "Layout computed: {} nodes, {} leaves, depth {}, {} commands on {:.0}x{:.0}",
        tree.len(),
        layout.leaf_count,
        max_depth,
        layout.commands.len(),
        canvas.width,
        canvas.height
    );

    layout
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tree_has_no_commands() {
        let layout = compute_layout(
            None,
            Size::new(300.0, 300.0),
            &LayoutConfig::default(),
            &mut ApproxMeasure,
        );
        assert!(layout.commands.is_empty());
        assert_eq!(layout.max_depth, 0);
    }

    #[test]
    fn single_unnamed_leaf_yields_one_label() {
        let layout = compute_layout(
            Some(&ResponseNode::default()),
            Size::new(400.0, 400.0),
            &LayoutConfig::default(),
            &mut ApproxMeasure,
        );
        assert_eq!(layout.lines().count(), 0);
        assert_eq!(layout.labels().count(), 1);
    }

    #[test]
    fn origin_centers_nominal_height() {
        let config = LayoutConfig::default();
        let origin = origin_for(3, Size::new(400.0, 300.0), &config);
        assert_eq!(origin, Point::new(200.0, 150.0 - (60.0 + 10.0) / 2.0));
    }

    #[test]
    fn two_leaf_scenario_places_labels_on_both_sides() {
        let root = ResponseNode::branch(
            "root",
            vec![ResponseNode::leaf("L"), ResponseNode::leaf("R")],
        );
        let config = LayoutConfig::default();
        let layout = compute_layout(
            Some(&root),
            Size::new(200.0, 200.0),
            &config,
            &mut ApproxMeasure,
        );

        assert_eq!(layout.max_depth, 2);
        assert_eq!(layout.leaf_count, 2);
        assert_eq!(layout.lines().count(), 4);
        assert_eq!(layout.labels().count(), 2);

        let origin = layout.origin;
        assert_eq!(origin, Point::new(100.0, 75.0));

        let anchors: Vec<Point> = layout
            .labels()
            .map(|c| match c {
                DrawCommand::Label { anchor, .. } => *anchor,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(anchors[0], Point::new(origin.x - config.step * 0.5, 115.0));
        assert_eq!(anchors[1], Point::new(origin.x + config.step, 115.0));
    }

    #[test]
    fn fit_width_matches_leaf_spacing() {
        let layout = Layout {
            leaf_count: 4,
            ..Default::default()
        };
        let config = LayoutConfig::default();
        assert_eq!(layout.fit_width(&config, 16.0), (80.0 + 20.0 + 32.0) * 2.0);
    }
}
