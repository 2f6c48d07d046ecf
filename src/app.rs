use vello::Scene;

use crate::config::ViewerConfig;
use crate::layout::{self, Layout, Size};
use crate::render::scene::build_scene;
use crate::render::text::{TextRenderer, DEFAULT_FONT};
use crate::render::RenderStyle;
use crate::tree::sample::seeded_binary_tree;
use crate::tree::ResponseNode;
use crate::ui::input::{InputAction, MouseState};
use crate::ui::viewport::{ViewportEvent, ViewportTransform};

/// Where the displayed tree came from, so it can be regenerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleSource {
    pub levels: u32,
    pub seed: u64,
}

/// Top-level viewer state.
pub struct App {
    pub config: ViewerConfig,
    pub style: RenderStyle,

    // Data
    pub tree: Option<ResponseNode>,
    pub sample: Option<SampleSource>,
    pub layout: Option<Layout>,
    pub text_renderer: TextRenderer,

    // UI state
    pub viewport: ViewportTransform,
    pub mouse: MouseState,
    on_tap: Option<Box<dyn FnMut()>>,

    // Rendering
    pub scene: Scene,
    pub needs_relayout: bool,
    /// Fit the next layout to the viewport width
    pub needs_fit: bool,
}

impl App {
    pub fn new(config: ViewerConfig, viewport: Size) -> Self {
        let mut text_renderer = TextRenderer::new();
        let loaded = match &config.render.font_path {
            Some(path) => text_renderer.load_font_from_path(DEFAULT_FONT, path),
            None => text_renderer.load_system_font(DEFAULT_FONT),
        };
        if let Err(e) = loaded {
            tracing::warn!("{}; labels will be measured approximately and not drawn", e);
        }

        Self {
            style: config.render.style(config.layout.font_size),
            config,
            tree: None,
            sample: None,
            layout: None,
            text_renderer,
            viewport: ViewportTransform::new(viewport),
            mouse: MouseState::default(),
            on_tap: None,
            scene: Scene::new(),
            needs_relayout: true,
            needs_fit: true,
        }
    }

    /// Replace the displayed tree. The next layout is refitted to the window.
    pub fn set_tree(&mut self, tree: ResponseNode) {
        self.tree = Some(tree);
        self.needs_relayout = true;
        self.needs_fit = true;
    }

    /// Show a generated sample tree.
    pub fn set_sample(&mut self, sample: SampleSource) {
        tracing::info!(
            "Generating sample tree: {} levels, seed {}",
            sample.levels,
            sample.seed
        );
        self.sample = Some(sample);
        self.set_tree(seeded_binary_tree(sample.levels, sample.seed));
    }

    /// Replace a sample tree with the next seed. Returns false for loaded trees.
    pub fn regenerate(&mut self) -> bool {
        let Some(sample) = self.sample else {
            tracing::info!("Tree was loaded from a file; nothing to regenerate");
            return false;
        };
        self.set_sample(SampleSource {
            seed: sample.seed.wrapping_add(1),
            ..sample
        });
        true
    }

    /// Register the single-tap callback.
    pub fn set_tap_handler(&mut self, handler: impl FnMut() + 'static) {
        self.on_tap = Some(Box::new(handler));
    }

    pub fn tap(&mut self) {
        if let Some(handler) = self.on_tap.as_mut() {
            handler();
        }
    }

    /// Handle viewport resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = self.viewport.apply(
            ViewportEvent::Resize {
                width: width as f32,
                height: height as f32,
            },
            &self.config.viewport,
        );
        self.needs_relayout = true;
    }

    /// Recompute draw commands for the current tree and window size.
    pub fn relayout(&mut self) {
        let computed = layout::compute_layout(
            self.tree.as_ref(),
            self.viewport.viewport,
            &self.config.layout,
            &mut self.text_renderer,
        );
        tracing::info!(
            "Layout computed: {} commands for {} leaves",
            computed.commands.len(),
            computed.leaf_count
        );
        self.layout = Some(computed);
        self.needs_relayout = false;

        if std::mem::take(&mut self.needs_fit) {
            self.fit();
        }
    }

    /// Scale the dendrogram so it fills at least the window width.
    pub fn fit(&mut self) {
        if let Some(layout) = &self.layout {
            let content_width = layout.fit_width(&self.config.layout, self.config.viewport.padding);
            self.viewport = self
                .viewport
                .apply(ViewportEvent::Fit { content_width }, &self.config.viewport);
        }
    }

    /// Apply an input action. Returns true when a redraw is needed.
    pub fn handle_action(&mut self, action: InputAction) -> bool {
        match action {
            InputAction::Viewport(event) => {
                let next = self.viewport.apply(event, &self.config.viewport);
                let changed = next != self.viewport;
                self.viewport = next;
                changed
            }
            InputAction::Fit => {
                self.fit();
                true
            }
            InputAction::Regenerate => self.regenerate(),
            InputAction::Tap => {
                self.tap();
                false
            }
            InputAction::Exit | InputAction::None => false,
        }
    }

    /// Rebuild the Vello scene from the current layout and viewport.
    pub fn rebuild_scene(&mut self) {
        match &self.layout {
            Some(layout) => build_scene(
                &mut self.scene,
                &layout.commands,
                self.viewport,
                &self.style,
                &mut self.text_renderer,
            ),
            None => self.scene.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn app() -> App {
        App::new(ViewerConfig::default(), Size::new(800.0, 600.0))
    }

    #[test]
    fn relayout_fits_new_tree_once() {
        let mut app = app();
        app.set_sample(SampleSource { levels: 3, seed: 1 });
        assert!(app.needs_relayout && app.needs_fit);

        app.relayout();
        let layout = app.layout.as_ref().unwrap();
        assert_eq!(layout.leaf_count, 8);
        assert_eq!(layout.lines().count(), 2 * 14);
        assert!(!app.needs_fit);
        let fitted = app.viewport.scale;
        assert!(layout.fit_width(&app.config.layout, app.config.viewport.padding) * fitted >= 800.0);

        // A plain resize keeps the user's zoom.
        app.handle_action(InputAction::Viewport(ViewportEvent::ZoomIn));
        app.resize(640, 480);
        app.relayout();
        assert!((app.viewport.scale - fitted * 1.2).abs() < 1e-4);
        assert_eq!(app.layout.as_ref().unwrap().canvas, Size::new(640.0, 480.0));
    }

    #[test]
    fn regenerate_advances_seed_only_for_samples() {
        let mut app = app();
        assert!(!app.regenerate());

        app.set_sample(SampleSource { levels: 2, seed: 9 });
        assert!(app.regenerate());
        assert_eq!(app.sample, Some(SampleSource { levels: 2, seed: 10 }));
    }

    #[test]
    fn tap_reaches_handler() {
        let mut app = app();
        let taps = Rc::new(Cell::new(0));
        let counter = taps.clone();
        app.set_tap_handler(move || counter.set(counter.get() + 1));

        assert!(!app.handle_action(InputAction::Tap));
        app.handle_action(InputAction::Tap);
        assert_eq!(taps.get(), 2);
    }

    #[test]
    fn viewport_actions_report_change() {
        let mut app = app();
        assert!(app.handle_action(InputAction::Viewport(ViewportEvent::Pan { dx: 3.0, dy: 0.0 })));
        assert!(!app.handle_action(InputAction::Viewport(ViewportEvent::Zoom { factor: -1.0 })));
    }
}
