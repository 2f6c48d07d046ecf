use std::sync::Arc;

use vello::kurbo::{Affine, Line, Stroke};
use vello::peniko::{Blob, Image, ImageFormat};
use vello::Scene;

use super::colors::Rgba;
use super::text::{TextRenderResult, TextRenderer, DEFAULT_FONT};
use super::{draw_commands, RenderStyle, Surface};
use crate::layout::{DrawCommand, Point};
use crate::ui::viewport::ViewportTransform;

/// Labels smaller than this on screen are not rasterized.
const MIN_SCREEN_FONT_PX: f32 = 3.0;

/// Retained-mode surface: records primitives into a vello [`Scene`].
pub struct SceneSurface<'a> {
    pub scene: &'a mut Scene,
    pub text_renderer: &'a mut TextRenderer,
}

impl Surface for SceneSurface<'_> {
    fn line(&mut self, from: Point, to: Point, color: Rgba, width: f32) {
        let line = Line::new(
            (from.x as f64, from.y as f64),
            (to.x as f64, to.y as f64),
        );
        self.scene.stroke(
            &Stroke::new(width as f64),
            Affine::IDENTITY,
            color.to_peniko(),
            None,
            &line,
        );
    }

    fn text(&mut self, text: &str, top_left: Point, font_size: f32, color: Rgba) {
        if font_size < MIN_SCREEN_FONT_PX {
            return;
        }
        if let Some(rendered) =
            self.text_renderer
                .render_text(text, DEFAULT_FONT, font_size, color)
        {
            draw_text_to_scene(self.scene, rendered, top_left.x, top_left.y);
        }
    }
}

/// Build a Vello scene for one frame of the dendrogram.
pub fn build_scene(
    scene: &mut Scene,
    commands: &[DrawCommand],
    transform: ViewportTransform,
    style: &RenderStyle,
    text_renderer: &mut TextRenderer,
) {
    scene.reset();
    let mut surface = SceneSurface {
        scene,
        text_renderer,
    };
    draw_commands(commands, transform, style, &mut surface);
}

/// Draw rendered text to a Vello scene.
fn draw_text_to_scene(scene: &mut Scene, text_result: TextRenderResult, x: f32, y: f32) {
    for glyph in text_result.glyphs {
        if glyph.bitmap.is_empty() {
            continue;
        }

        let glyph_image = Image::new(
            Blob::new(Arc::new(glyph.bitmap)),
            ImageFormat::Rgba8,
            glyph.width as u32,
            glyph.height as u32,
        );

        let transform = Affine::translate((x as f64 + glyph.x as f64, y as f64 + glyph.y as f64));
        scene.draw_image(&glyph_image, transform);
    }
}
