use std::io::{self, Write};

use bytemuck::{Pod, Zeroable};

use super::colors::Rgba;
use super::text::{TextRenderer, DEFAULT_FONT};
use super::{draw_commands, RenderStyle, Surface};
use crate::layout::{DrawCommand, Point};
use crate::ui::viewport::ViewportTransform;

/// One RGBA8 pixel, laid out so a pixel buffer can be viewed as bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Rgba> for Pixel {
    fn from(color: Rgba) -> Self {
        let [r, g, b, a] = color.to_rgba8();
        Pixel { r, g, b, a }
    }
}

/// CPU pixel buffer used by the immediate-mode renderer.
#[derive(Debug, Clone)]
pub struct PixelCanvas {
    pub width: u32,
    pub height: u32,
    pixels: Vec<Pixel>,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32, background: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![Pixel::from(background); width as usize * height as usize],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y * self.width + x) as usize])
    }

    /// Source-over blend of `color` at `coverage` (0..=1). Out-of-bounds is a no-op.
    pub fn blend(&mut self, x: i64, y: i64, color: Pixel, coverage: f32) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let alpha = (color.a as f32 / 255.0) * coverage.clamp(0.0, 1.0);
        if alpha <= 0.0 {
            return;
        }
        let dst = &mut self.pixels[(y as usize) * self.width as usize + x as usize];
        let mix = |s: u8, d: u8| (s as f32 * alpha + d as f32 * (1.0 - alpha)).round() as u8;
        dst.r = mix(color.r, dst.r);
        dst.g = mix(color.g, dst.g);
        dst.b = mix(color.b, dst.b);
        dst.a = (alpha * 255.0 + dst.a as f32 * (1.0 - alpha)).round() as u8;
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Write the canvas as a binary PPM (alpha dropped).
    pub fn write_ppm<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
        for px in &self.pixels {
            out.write_all(&[px.r, px.g, px.b])?;
        }
        out.flush()
    }
}

/// Immediate-mode surface: paints straight into a [`PixelCanvas`].
pub struct RasterSurface<'a> {
    pub canvas: &'a mut PixelCanvas,
    pub text_renderer: &'a mut TextRenderer,
}

impl Surface for RasterSurface<'_> {
    fn line(&mut self, from: Point, to: Point, color: Rgba, width: f32) {
        let color = Pixel::from(color);
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i64;
        let half = ((width.max(1.0) - 1.0) / 2.0).round() as i64;

        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = (from.x + dx * t).round() as i64;
            let y = (from.y + dy * t).round() as i64;
            for oy in -half..=half {
                for ox in -half..=half {
                    self.canvas.blend(x + ox, y + oy, color, 1.0);
                }
            }
        }
    }

    fn text(&mut self, text: &str, top_left: Point, font_size: f32, color: Rgba) {
        let Some(rendered) = self
            .text_renderer
            .render_text(text, DEFAULT_FONT, font_size, color)
        else {
            return;
        };
        for glyph in rendered.glyphs {
            let gx = (top_left.x + glyph.x).round() as i64;
            let gy = (top_left.y + glyph.y).round() as i64;
            for (i, rgba) in glyph.bitmap.chunks_exact(4).enumerate() {
                let (col, row) = ((i % glyph.width) as i64, (i / glyph.width) as i64);
                let px = Pixel {
                    r: rgba[0],
                    g: rgba[1],
                    b: rgba[2],
                    a: 255,
                };
                self.canvas
                    .blend(gx + col, gy + row, px, rgba[3] as f32 / 255.0);
            }
        }
    }
}

/// Render layout commands into a fresh canvas.
pub fn render_to_canvas(
    commands: &[DrawCommand],
    transform: ViewportTransform,
    style: &RenderStyle,
    text_renderer: &mut TextRenderer,
    width: u32,
    height: u32,
) -> PixelCanvas {
    let mut canvas = PixelCanvas::new(width, height, style.background);
    let mut surface = RasterSurface {
        canvas: &mut canvas,
        text_renderer,
    };
    draw_commands(commands, transform, style, &mut surface);
    canvas
}
