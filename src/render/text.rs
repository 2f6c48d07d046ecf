use fontdue::layout::{CoordinateSystem, GlyphRasterConfig, Layout, LayoutSettings, TextStyle};
use fontdue::Font;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::colors::Rgba;
use crate::error::{Error, Result};
use crate::layout::{ApproxMeasure, Size, TextMeasure};

pub const DEFAULT_FONT: &str = "default";

pub struct TextRenderer {
    fonts: HashMap<String, Font>,
    layout: Layout,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextRenderer {
    pub fn new() -> Self {
        Self {
            fonts: HashMap::new(),
            layout: Layout::new(CoordinateSystem::PositiveYDown),
        }
    }

    pub fn has_font(&self, name: &str) -> bool {
        self.fonts.contains_key(name)
    }

    pub fn load_font_from_path(&mut self, name: &str, path: &Path) -> Result<()> {
        let font_data = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let font = Font::from_bytes(font_data, fontdue::FontSettings::default())
            .map_err(|e| Error::Font(format!("{}: {}", path.display(), e)))?;
        self.fonts.insert(name.to_string(), font);
        tracing::info!("Loaded text font from {}", path.display());
        Ok(())
    }

    pub fn load_system_font(&mut self, name: &str) -> Result<()> {
        let mut candidates: Vec<PathBuf> = Vec::new();

        if let Ok(windir) = std::env::var("WINDIR") {
            candidates.push(PathBuf::from(format!("{windir}\\Fonts\\segoeui.ttf")));
            candidates.push(PathBuf::from(format!("{windir}\\Fonts\\arial.ttf")));
        }

        candidates.push(PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"));
        candidates.push(PathBuf::from("/usr/share/fonts/TTF/DejaVuSans.ttf"));
        candidates.push(PathBuf::from("/usr/share/fonts/dejavu/DejaVuSans.ttf"));
        candidates.push(PathBuf::from("/System/Library/Fonts/Supplemental/Arial.ttf"));
        candidates.push(PathBuf::from("/Library/Fonts/Arial.ttf"));

        for path in candidates {
            if self.load_font_from_path(name, &path).is_ok() {
                return Ok(());
            }
        }

        Err(Error::Font(
            "unable to load a system font from known locations".into(),
        ))
    }

    /// Rasterize `text` into tinted RGBA glyph bitmaps.
    pub fn render_text(
        &mut self,
        text: &str,
        font_name: &str,
        font_size: f32,
        color: Rgba,
    ) -> Option<TextRenderResult> {
        let font = self.fonts.get(font_name)?;
        self.layout.reset(&LayoutSettings::default());
        self.layout.append(&[font], &TextStyle::new(text, font_size, 0));
        let [r, g, b, a] = color.to_rgba8();

        let mut glyphs = Vec::new();
        let mut width: f32 = 0.0;
        let mut height: f32 = 0.0;

        for glyph in self.layout.glyphs() {
            let (metrics, coverage) = font.rasterize_config(GlyphRasterConfig {
                glyph_index: glyph.key.glyph_index,
                px: font_size,
                font_hash: font.file_hash(),
            });

            // Coverage becomes alpha, scaled by the color's own alpha.
            let mut rgba_bitmap = Vec::with_capacity(coverage.len() * 4);
            for &cov in &coverage {
                rgba_bitmap.extend_from_slice(&[r, g, b, ((cov as u16 * a as u16) / 255) as u8]);
            }

            glyphs.push(TextGlyph {
                x: glyph.x,
                y: glyph.y,
                width: metrics.width,
                height: metrics.height,
                bitmap: rgba_bitmap,
            });

            width = width.max(glyph.x + metrics.width as f32);
            height = height.max(glyph.y + metrics.height as f32);
        }

        if glyphs.is_empty() {
            return None;
        }

        Some(TextRenderResult {
            glyphs,
            width: width.ceil() as u32,
            height: height.ceil() as u32,
        })
    }
}

impl TextMeasure for TextRenderer {
    fn measure(&mut self, text: &str, font_size: f32) -> Size {
        let Some(font) = self.fonts.get(DEFAULT_FONT) else {
            return ApproxMeasure.measure(text, font_size);
        };
        self.layout.reset(&LayoutSettings::default());
        self.layout.append(&[font], &TextStyle::new(text, font_size, 0));
        let width = self
            .layout
            .glyphs()
            .iter()
            .map(|g| g.x + g.width as f32)
            .fold(0.0f32, f32::max);
        Size::new(width, self.layout.height())
    }
}

pub struct TextRenderResult {
    pub glyphs: Vec<TextGlyph>,
    pub width: u32,
    pub height: u32,
}

pub struct TextGlyph {
    pub x: f32,
    pub y: f32,
    pub width: usize,
    pub height: usize,
    pub bitmap: Vec<u8>, // RGBA format
}
