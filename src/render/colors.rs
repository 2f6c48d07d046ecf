use vello::peniko::Color;

use crate::error::{Error, Result};

/// Straight-alpha RGBA color with components in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn from_argb8(argb: u32) -> Self {
        let channel = |shift: u32| ((argb >> shift) & 0xFF) as f32 / 255.0;
        Self {
            r: channel(16),
            g: channel(8),
            b: channel(0),
            a: channel(24),
        }
    }

    /// Parse a case-insensitive color name, `#RRGGBB` or `#AARRGGBB`.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(Error::InvalidColor(s.into()));
            }
            let value = u32::from_str_radix(hex, 16).map_err(|_| Error::InvalidColor(s.into()))?;
            return match hex.len() {
                6 => Ok(Self::from_argb8(0xFF00_0000 | value)),
                8 => Ok(Self::from_argb8(value)),
                _ => Err(Error::InvalidColor(s.into())),
            };
        }

        let argb = match s.to_ascii_lowercase().as_str() {
            "black" => 0xFF000000,
            "darkgray" | "darkgrey" => 0xFF444444,
            "gray" | "grey" => 0xFF888888,
            "lightgray" | "lightgrey" => 0xFFCCCCCC,
            "white" => 0xFFFFFFFF,
            "red" => 0xFFFF0000,
            "green" => 0xFF00FF00,
            "blue" => 0xFF0000FF,
            "yellow" => 0xFFFFFF00,
            "cyan" | "aqua" => 0xFF00FFFF,
            "magenta" | "fuchsia" => 0xFFFF00FF,
            "lime" => 0xFF00FF00,
            "maroon" => 0xFF800000,
            "navy" => 0xFF000080,
            "olive" => 0xFF808000,
            "purple" => 0xFF800080,
            "silver" => 0xFFC0C0C0,
            "teal" => 0xFF008080,
            _ => return Err(Error::InvalidColor(s.into())),
        };
        Ok(Self::from_argb8(argb))
    }

    /// Convert to vello's peniko Color.
    pub fn to_peniko(self) -> Color {
        Color::new([self.r, self.g, self.b, self.a])
    }

    /// 8-bit RGBA bytes.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

/// Palette color for a tree depth (root = 0). Hues step around the wheel so
/// neighbouring rows stay distinguishable.
pub fn depth_color(depth: u16) -> Rgba {
    let hue = (depth as f32 * 0.137).rem_euclid(1.0);
    hsv_to_rgb(hue, 0.70, 0.72)
}

/// Color for a node: its parsed `color` string, or the depth palette when the
/// string is absent or malformed.
pub fn resolve_node_color(color: Option<&str>, depth: u16) -> Rgba {
    match color {
        None => depth_color(depth),
        Some(s) => Rgba::parse(s).unwrap_or_else(|e| {
            tracing::warn!("{}; using depth palette for depth {}", e, depth);
            depth_color(depth)
        }),
    }
}

fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgba {
    let h6 = (h * 6.0).rem_euclid(6.0);
    let i = h6.floor() as i32;
    let f = h6 - i as f32;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);
    let (r, g, b) = match i {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Rgba { r, g, b, a: 1.0 }
}
