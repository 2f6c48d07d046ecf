use serde::{Deserialize, Serialize};

use crate::layout::{Point, Size};

/// Limits and step sizes for viewport changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Multiplier applied by one zoom-in step (and divided by one zoom-out step)
    pub zoom_factor: f32,
    /// Scale increment used while searching for a fitting scale
    pub fit_step: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    /// Padding (world units) added on both sides when fitting
    pub padding: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            zoom_factor: 1.2,
            fit_step: 0.1,
            min_scale: 0.05,
            max_scale: 40.0,
            padding: 16.0,
        }
    }
}

/// Smallest accepted `fit_step`.
const MIN_FIT_STEP: f32 = 1e-4;

impl ViewportConfig {
    /// Replace unusable step values with their defaults.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let fit_step = if self.fit_step.is_finite() && self.fit_step >= MIN_FIT_STEP {
            self.fit_step
        } else {
            tracing::warn!("Invalid fit_step {}; using {}", self.fit_step, defaults.fit_step);
            defaults.fit_step
        };
        let zoom_factor = if self.zoom_factor.is_finite() && self.zoom_factor > 0.0 {
            self.zoom_factor
        } else {
            tracing::warn!(
                "Invalid zoom_factor {}; using {}",
                self.zoom_factor,
                defaults.zoom_factor
            );
            defaults.zoom_factor
        };
        Self {
            fit_step,
            zoom_factor,
            ..self
        }
    }
}

/// A change requested by gesture or keyboard handling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportEvent {
    /// Pan by a screen-space delta
    Pan { dx: f32, dy: f32 },
    /// Multiply the scale by `factor`
    Zoom { factor: f32 },
    ZoomIn,
    ZoomOut,
    /// Pick the scale that makes `content_width` fill the viewport width
    Fit { content_width: f32 },
    Resize { width: f32, height: f32 },
    Reset,
}

/// Scale + translation mapping dendrogram space onto the screen, pivoting
/// around the viewport center:
/// `screen = pivot + (world + translate - pivot) * scale`.
///
/// Updated only by [`ViewportTransform::apply`], which returns a new value, so
/// a renderer that copies the transform at the start of a frame always sees a
/// consistent scale/translation pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    pub scale: f32,
    pub translate_x: f32,
    pub translate_y: f32,
    pub viewport: Size,
}

impl ViewportTransform {
    pub fn new(viewport: Size) -> Self {
        Self {
            scale: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
            viewport,
        }
    }

    pub fn pivot(&self) -> Point {
        Point::new(self.viewport.width / 2.0, self.viewport.height / 2.0)
    }

    /// Apply one event, returning the updated transform.
    pub fn apply(self, event: ViewportEvent, config: &ViewportConfig) -> Self {
        match event {
            ViewportEvent::Pan { dx, dy } => {
                if !dx.is_finite() || !dy.is_finite() {
                    return self;
                }
                Self {
                    translate_x: self.translate_x + dx / self.scale,
                    translate_y: self.translate_y + dy / self.scale,
                    ..self
                }
            }
            ViewportEvent::Zoom { factor } => self.zoomed(factor, config),
            ViewportEvent::ZoomIn => self.zoomed(config.zoom_factor, config),
            ViewportEvent::ZoomOut => self.zoomed(1.0 / config.zoom_factor, config),
            ViewportEvent::Fit { content_width } => {
                let scale = fit_to_viewport(content_width, self.viewport.width, config.fit_step)
                    .min(config.max_scale);
                tracing::debug!(
                    "Fit: content width {:.1} into {:.1} at scale {:.3}",
                    content_width,
                    self.viewport.width,
                    scale
                );
                Self {
                    scale,
                    translate_x: 0.0,
                    translate_y: 0.0,
                    ..self
                }
            }
            ViewportEvent::Resize { width, height } => Self {
                viewport: Size::new(width.max(1.0), height.max(1.0)),
                ..self
            },
            ViewportEvent::Reset => Self::new(self.viewport),
        }
    }

    fn zoomed(self, factor: f32, config: &ViewportConfig) -> Self {
        if !factor.is_finite() || factor <= 0.0 {
            tracing::debug!("Ignoring invalid zoom factor {}", factor);
            return self;
        }
        Self {
            scale: (self.scale * factor).clamp(config.min_scale, config.max_scale),
            ..self
        }
    }

    /// Map a dendrogram-space point to the screen.
    pub fn to_screen(&self, world: Point) -> Point {
        let c = self.pivot();
        Point::new(
            c.x + (world.x + self.translate_x - c.x) * self.scale,
            c.y + (world.y + self.translate_y - c.y) * self.scale,
        )
    }

    /// Inverse of [`Self::to_screen`].
    pub fn to_world(&self, screen: Point) -> Point {
        let c = self.pivot();
        Point::new(
            (screen.x - c.x) / self.scale + c.x - self.translate_x,
            (screen.y - c.y) / self.scale + c.y - self.translate_y,
        )
    }
}

/// Smallest scale of the form `viewport_width / total_width + k * step` at
/// which the content is at least as wide as the viewport. Stepping stops
/// early when `step` is too small to change the scale.
pub fn fit_to_viewport(total_width: f32, viewport_width: f32, step: f32) -> f32 {
    let usable = |w: f32| w.is_finite() && w > 0.0;
    if !usable(total_width) || !usable(viewport_width) {
        return 1.0;
    }
    let mut scale = viewport_width / total_width;
    if step.is_finite() && step > 0.0 {
        while total_width * scale < viewport_width {
            let next = scale + step;
            if next <= scale {
                break;
            }
            scale = next;
        }
    }
    scale
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3
    }

    fn viewport() -> ViewportTransform {
        ViewportTransform::new(Size::new(800.0, 600.0))
    }

    #[test]
    fn fit_accepts_exact_starting_scale() {
        assert_eq!(fit_to_viewport(200.0, 150.0, 0.1), 0.75);
    }

    #[test]
    fn fit_never_underflows_the_viewport() {
        for (total, vw) in [(300.0, 100.0), (1234.0, 411.0), (50.0, 390.0)] {
            let scale = fit_to_viewport(total, vw, 0.1);
            assert!(total * scale >= vw);
            assert!(scale < vw / total + 0.1 + 1e-4);
        }
    }

    #[test]
    fn fit_degenerate_width_keeps_unit_scale() {
        assert_eq!(fit_to_viewport(0.0, 150.0, 0.1), 1.0);
        assert_eq!(fit_to_viewport(f32::NAN, 150.0, 0.1), 1.0);
    }

    #[test]
    fn fit_with_vanishing_step_terminates() {
        let scale = fit_to_viewport(1.37, 397.0, 1e-9);
        assert!((1.37 * scale - 397.0).abs() < 1e-3);
        assert_eq!(fit_to_viewport(1.37, 397.0, f32::INFINITY), 397.0 / 1.37);
    }

    #[test]
    fn sanitized_config_replaces_unusable_steps() {
        let config = ViewportConfig {
            fit_step: 1e-9,
            zoom_factor: -2.0,
            ..ViewportConfig::default()
        }
        .sanitized();
        assert_eq!(config.fit_step, 0.1);
        assert_eq!(config.zoom_factor, 1.2);

        let kept = ViewportConfig {
            fit_step: 0.25,
            ..ViewportConfig::default()
        }
        .sanitized();
        assert_eq!(kept.fit_step, 0.25);
    }

    #[test]
    fn zoom_steps_multiply_and_divide() {
        let config = ViewportConfig::default();
        let zoomed = viewport().apply(ViewportEvent::ZoomIn, &config);
        assert!((zoomed.scale - 1.2).abs() < 1e-6);
        let back = zoomed.apply(ViewportEvent::ZoomOut, &config);
        assert!((back.scale - 1.0).abs() < 1e-6);
    }

    #[test]
    fn invalid_zoom_is_ignored_and_scale_is_clamped() {
        let config = ViewportConfig::default();
        let v = viewport();
        assert_eq!(v.apply(ViewportEvent::Zoom { factor: 0.0 }, &config), v);
        assert_eq!(v.apply(ViewportEvent::Zoom { factor: -2.0 }, &config), v);
        assert_eq!(v.apply(ViewportEvent::Zoom { factor: f32::INFINITY }, &config), v);
        let huge = v.apply(ViewportEvent::Zoom { factor: 1e6 }, &config);
        assert_eq!(huge.scale, config.max_scale);
    }

    #[test]
    fn pan_is_divided_by_scale() {
        let config = ViewportConfig::default();
        let v = viewport()
            .apply(ViewportEvent::Zoom { factor: 2.0 }, &config)
            .apply(ViewportEvent::Pan { dx: 10.0, dy: -4.0 }, &config);
        assert_eq!(v.translate_x, 5.0);
        assert_eq!(v.translate_y, -2.0);

        // A pan moves screen content by exactly the gesture delta.
        let p = Point::new(120.0, 80.0);
        let before = viewport()
            .apply(ViewportEvent::Zoom { factor: 2.0 }, &config)
            .to_screen(p);
        let after = v.to_screen(p);
        assert!(close(after, Point::new(before.x + 10.0, before.y - 4.0)));
    }

    #[test]
    fn pivot_stays_fixed_under_zoom() {
        let config = ViewportConfig::default();
        let v = viewport().apply(ViewportEvent::Zoom { factor: 3.0 }, &config);
        assert!(close(v.to_screen(v.pivot()), v.pivot()));
    }

    #[test]
    fn screen_mapping_round_trips_in_either_order() {
        let config = ViewportConfig::default();
        let world = Point::new(37.5, -12.25);

        let pan_then_zoom = viewport()
            .apply(ViewportEvent::Pan { dx: 30.0, dy: 15.0 }, &config)
            .apply(ViewportEvent::Zoom { factor: 1.7 }, &config);
        let zoom_then_pan = viewport()
            .apply(ViewportEvent::Zoom { factor: 1.7 }, &config)
            .apply(ViewportEvent::Pan { dx: 30.0, dy: 15.0 }, &config);

        for v in [pan_then_zoom, zoom_then_pan] {
            let c = v.pivot();
            let screen = v.to_screen(world);
            let expected = Point::new(
                c.x + (world.x + v.translate_x - c.x) * v.scale,
                c.y + (world.y + v.translate_y - c.y) * v.scale,
            );
            assert!(close(screen, expected));
            assert!(close(v.to_world(screen), world));
        }
    }

    #[test]
    fn fit_resets_translation() {
        let config = ViewportConfig::default();
        let v = viewport()
            .apply(ViewportEvent::Pan { dx: 50.0, dy: 50.0 }, &config)
            .apply(ViewportEvent::Fit { content_width: 1600.0 }, &config);
        assert_eq!(v.scale, 0.5);
        assert_eq!((v.translate_x, v.translate_y), (0.0, 0.0));
    }
}
