//! Viewport module for pan/zoom transforms.

use crate::config::ViewportConfig;
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Viewport manages the view transform for the canvas.
///
/// Zoom is a percentage (100 = 1:1) and pan is an offset in world units,
/// applied before scaling: `screen = (world + pan) * zoom / 100`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Current zoom percentage.
    zoom: f64,
    /// Current pan offset in world units.
    pub pan: Vec2,
    /// Minimum allowed zoom percentage.
    min_zoom: f64,
    /// Maximum allowed zoom percentage.
    max_zoom: f64,
    /// Zoom percentage restored by `reset`.
    default_zoom: f64,
    /// Increment for `zoom_in` / `zoom_out`.
    zoom_step: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::from_config(&ViewportConfig::default())
    }
}

impl Viewport {
    /// Create a new viewport with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a viewport from config.
    ///
    /// Zoom bounds that are not positive and finite fall back to the
    /// defaults, and inverted bounds are swapped.
    pub fn from_config(config: &ViewportConfig) -> Self {
        let defaults = ViewportConfig::default();
        let positive_or = |value: f64, fallback: f64| {
            if value.is_finite() && value > 0.0 { value } else { fallback }
        };

        let mut min_zoom = positive_or(config.min_zoom, defaults.min_zoom);
        let mut max_zoom = positive_or(config.max_zoom, defaults.max_zoom);
        if min_zoom > max_zoom {
            log::warn!("Zoom bounds {}..{} are inverted, swapping", min_zoom, max_zoom);
            std::mem::swap(&mut min_zoom, &mut max_zoom);
        }
        let default_zoom = if config.default_zoom.is_finite() {
            config.default_zoom.clamp(min_zoom, max_zoom)
        } else {
            defaults.default_zoom.clamp(min_zoom, max_zoom)
        };

        Self {
            zoom: default_zoom,
            pan: Vec2::ZERO,
            min_zoom,
            max_zoom,
            default_zoom,
            zoom_step: positive_or(config.zoom_step, defaults.zoom_step),
        }
    }

    // Never panics, even on bounds that arrived through deserialization.
    fn clamp_zoom(&self, percent: f64) -> f64 {
        percent.max(self.min_zoom).min(self.max_zoom)
    }

    /// Current zoom percentage.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Zoom as a scale factor (100% = 1.0).
    pub fn scale(&self) -> f64 {
        self.zoom / 100.0
    }

    pub fn zoom_bounds(&self) -> (f64, f64) {
        (self.min_zoom, self.max_zoom)
    }

    /// Get the affine transform for rendering.
    ///
    /// This transform converts world coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::scale(self.scale()) * Affine::translate(self.pan)
    }

    /// Get the inverse transform for input handling.
    ///
    /// This transform converts screen coordinates to world coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::translate(-self.pan) * Affine::scale(1.0 / self.scale())
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        let z = self.scale();
        Point::new(screen_point.x / z - self.pan.x, screen_point.y / z - self.pan.y)
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        let z = self.scale();
        Point::new((world_point.x + self.pan.x) * z, (world_point.y + self.pan.y) * z)
    }

    /// Convert a screen-space distance to world units.
    pub fn screen_dist_to_world(&self, distance: f64) -> f64 {
        distance / self.scale()
    }

    /// Set the zoom percentage, clamped to the configured bounds.
    pub fn set_zoom(&mut self, percent: f64) {
        if percent.is_finite() {
            self.zoom = self.clamp_zoom(percent);
        }
    }

    /// Zoom to `percent`, keeping the world point under `screen_point` fixed.
    pub fn zoom_at(&mut self, screen_point: Point, percent: f64) {
        if !percent.is_finite() {
            return;
        }
        let new_zoom = self.clamp_zoom(percent);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        // Convert screen point to world before zoom
        let world_point = self.screen_to_world(screen_point);

        self.zoom = new_zoom;

        // Adjust pan so world_point stays at screen_point
        let z = self.scale();
        self.pan = Vec2::new(screen_point.x / z - world_point.x, screen_point.y / z - world_point.y);
    }

    /// Step the zoom up, anchored at `screen_point`.
    pub fn zoom_in(&mut self, screen_point: Point) {
        self.zoom_at(screen_point, self.zoom + self.zoom_step);
    }

    /// Step the zoom down, anchored at `screen_point`.
    pub fn zoom_out(&mut self, screen_point: Point) {
        self.zoom_at(screen_point, self.zoom - self.zoom_step);
    }

    /// Pan the view by a delta in screen coordinates.
    pub fn pan_by_screen(&mut self, delta: Vec2) {
        self.pan += delta / self.scale();
    }

    /// Reset viewport to default position and zoom.
    pub fn reset(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = self.clamp_zoom(self.default_zoom);
    }

    /// Fit the viewport to show the given bounding box.
    ///
    /// The zoom is uniform on both axes (no distortion) and the bounds are
    /// centered in the viewport. Degenerate input leaves the viewport as is.
    pub fn fit_to_bounds(&mut self, bounds: Rect, viewport: Size, padding: f64) {
        let bounds = bounds.abs();
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 || viewport.is_zero_area() {
            return;
        }

        let padded_viewport = Size::new(
            (viewport.width - padding * 2.0).max(1.0),
            (viewport.height - padding * 2.0).max(1.0),
        );

        let scale_x = padded_viewport.width / bounds.width();
        let scale_y = padded_viewport.height / bounds.height();
        self.zoom = self.clamp_zoom(scale_x.min(scale_y) * 100.0);

        // Center the bounds in the viewport
        let z = self.scale();
        let bounds_center = bounds.center();
        let viewport_center = Point::new(viewport.width / 2.0, viewport.height / 2.0);

        self.pan = Vec2::new(
            viewport_center.x / z - bounds_center.x,
            viewport_center.y / z - bounds_center.y,
        );
    }

    /// The world-space rectangle currently visible in a viewport of `size`.
    pub fn visible_world_rect(&self, size: Size) -> Rect {
        let top_left = self.screen_to_world(Point::ZERO);
        let bottom_right = self.screen_to_world(Point::new(size.width, size.height));
        Rect::from_points(top_left, bottom_right)
    }
}
