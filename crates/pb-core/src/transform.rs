//! Screen ↔ world coordinate transform.
//!
//! `screen = world * scale + pan`. Pan is in screen pixels, so panning by a
//! pointer delta never depends on the zoom level.

use crate::layout::Viewport;
use crate::model::Position;

pub const DEFAULT_MIN_SCALE: f32 = 0.1;
pub const DEFAULT_MAX_SCALE: f32 = 5.0;

/// Pan offset and zoom scale of the canvas view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub pan_x: f32,
    pub pan_y: f32,
    pub scale: f32,
    min_scale: f32,
    max_scale: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::with_limits(DEFAULT_MIN_SCALE, DEFAULT_MAX_SCALE)
    }
}

impl ViewTransform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity transform with a custom scale range. An inverted range is
    /// swapped; a non-positive or non-finite bound falls back to the defaults.
    pub fn with_limits(min_scale: f32, max_scale: f32) -> Self {
        let usable = |s: f32| s.is_finite() && s > 0.0;
        let (min_scale, max_scale) = if usable(min_scale) && usable(max_scale) {
            (min_scale.min(max_scale), min_scale.max(max_scale))
        } else {
            log::warn!("unusable scale range [{min_scale}, {max_scale}], using defaults");
            (DEFAULT_MIN_SCALE, DEFAULT_MAX_SCALE)
        };
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            scale: 1.0_f32.clamp(min_scale, max_scale),
            min_scale,
            max_scale,
        }
    }

    pub fn clamp_scale(&self, scale: f32) -> f32 {
        scale.clamp(self.min_scale, self.max_scale)
    }

    pub fn world_to_screen(&self, p: Position) -> Position {
        Position::new(p.x * self.scale + self.pan_x, p.y * self.scale + self.pan_y)
    }

    pub fn screen_to_world(&self, p: Position) -> Position {
        Position::new(
            (p.x - self.pan_x) / self.scale,
            (p.y - self.pan_y) / self.scale,
        )
    }

    /// Convert a screen-space delta to world units.
    pub fn screen_delta_to_world(&self, dx: f32, dy: f32) -> (f32, f32) {
        (dx / self.scale, dy / self.scale)
    }

    /// Shift the view by a screen-space delta.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Wheel zoom anchored at the screen point `cursor`.
    ///
    /// The world point under the cursor stays under the cursor.
    pub fn zoom_at(&mut self, cursor: Position, delta: f32, sensitivity: f32) {
        let new_scale = self.clamp_scale(self.scale + delta * sensitivity);
        self.set_scale_at(cursor, new_scale);
    }

    /// Set the scale directly, keeping `anchor` (screen space) fixed.
    pub fn set_scale_at(&mut self, anchor: Position, scale: f32) {
        let new_scale = self.clamp_scale(scale);
        if new_scale == self.scale {
            return;
        }
        self.pan_x = anchor.x - (anchor.x - self.pan_x) / self.scale * new_scale;
        self.pan_y = anchor.y - (anchor.y - self.pan_y) / self.scale * new_scale;
        self.scale = new_scale;
    }

    /// Pan so that `world` lands on the viewport center, keeping the scale.
    pub fn center_on(&mut self, world: Position, viewport: Viewport) {
        self.pan_x = viewport.width / 2.0 - world.x * self.scale;
        self.pan_y = viewport.height / 2.0 - world.y * self.scale;
    }

    /// Back to pan (0, 0) and scale 1.
    pub fn reset(&mut self) {
        self.pan_x = 0.0;
        self.pan_y = 0.0;
        self.scale = self.clamp_scale(1.0);
    }
}
