// SPDX-License-Identifier: MIT OR Apache-2.0
//! Zoom, pan and the screen <-> canvas transform.

use egui::{Pos2, Rect, Vec2};

/// Smallest allowed zoom
pub const MIN_ZOOM: f32 = 0.25;
/// Largest allowed zoom
pub const MAX_ZOOM: f32 = 3.0;
/// Wheel deltas beyond this are clamped
pub const MAX_WHEEL_DELTA: f32 = 50.0;
/// Zoom change per wheel unit, relative to the current zoom
pub const WHEEL_ZOOM_RATE: f32 = 0.002;
/// Factor used by the zoom buttons
pub const BUTTON_ZOOM_FACTOR: f32 = 1.2;
/// Grid size node positions snap to
pub const GRID_SIZE: f32 = 24.0;

/// Viewport over the canvas.
///
/// `pan` is in screen pixels and applied after scaling, so
/// `screen = canvas * zoom + pan + container_origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    zoom: f32,
    /// Pan offset in screen pixels
    pub pan: Vec2,
    /// Screen position of the canvas container's top-left corner
    pub container_origin: Pos2,
}

impl Viewport {
    /// Create a viewport at zoom 1 with no pan
    pub fn new() -> Self {
        Self {
            zoom: 1.0,
            pan: Vec2::ZERO,
            container_origin: Pos2::ZERO,
        }
    }

    /// Current zoom level
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Set the zoom, clamped to the allowed range
    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    /// Set the pan offset
    pub fn set_pan(&mut self, pan: Vec2) {
        self.pan = pan;
    }

    /// Apply a mouse wheel delta and return the new zoom.
    ///
    /// The step is proportional to the current zoom, so a 50px scroll is
    /// roughly a 10% change at any zoom level.
    pub fn apply_wheel(&mut self, delta: f32) -> f32 {
        if delta == 0.0 || !delta.is_finite() {
            return self.zoom;
        }
        let magnitude = delta.abs().min(MAX_WHEEL_DELTA);
        let zoom_delta = -delta.signum() * magnitude * WHEEL_ZOOM_RATE * self.zoom;
        self.zoom = (self.zoom + zoom_delta).clamp(MIN_ZOOM, MAX_ZOOM);
        self.zoom
    }

    /// Zoom in by one button step
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * BUTTON_ZOOM_FACTOR);
    }

    /// Zoom out by one button step
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / BUTTON_ZOOM_FACTOR);
    }

    /// Back to zoom 1 with no pan
    pub fn reset(&mut self) {
        self.zoom = 1.0;
        self.pan = Vec2::ZERO;
    }

    /// Zoom and pan so `bounds` (canvas space) fills a container of the given
    /// size, leaving `padding` screen pixels on every side.
    pub fn fit_to(&mut self, bounds: Rect, container_size: Vec2, padding: f32) {
        let available = container_size - Vec2::splat(padding * 2.0);
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 || available.x <= 0.0 || available.y <= 0.0 {
            return;
        }
        let zoom = (available.x / bounds.width()).min(available.y / bounds.height());
        self.set_zoom(zoom);
        let scaled_center = bounds.center().to_vec2() * self.zoom;
        self.pan = container_size / 2.0 - scaled_center;
    }

    /// Convert a screen position to canvas space
    pub fn screen_to_canvas(&self, screen: Pos2) -> Pos2 {
        ((screen - self.container_origin - self.pan) / self.zoom).to_pos2()
    }

    /// Convert a canvas position to screen space
    pub fn canvas_to_screen(&self, canvas: Pos2) -> Pos2 {
        self.container_origin + self.pan + canvas.to_vec2() * self.zoom
    }

    /// Convert a canvas rect to screen space
    pub fn canvas_rect_to_screen(&self, rect: Rect) -> Rect {
        Rect::from_min_max(self.canvas_to_screen(rect.min), self.canvas_to_screen(rect.max))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

/// Snap a canvas position to the nearest grid intersection
pub fn snap_to_grid(pos: Pos2, grid: f32) -> Pos2 {
    if grid <= 0.0 {
        return pos;
    }
    Pos2::new((pos.x / grid).round() * grid, (pos.y / grid).round() * grid)
}
