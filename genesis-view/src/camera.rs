//! World/screen mapping for the canvas.
//!
//! World space is y-up with the origin at the center of the canvas; egui
//! screen space is y-down.

use genesis_core::config::CameraConfig;
use glam::Vec2;

#[derive(Clone, Copy, Debug)]
pub struct Camera {
    zoom: f32,
    min_zoom: f32,
    max_zoom: f32,
    /// Screen-space pan offset in pixels.
    pub pan: egui::Vec2,
}

impl Camera {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            zoom: config.zoom.clamp(config.min_zoom, config.max_zoom),
            min_zoom: config.min_zoom,
            max_zoom: config.max_zoom,
            pan: egui::Vec2::ZERO,
        }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn zoom_range(&self) -> std::ops::RangeInclusive<f32> {
        self.min_zoom..=self.max_zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
    }

    pub fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        egui::pos2(
            center.x + p.x * self.zoom + self.pan.x,
            center.y - p.y * self.zoom + self.pan.y,
        )
    }

    /// Inverse of [`Camera::world_to_screen`].
    pub fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (center.y - p.y + self.pan.y) / self.zoom;
        Vec2::new(x, y)
    }

    /// Scales the zoom by `factor`, keeping the world point under `pointer`
    /// fixed on screen.
    pub fn zoom_around(&mut self, pointer: egui::Pos2, rect: egui::Rect, factor: f32) {
        let world_before = self.screen_to_world(pointer, rect);
        self.set_zoom(self.zoom * factor);
        let screen_after = self.world_to_screen(world_before, rect);
        self.pan += pointer - screen_after;
    }
}
