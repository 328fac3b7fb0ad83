//! egui implementation of the core [`Canvas`].

use std::f32::consts::TAU;

use genesis_core::shape::{Canvas, Rgba};
use glam::Vec2;

use crate::camera::Camera;

pub fn color32(c: Rgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, c.a)
}

/// Vertices of a regular polygon; the first sits at `rotation` degrees.
pub fn polygon_points(center: Vec2, sides: u32, radius: f32, rotation: f32) -> Vec<Vec2> {
    let sector = TAU / sides as f32;
    let start = rotation.to_radians();
    (0..sides)
        .map(|i| center + Vec2::from_angle(start + sector * i as f32) * radius)
        .collect()
}

/// Corners of a rectangle pivoting around `position`.
pub fn rectangle_corners(position: Vec2, size: Vec2, origin: Vec2, rotation: f32) -> [Vec2; 4] {
    let rotation = Vec2::from_angle(rotation.to_radians());
    let min = -size * origin;
    let max = min + size;
    [
        Vec2::new(min.x, min.y),
        Vec2::new(max.x, min.y),
        Vec2::new(max.x, max.y),
        Vec2::new(min.x, max.y),
    ]
    .map(|corner| position + rotation.rotate(corner))
}

pub struct EguiCanvas<'a> {
    painter: &'a egui::Painter,
    camera: &'a Camera,
    rect: egui::Rect,
}

impl<'a> EguiCanvas<'a> {
    pub fn new(painter: &'a egui::Painter, camera: &'a Camera, rect: egui::Rect) -> Self {
        Self {
            painter,
            camera,
            rect,
        }
    }

    fn fill(&self, points: impl IntoIterator<Item = Vec2>, color: Rgba) {
        let points: Vec<egui::Pos2> = points
            .into_iter()
            .map(|p| self.camera.world_to_screen(p, self.rect))
            .collect();
        self.painter.add(egui::Shape::convex_polygon(
            points,
            color32(color),
            egui::Stroke::NONE,
        ));
    }

    /// Strokes a world-space axis-aligned box given as `(min, size)`.
    pub fn outline(&self, (min, size): (Vec2, Vec2), stroke: egui::Stroke) {
        let points = rectangle_corners(min, size, Vec2::ZERO, 0.0)
            .map(|p| self.camera.world_to_screen(p, self.rect))
            .to_vec();
        self.painter.add(egui::Shape::closed_line(points, stroke));
    }
}

impl Canvas for EguiCanvas<'_> {
    fn polygon(&mut self, center: Vec2, sides: u32, radius: f32, rotation: f32, color: Rgba) {
        if sides < 3 {
            self.circle(center, radius, color);
            return;
        }
        self.fill(polygon_points(center, sides, radius, rotation), color);
    }

    fn rectangle(&mut self, position: Vec2, size: Vec2, origin: Vec2, rotation: f32, color: Rgba) {
        self.fill(rectangle_corners(position, size, origin, rotation), color);
    }

    fn circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        let p = self.camera.world_to_screen(center, self.rect);
        self.painter
            .circle_filled(p, radius * self.camera.zoom(), color32(color));
    }
}
