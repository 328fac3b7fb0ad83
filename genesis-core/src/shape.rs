//! Visual shapes attached to nodes, and the drawing seam used to render them.
//!
//! World space is y-up. A shape is rendered at a node's world position; its
//! bounding box is described by [`Shape::x_offset`], [`Shape::y_offset`],
//! [`Shape::width`] and [`Shape::height`] (the offsets give the box's minimum
//! corner). Bounds ignore rotation.

use std::f32::consts::{PI, TAU};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 8-bit RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    #[serde(default = "opaque")]
    pub a: u8,
}

fn opaque() -> u8 {
    255
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const RED: Rgba = Rgba::rgb(230, 41, 55);
    pub const GREEN: Rgba = Rgba::rgb(0, 228, 48);
    pub const BLUE: Rgba = Rgba::rgb(0, 121, 241);
    pub const YELLOW: Rgba = Rgba::rgb(253, 249, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Geometry of a [`Shape`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeKind {
    /// Nothing to draw.
    Empty,
    /// Regular polygon; the first vertex sits at the shape's rotation.
    Polygon { sides: u32, radius: f32 },
    /// Axis-aligned rectangle (before rotation). `origin` is the pivot as a
    /// fraction of the size: `(0.5, 0.5)` centers the rectangle on its
    /// position, `(0, 0)` puts the position at the minimum corner.
    Rectangle {
        width: f32,
        height: f32,
        #[serde(default = "centered")]
        origin: Vec2,
    },
    Circle { radius: f32 },
}

fn centered() -> Vec2 {
    Vec2::splat(0.5)
}

/// A node's visual appearance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    #[serde(flatten)]
    pub kind: ShapeKind,
    /// Rotation in degrees, counter-clockwise.
    #[serde(default)]
    pub rotation: f32,
    #[serde(default)]
    pub color: Rgba,
}

/// Drawing target for shapes, implemented by the renderer.
///
/// All coordinates are world-space; the implementor owns the camera.
pub trait Canvas {
    fn polygon(&mut self, center: Vec2, sides: u32, radius: f32, rotation: f32, color: Rgba);

    /// Rectangle pivoting around `position`; `origin` is normalized as in
    /// [`ShapeKind::Rectangle`].
    fn rectangle(&mut self, position: Vec2, size: Vec2, origin: Vec2, rotation: f32, color: Rgba);

    fn circle(&mut self, center: Vec2, radius: f32, color: Rgba);
}

impl Default for Shape {
    fn default() -> Self {
        Self::empty()
    }
}

impl Shape {
    fn with_kind(kind: ShapeKind) -> Self {
        Self {
            kind,
            rotation: 0.0,
            color: Rgba::WHITE,
        }
    }

    /// The "nothing to draw" sentinel: white, unrotated.
    pub fn empty() -> Self {
        Self::with_kind(ShapeKind::Empty)
    }

    pub fn polygon(sides: u32, radius: f32) -> Self {
        Self::with_kind(ShapeKind::Polygon { sides, radius })
    }

    /// Rectangle centered on its position.
    pub fn rectangle(width: f32, height: f32) -> Self {
        Self::with_kind(ShapeKind::Rectangle {
            width,
            height,
            origin: centered(),
        })
    }

    pub fn circle(radius: f32) -> Self {
        Self::with_kind(ShapeKind::Circle { radius })
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.kind, ShapeKind::Empty)
    }

    /// Human-readable kind name, for the detail panel.
    pub fn name(&self) -> &'static str {
        match self.kind {
            ShapeKind::Empty => "Empty",
            ShapeKind::Polygon { .. } => "Polygon",
            ShapeKind::Rectangle { .. } => "Rectangle",
            ShapeKind::Circle { .. } => "Circle",
        }
    }

    pub fn width(&self) -> f32 {
        match self.kind {
            ShapeKind::Empty => 0.0,
            ShapeKind::Polygon { radius, .. } | ShapeKind::Circle { radius } => radius * 2.0,
            ShapeKind::Rectangle { width, .. } => width,
        }
    }

    pub fn height(&self) -> f32 {
        match self.kind {
            ShapeKind::Empty => 0.0,
            ShapeKind::Polygon { radius, .. } | ShapeKind::Circle { radius } => radius * 2.0,
            ShapeKind::Rectangle { height, .. } => height,
        }
    }

    /// Minimum x of the bounding box when rendered at `x`.
    pub fn x_offset(&self, x: f32) -> f32 {
        match self.kind {
            ShapeKind::Empty => x,
            ShapeKind::Polygon { radius, .. } | ShapeKind::Circle { radius } => x - radius,
            ShapeKind::Rectangle { width, origin, .. } => x - width * origin.x,
        }
    }

    /// Minimum y of the bounding box when rendered at `y`.
    pub fn y_offset(&self, y: f32) -> f32 {
        match self.kind {
            ShapeKind::Empty => y,
            ShapeKind::Polygon { radius, .. } | ShapeKind::Circle { radius } => y - radius,
            ShapeKind::Rectangle { height, origin, .. } => y - height * origin.y,
        }
    }

    /// Point on the outline in direction `angle` (radians, counter-clockwise
    /// from +x), relative to the render position.
    ///
    /// The ray starts at the shape's geometric center, which for rectangles
    /// with a non-centered origin differs from the render position.
    pub fn edge_point(&self, angle: f32) -> Vec2 {
        let dir = Vec2::from_angle(angle);
        match self.kind {
            ShapeKind::Empty => Vec2::ZERO,
            ShapeKind::Circle { radius } => dir * radius,
            ShapeKind::Polygon { sides, radius } if sides < 3 => dir * radius,
            ShapeKind::Polygon { sides, radius } => {
                let sector = TAU / sides as f32;
                let half = PI / sides as f32;
                let phi = (angle - self.rotation.to_radians()).rem_euclid(sector);
                let apothem = radius * half.cos();
                dir * (apothem / (phi - half).cos())
            }
            ShapeKind::Rectangle {
                width,
                height,
                origin,
            } => {
                let rotation = Vec2::from_angle(self.rotation.to_radians());
                let local_dir = Vec2::from_angle(angle - self.rotation.to_radians());
                let half = Vec2::new(width, height) * 0.5;
                let center = Vec2::new(width, height) * (Vec2::splat(0.5) - origin);

                let tx = if local_dir.x.abs() > f32::EPSILON {
                    half.x / local_dir.x.abs()
                } else {
                    f32::INFINITY
                };
                let ty = if local_dir.y.abs() > f32::EPSILON {
                    half.y / local_dir.y.abs()
                } else {
                    f32::INFINITY
                };
                let local = center + local_dir * tx.min(ty);
                rotation.rotate(local)
            }
        }
    }

    /// World-space bounding box at `position` as `(min, size)`.
    pub fn bounds(&self, position: Vec2) -> (Vec2, Vec2) {
        (
            Vec2::new(self.x_offset(position.x), self.y_offset(position.y)),
            Vec2::new(self.width(), self.height()),
        )
    }

    /// Draws the shape at `position`. The empty sentinel draws nothing.
    pub fn render(&self, position: Vec2, canvas: &mut impl Canvas) {
        match self.kind {
            ShapeKind::Empty => {}
            ShapeKind::Polygon { sides, radius } => {
                canvas.polygon(position, sides, radius, self.rotation, self.color)
            }
            ShapeKind::Rectangle {
                width,
                height,
                origin,
            } => canvas.rectangle(
                position,
                Vec2::new(width, height),
                origin,
                self.rotation,
                self.color,
            ),
            ShapeKind::Circle { radius } => canvas.circle(position, radius, self.color),
        }
    }
}
