use glam::Vec2;

/// Whether `point` lies strictly inside the axis-aligned region whose
/// minimum corner is `(x, y)` and whose size is `(width, height)`.
///
/// Points on the border are outside.
pub fn is_point_over_region(point: Vec2, x: f32, y: f32, width: f32, height: f32) -> bool {
    x < point.x && point.x < x + width && y < point.y && point.y < y + height
}
