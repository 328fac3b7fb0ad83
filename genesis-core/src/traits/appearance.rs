use super::{Lifecycle, TraitContext};
use crate::shape::{Rgba, Shape};

/// Installs a shape on its organ when initialized.
///
/// The previous shape is not remembered; removing the trait leaves the
/// installed shape in place.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeTrait {
    pub shape: Shape,
}

impl ShapeTrait {
    pub fn new(shape: Shape) -> Self {
        Self { shape }
    }
}

impl Lifecycle for ShapeTrait {
    fn dominant(&self) -> bool {
        true
    }

    fn initialize(&mut self, ctx: &mut TraitContext<'_>) {
        *ctx.shape_mut() = self.shape.clone();
    }
}

/// Paints its organ's shape.
///
/// The shape's prior color is snapshotted on initialize and restored on
/// uninitialize.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorTrait {
    color: Rgba,
    snapshot: Option<Rgba>,
}

impl ColorTrait {
    pub fn new(color: Rgba) -> Self {
        Self {
            color,
            snapshot: None,
        }
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    /// Color the shape had before this trait painted it, once initialized.
    pub fn snapshot(&self) -> Option<Rgba> {
        self.snapshot
    }

    /// Changes the color; writes through to `shape` once initialized.
    pub fn set_color(&mut self, color: Rgba, shape: &mut Shape) {
        self.color = color;
        if self.snapshot.is_some() {
            shape.color = color;
        }
    }
}

impl Lifecycle for ColorTrait {
    fn dominant(&self) -> bool {
        false
    }

    fn initialize(&mut self, ctx: &mut TraitContext<'_>) {
        let shape = ctx.shape_mut();
        self.snapshot = Some(shape.color);
        shape.color = self.color;
    }

    fn uninitialize(&mut self, ctx: &mut TraitContext<'_>) {
        if let Some(previous) = self.snapshot.take() {
            ctx.shape_mut().color = previous;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{command::Command, types::NodeId};
    use glam::Vec2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn with_ctx(shape: &mut Shape, f: impl FnOnce(&mut TraitContext<'_>)) {
        let mut rng = StdRng::seed_from_u64(0);
        let mut commands: Vec<Command> = Vec::new();
        let mut ctx =
            TraitContext::new(NodeId::default(), Vec2::ZERO, 0.0, shape, &mut rng, &mut commands);
        f(&mut ctx);
    }

    #[test]
    fn shape_trait_replaces_shape() {
        let mut shape = Shape::empty();
        let mut t = ShapeTrait::new(Shape::circle(3.0).with_color(Rgba::BLUE));
        with_ctx(&mut shape, |ctx| t.initialize(ctx));
        assert_eq!(shape, Shape::circle(3.0).with_color(Rgba::BLUE));

        with_ctx(&mut shape, |ctx| t.uninitialize(ctx));
        assert_eq!(shape, Shape::circle(3.0).with_color(Rgba::BLUE));
    }

    #[test]
    fn color_restores_snapshot_despite_edits() {
        let mut shape = Shape::rectangle(10.0, 10.0).with_color(Rgba::YELLOW);
        let mut t = ColorTrait::new(Rgba::RED);

        with_ctx(&mut shape, |ctx| t.initialize(ctx));
        assert_eq!(shape.color, Rgba::RED);
        assert_eq!(t.snapshot(), Some(Rgba::YELLOW));

        t.set_color(Rgba::GREEN, &mut shape);
        assert_eq!(shape.color, Rgba::GREEN);

        with_ctx(&mut shape, |ctx| t.uninitialize(ctx));
        assert_eq!(shape.color, Rgba::YELLOW);
        assert_eq!(t.snapshot(), None);
    }

    #[test]
    fn edits_before_initialize_do_not_touch_shape() {
        let mut shape = Shape::circle(1.0);
        let mut t = ColorTrait::new(Rgba::RED);
        t.set_color(Rgba::BLUE, &mut shape);
        assert_eq!(shape.color, Rgba::WHITE);
        assert_eq!(t.color(), Rgba::BLUE);
    }
}
