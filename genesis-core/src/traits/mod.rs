//! Traits: composable units of behavior and appearance attached to nodes.
//!
//! Every trait implements [`Lifecycle`]. A node initializes each of its traits
//! exactly once, lazily, on the first update after the trait was attached,
//! and updates it once per frame after that. Dominant traits always run
//! before regular ones.
//!
//! Traits are built from a [`TraitSpec`], the serializable construction
//! parameters used by blueprints, configuration and the editor.

mod appearance;
mod energy;
mod maturity;

pub use appearance::{ColorTrait, ShapeTrait};
pub use energy::EnergyTrait;
pub use maturity::{MatureAction, MaturityTrait};

use glam::Vec2;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::{
    chance,
    command::Command,
    error::ConfigError,
    shape::{Rgba, Shape},
    types::NodeId,
};

/// What a trait hook may see and touch while it runs.
///
/// The owning node's shape is borrowed mutably; everything structural
/// (spawning, removal, adding traits) goes through [`TraitContext::queue`]
/// and is applied by the scene after the update pass.
pub struct TraitContext<'a> {
    node: NodeId,
    world: Vec2,
    dt: f32,
    shape: &'a mut Shape,
    rng: &'a mut StdRng,
    commands: &'a mut Vec<Command>,
}

impl<'a> TraitContext<'a> {
    pub fn new(
        node: NodeId,
        world: Vec2,
        dt: f32,
        shape: &'a mut Shape,
        rng: &'a mut StdRng,
        commands: &'a mut Vec<Command>,
    ) -> Self {
        Self {
            node,
            world,
            dt,
            shape,
            rng,
            commands,
        }
    }

    /// The node that owns the running trait.
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// World position of the owning node at the start of its update.
    pub fn world(&self) -> Vec2 {
        self.world
    }

    /// Elapsed seconds for this frame. Zero outside the update pass.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn shape(&self) -> &Shape {
        &*self.shape
    }

    pub fn shape_mut(&mut self) -> &mut Shape {
        &mut *self.shape
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut *self.rng
    }

    /// Defers a structural change until the end of the update pass.
    pub fn queue(&mut self, command: Command) {
        self.commands.push(command);
    }
}

/// Lifecycle hooks shared by every trait kind.
pub trait Lifecycle {
    /// Dominant traits are initialized and updated before regular ones.
    fn dominant(&self) -> bool;

    /// Runs once, on the owning node's first update after attachment.
    fn initialize(&mut self, _ctx: &mut TraitContext<'_>) {}

    /// Runs every frame after initialization.
    fn update(&mut self, _ctx: &mut TraitContext<'_>) {}

    /// Undoes what [`Lifecycle::initialize`] changed on the node. Only called
    /// for traits that were initialized.
    fn uninitialize(&mut self, _ctx: &mut TraitContext<'_>) {}
}

/// A trait attached to a node.
#[derive(Clone, Debug, PartialEq)]
pub enum Trait {
    Maturity(MaturityTrait),
    Shape(ShapeTrait),
    Color(ColorTrait),
    Energy(EnergyTrait),
}

impl Trait {
    pub fn name(&self) -> &'static str {
        match self {
            Trait::Maturity(_) => "Maturity",
            Trait::Shape(_) => "Shape",
            Trait::Color(_) => "Color",
            Trait::Energy(_) => "Energy",
        }
    }
}

impl Lifecycle for Trait {
    fn dominant(&self) -> bool {
        match self {
            Trait::Maturity(t) => t.dominant(),
            Trait::Shape(t) => t.dominant(),
            Trait::Color(t) => t.dominant(),
            Trait::Energy(t) => t.dominant(),
        }
    }

    fn initialize(&mut self, ctx: &mut TraitContext<'_>) {
        match self {
            Trait::Maturity(t) => t.initialize(ctx),
            Trait::Shape(t) => t.initialize(ctx),
            Trait::Color(t) => t.initialize(ctx),
            Trait::Energy(t) => t.initialize(ctx),
        }
    }

    fn update(&mut self, ctx: &mut TraitContext<'_>) {
        match self {
            Trait::Maturity(t) => t.update(ctx),
            Trait::Shape(t) => t.update(ctx),
            Trait::Color(t) => t.update(ctx),
            Trait::Energy(t) => t.update(ctx),
        }
    }

    fn uninitialize(&mut self, ctx: &mut TraitContext<'_>) {
        match self {
            Trait::Maturity(t) => t.uninitialize(ctx),
            Trait::Shape(t) => t.uninitialize(ctx),
            Trait::Color(t) => t.uninitialize(ctx),
            Trait::Energy(t) => t.uninitialize(ctx),
        }
    }
}

impl From<MaturityTrait> for Trait {
    fn from(t: MaturityTrait) -> Self {
        Trait::Maturity(t)
    }
}

impl From<ShapeTrait> for Trait {
    fn from(t: ShapeTrait) -> Self {
        Trait::Shape(t)
    }
}

impl From<ColorTrait> for Trait {
    fn from(t: ColorTrait) -> Self {
        Trait::Color(t)
    }
}

impl From<EnergyTrait> for Trait {
    fn from(t: EnergyTrait) -> Self {
        Trait::Energy(t)
    }
}

fn unit_rate() -> f32 {
    1.0
}

/// Construction parameters for a [`Trait`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraitSpec {
    Maturity {
        max_progress: f32,
        #[serde(default = "unit_rate")]
        rate: f32,
        #[serde(default)]
        on_mature: Option<MatureAction>,
    },
    Shape {
        shape: Shape,
    },
    Color {
        color: Rgba,
    },
    Energy {
        max_level: f32,
        #[serde(default = "unit_rate")]
        depletion_rate: f32,
    },
}

impl TraitSpec {
    pub fn build(&self) -> Trait {
        match self {
            TraitSpec::Maturity {
                max_progress,
                rate,
                on_mature,
            } => {
                let mut t = MaturityTrait::new(*max_progress, *rate);
                if let Some(action) = on_mature {
                    t = t.with_action(action.clone());
                }
                t.into()
            }
            TraitSpec::Shape { shape } => ShapeTrait::new(shape.clone()).into(),
            TraitSpec::Color { color } => ColorTrait::new(*color).into(),
            TraitSpec::Energy {
                max_level,
                depletion_rate,
            } => EnergyTrait::new(*max_level, *depletion_rate).into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TraitSpec::Maturity { .. } => "Maturity",
            TraitSpec::Shape { .. } => "Shape",
            TraitSpec::Color { .. } => "Color",
            TraitSpec::Energy { .. } => "Energy",
        }
    }

    /// One spec per built-in kind with usable defaults, for the editor's
    /// "add trait" picker.
    pub fn catalog() -> Vec<TraitSpec> {
        vec![
            TraitSpec::Maturity {
                max_progress: 10.0,
                rate: 1.0,
                on_mature: None,
            },
            TraitSpec::Shape {
                shape: Shape::circle(5.0),
            },
            TraitSpec::Color { color: Rgba::GREEN },
            TraitSpec::Energy {
                max_level: 5.0,
                depletion_rate: 1.0,
            },
        ]
    }

    /// Checks numeric ranges. `owner` names the blueprint in error messages.
    pub fn validate(&self, owner: &str) -> Result<(), ConfigError> {
        let non_negative = |field: &str, value: f32| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::invalid(
                    format!("{owner}.{field}"),
                    format!("must be a finite, non-negative number (got {value})"),
                ))
            }
        };

        match self {
            TraitSpec::Maturity {
                max_progress,
                rate,
                on_mature,
            } => {
                non_negative("max_progress", *max_progress)?;
                non_negative("rate", *rate)?;
                if let Some(MatureAction::GrowChild { chance: p, .. }) = on_mature {
                    chance::check(*p)?;
                }
                Ok(())
            }
            TraitSpec::Shape { shape } => {
                non_negative("shape.width", shape.width())?;
                non_negative("shape.height", shape.height())
            }
            TraitSpec::Color { .. } => Ok(()),
            TraitSpec::Energy {
                max_level,
                depletion_rate,
            } => {
                non_negative("max_level", *max_level)?;
                non_negative("depletion_rate", *depletion_rate)
            }
        }
    }
}
