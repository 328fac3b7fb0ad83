//! Named templates for building organisms.
//!
//! A blueprint lists the traits of its root organ and, recursively, the
//! child organs attached to it at fixed local offsets. Blueprints are plain
//! data: the scene turns them into nodes with
//! [`crate::scene::Scene::instantiate`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{
    error::ConfigError,
    shape::{Rgba, Shape},
    traits::{MatureAction, TraitSpec},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub name: String,
    #[serde(default)]
    pub traits: Vec<TraitSpec>,
    #[serde(default)]
    pub children: Vec<ChildBlueprint>,
}

/// A child organ and where it sits relative to its parent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChildBlueprint {
    #[serde(default)]
    pub offset: Vec2,
    pub blueprint: Blueprint,
}

impl Blueprint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            traits: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_trait(mut self, spec: TraitSpec) -> Self {
        self.traits.push(spec);
        self
    }

    pub fn with_child(mut self, offset: Vec2, blueprint: Blueprint) -> Self {
        self.children.push(ChildBlueprint { offset, blueprint });
        self
    }

    /// Validates every trait in this blueprint and its children.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for spec in &self.traits {
            spec.validate(&self.name)?;
        }
        for child in &self.children {
            child.blueprint.validate()?;
        }
        Ok(())
    }

    /// Names of blueprints grown by maturity actions anywhere in this tree.
    pub fn grown_blueprints(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut stack = vec![self];
        while let Some(bp) = stack.pop() {
            for spec in &bp.traits {
                if let TraitSpec::Maturity {
                    on_mature: Some(MatureAction::GrowChild { blueprint, .. }),
                    ..
                } = spec
                {
                    names.push(blueprint.as_str());
                }
            }
            stack.extend(bp.children.iter().map(|c| &c.blueprint));
        }
        names
    }

    /// The built-in library: the classic red cell plus a few organisms that
    /// grow and wither.
    pub fn defaults() -> Vec<Blueprint> {
        let shape = |shape: Shape| TraitSpec::Shape { shape };
        let color = |color: Rgba| TraitSpec::Color { color };

        let cell = Blueprint::new("cell")
            .with_trait(color(Rgba::RED))
            .with_trait(shape(Shape::rectangle(10.0, 10.0)));

        let bud = Blueprint::new("bud")
            .with_trait(shape(Shape::circle(3.0)))
            .with_trait(color(Rgba::rgb(130, 220, 90)))
            .with_trait(TraitSpec::Maturity {
                max_progress: 12.0,
                rate: 1.0,
                on_mature: Some(MatureAction::Wither),
            });

        let leaf = Blueprint::new("leaf")
            .with_trait(shape(Shape::polygon(3, 5.0).with_rotation(90.0)))
            .with_trait(color(Rgba::rgb(0, 158, 47)));

        let sprout = Blueprint::new("sprout")
            .with_trait(shape(Shape::polygon(6, 8.0)))
            .with_trait(color(Rgba::GREEN))
            .with_trait(TraitSpec::Energy {
                max_level: 10.0,
                depletion_rate: 1.0,
            })
            .with_trait(TraitSpec::Maturity {
                max_progress: 5.0,
                rate: 1.0,
                on_mature: Some(MatureAction::GrowChild {
                    blueprint: "bud".into(),
                    angle: 90.0,
                    chance: 0.75,
                }),
            })
            .with_child(Vec2::new(14.0, 0.0), leaf.clone())
            .with_child(Vec2::new(-14.0, 0.0), leaf);

        let sporeling = Blueprint::new("sporeling")
            .with_trait(shape(Shape::circle(4.0)))
            .with_trait(color(Rgba::rgb(200, 122, 255)))
            .with_trait(TraitSpec::Maturity {
                max_progress: 8.0,
                rate: 1.0,
                on_mature: Some(MatureAction::Wither),
            });

        vec![cell, sprout, bud, sporeling]
    }
}
