use glam::Vec2;

use crate::{
    traits::TraitSpec,
    types::{NodeId, TraitId},
};

/// A structural change deferred until the end of [`crate::scene::Scene::update`].
///
/// Queued by trait hooks through [`crate::traits::TraitContext::queue`], or
/// by UI code through [`crate::scene::Scene::queue`].
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Instantiate a blueprint and spawn it as a new organism.
    Spawn { blueprint: String, position: Vec2 },
    /// Instantiate a blueprint and attach it to `parent` on the parent's
    /// outline, in direction `angle` (degrees).
    GrowChild {
        parent: NodeId,
        blueprint: String,
        angle: f32,
    },
    Remove(NodeId),
    AddTrait { node: NodeId, spec: TraitSpec },
    RemoveTrait { node: NodeId, id: TraitId },
}
