use glam::Vec2;
use rand::rngs::StdRng;

use crate::{
    command::Command,
    input::is_point_over_region,
    shape::Shape,
    traits::{Lifecycle, Trait, TraitContext},
    types::{NodeId, TraitId},
};

/// A trait attached to a node, with its own lazy-initialization flag.
///
/// ### Fields
/// - `id` - Scene-unique handle used by the editor and commands.
/// - `initialized` - Whether `initialize` has run; set on the owner's next
///   update after attachment.
/// - `behavior` - The trait itself.
#[derive(Clone, Debug, PartialEq)]
pub struct TraitSlot {
    id: TraitId,
    initialized: bool,
    behavior: Trait,
}

impl TraitSlot {
    pub(crate) fn new(id: TraitId, behavior: Trait) -> Self {
        Self {
            id,
            initialized: false,
            behavior,
        }
    }

    pub fn id(&self) -> TraitId {
        self.id
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn get(&self) -> &Trait {
        &self.behavior
    }

    pub fn get_mut(&mut self) -> &mut Trait {
        &mut self.behavior
    }

    pub(crate) fn into_inner(self) -> Trait {
        self.behavior
    }
}

/// An organ: one entity of an organism's tree.
///
/// Nodes live in a [`crate::scene::Scene`] arena and refer to each other by
/// [`NodeId`]. All structural and positional mutation goes through the
/// scene, which keeps parent/child links and world/local positions in sync.
#[derive(Debug)]
pub struct Node {
    pub(crate) name: String,
    pub(crate) removal_requested: bool,
    pub(crate) initialized: bool,
    pub(crate) dominant: Vec<TraitSlot>,
    pub(crate) regular: Vec<TraitSlot>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) shape: Shape,
    pub(crate) world: Vec2,
    pub(crate) local: Vec2,
}

impl Node {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            removal_requested: false,
            initialized: false,
            dominant: Vec::new(),
            regular: Vec::new(),
            children: Vec::new(),
            parent: None,
            shape: Shape::empty(),
            world: Vec2::ZERO,
            local: Vec2::ZERO,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn removal_requested(&self) -> bool {
        self.removal_requested
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn dominant_traits(&self) -> &[TraitSlot] {
        &self.dominant
    }

    pub fn regular_traits(&self) -> &[TraitSlot] {
        &self.regular
    }

    /// All traits in run order: dominant first.
    pub fn traits(&self) -> impl Iterator<Item = &TraitSlot> {
        self.dominant.iter().chain(self.regular.iter())
    }

    pub fn find_trait(&self, id: TraitId) -> Option<&TraitSlot> {
        self.traits().find(|slot| slot.id == id)
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn world(&self) -> Vec2 {
        self.world
    }

    pub fn local(&self) -> Vec2 {
        self.local
    }

    /// World-space bounding box as `(min, size)`.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        self.shape.bounds(self.world)
    }

    /// Whether `point` lies strictly inside this node's bounding box. Nodes
    /// without a shape are never hit.
    pub fn is_point_over(&self, point: Vec2) -> bool {
        if self.shape.is_empty() {
            return false;
        }
        let (min, size) = self.bounds();
        is_point_over_region(point, min.x, min.y, size.x, size.y)
    }

    /// Files the trait under the dominant or regular list.
    pub(crate) fn attach_trait(&mut self, slot: TraitSlot) {
        if slot.behavior.dominant() {
            self.dominant.push(slot);
        } else {
            self.regular.push(slot);
        }
    }

    /// Takes a trait out of its list, keeping the order of the rest.
    pub(crate) fn detach_trait(&mut self, id: TraitId) -> Option<TraitSlot> {
        for list in [&mut self.dominant, &mut self.regular] {
            if let Some(index) = list.iter().position(|slot| slot.id == id) {
                return Some(list.remove(index));
            }
        }
        None
    }

    /// Borrows a trait together with the shape it may write to.
    pub(crate) fn trait_and_shape_mut(&mut self, id: TraitId) -> Option<(&mut TraitSlot, &mut Shape)> {
        let Node {
            dominant,
            regular,
            shape,
            ..
        } = self;
        let slot = dominant
            .iter_mut()
            .chain(regular.iter_mut())
            .find(|slot| slot.id == id)?;
        Some((slot, shape))
    }

    /// Runs this node's share of an update pass: lazily initializes any
    /// trait that has not run yet, then updates every trait. Children are
    /// walked by the scene.
    pub(crate) fn run_traits(
        &mut self,
        id: NodeId,
        dt: f32,
        rng: &mut StdRng,
        commands: &mut Vec<Command>,
    ) {
        let mut ctx = TraitContext::new(id, self.world, dt, &mut self.shape, rng, commands);

        for slot in self.dominant.iter_mut().chain(self.regular.iter_mut()) {
            if !slot.initialized {
                slot.behavior.initialize(&mut ctx);
                slot.initialized = true;
            }
        }

        if !self.initialized {
            self.initialized = true;
            tracing::debug!(node = ?id, name = %self.name, "node initialized");
        }

        for slot in self.dominant.iter_mut().chain(self.regular.iter_mut()) {
            slot.behavior.update(&mut ctx);
        }
    }
}
