//! The scene root: owns every organ and runs the frame.
//!
//! Each call to [`Scene::update`] runs, in order:
//! 1. the update pass over every live organism (each node, then its children);
//! 2. the deferred [`Command`]s queued during the pass;
//! 3. the sweep, which drops removal-requested organisms from the live list
//!    and frees every removal-requested node;
//! 4. admission of pending spawns into the live list.
//!
//! Nothing structural happens while the pass is walking the tree, so a
//! spawn queued during frame K is first updated in frame K+1, and a node
//! removed during frame K is gone from frame K+1.

use glam::Vec2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use slotmap::SlotMap;

use crate::{
    blueprint::Blueprint,
    command::Command,
    config::Config,
    error::SceneError,
    node::{Node, TraitSlot},
    shape::{Canvas, Rgba, Shape},
    traits::{Lifecycle, Trait, TraitContext, TraitSpec},
    types::{NodeId, TraitId},
};

/// The scene root: every organ, the organisms being simulated and the
/// changes waiting to be applied.
///
/// ### Fields
/// - `nodes` - Arena owning every node, attached or not.
/// - `live` - Top-level organisms updated and drawn each frame, in order.
/// - `pending` - Organisms spawned since the last update.
/// - `commands` - Deferred changes, applied after the update pass.
/// - `blueprints` - Library used by [`Scene::spawn_blueprint`] and growth.
/// - `rng` - Random generator handed to trait hooks.
/// - `next_trait` - Next [`TraitId`] to hand out.
/// - `frame` - Number of completed updates.
pub struct Scene {
    nodes: SlotMap<NodeId, Node>,
    live: Vec<NodeId>,
    pending: Vec<NodeId>,
    commands: Vec<Command>,
    blueprints: Vec<Blueprint>,
    rng: StdRng,
    next_trait: u64,
    frame: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Blueprint::defaults(), None)
    }
}

impl Scene {
    /// Creates an empty scene with a blueprint library. Without a seed the
    /// random generator is seeded from the OS.
    pub fn new(blueprints: Vec<Blueprint>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            nodes: SlotMap::with_key(),
            live: Vec::new(),
            pending: Vec::new(),
            commands: Vec::new(),
            blueprints,
            rng,
            next_trait: 0,
            frame: 0,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.blueprints.clone(), config.seed)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Top-level organisms updated and drawn this frame, in order.
    pub fn live(&self) -> &[NodeId] {
        &self.live
    }

    /// Organisms spawned this frame, admitted at the end of the next update.
    pub fn pending(&self) -> &[NodeId] {
        &self.pending
    }

    /// Number of nodes in the arena, attached or not.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of completed [`Scene::update`] calls.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn blueprints(&self) -> &[Blueprint] {
        &self.blueprints
    }

    pub fn blueprint(&self, name: &str) -> Option<&Blueprint> {
        self.blueprints.iter().find(|bp| bp.name == name)
    }

    /// Live nodes in draw order: each organism depth-first, parents before
    /// children.
    pub fn draw_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        for &root in &self.live {
            self.collect_subtree(root, &mut order);
        }
        order
    }

    /// `id` followed by all of its descendants, depth-first.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_subtree(id, &mut out);
        out
    }

    fn collect_subtree(&self, id: NodeId, out: &mut Vec<NodeId>) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        out.push(id);
        for &child in &node.children {
            self.collect_subtree(child, out);
        }
    }

    /// Topmost live node whose bounds contain `point`: the one drawn last.
    pub fn pick(&self, point: Vec2) -> Option<NodeId> {
        self.draw_order()
            .into_iter()
            .rev()
            .find(|&id| self.nodes.get(id).is_some_and(|n| n.is_point_over(point)))
    }

    fn is_ancestor(&self, ancestor: NodeId, mut node: NodeId) -> bool {
        while let Some(parent) = self.nodes.get(node).and_then(|n| n.parent) {
            if parent == ancestor {
                return true;
            }
            node = parent;
        }
        false
    }

    fn parent_world(&self, id: NodeId) -> Option<Vec2> {
        let parent = self.nodes.get(id)?.parent?;
        self.nodes.get(parent).map(|p| p.world)
    }

    // ------------------------------------------------------------------
    // Construction and spawning
    // ------------------------------------------------------------------

    /// Adds a detached node built from `specs`. It is neither live nor
    /// pending until spawned or attached.
    pub fn create(&mut self, name: &str, specs: &[TraitSpec]) -> NodeId {
        let id = self.nodes.insert(Node::new(name));
        for spec in specs {
            self.add_trait(id, spec);
        }
        id
    }

    /// Builds a blueprint's whole tree and returns the detached root.
    pub fn instantiate(&mut self, blueprint: &Blueprint) -> NodeId {
        let id = self.create(&blueprint.name, &blueprint.traits);
        for child in &blueprint.children {
            let child_id = self.instantiate(&child.blueprint);
            self.link(id, child_id);
            self.move_local(child_id, child.offset);
        }
        id
    }

    pub fn instantiate_named(&mut self, name: &str) -> Result<NodeId, SceneError> {
        let blueprint = self
            .blueprint(name)
            .cloned()
            .ok_or_else(|| SceneError::UnknownBlueprint(name.to_string()))?;
        Ok(self.instantiate(&blueprint))
    }

    /// Places `id` at `position` and queues it as a new organism.
    ///
    /// The live list is not touched; the node joins it at the end of the
    /// next [`Scene::update`]. A node attached to a parent is detached first.
    pub fn spawn(&mut self, id: NodeId, position: Vec2) -> bool {
        if !self.nodes.contains_key(id) {
            return false;
        }

        self.unlink(id);
        self.move_world(id, position);
        if !self.live.contains(&id) && !self.pending.contains(&id) {
            self.pending.push(id);
        }
        tracing::debug!(node = ?id, x = position.x, y = position.y, "organism spawned");
        true
    }

    pub fn spawn_blueprint(&mut self, name: &str, position: Vec2) -> Result<NodeId, SceneError> {
        let id = self.instantiate_named(name)?;
        self.spawn(id, position);
        Ok(id)
    }

    // ------------------------------------------------------------------
    // Structure
    // ------------------------------------------------------------------

    /// Attaches `child` under `parent`, keeping the child where it is in
    /// world space.
    ///
    /// The child is detached from any previous parent and dropped from the
    /// live and pending lists. Neither node may be flagged for removal.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        for id in [parent, child] {
            match self.nodes.get(id) {
                None => return Err(SceneError::UnknownNode(id)),
                Some(node) if node.removal_requested => {
                    return Err(SceneError::RemovalRequested(id));
                }
                Some(_) => {}
            }
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(SceneError::Cycle { parent, child });
        }

        self.unlink(child);
        self.live.retain(|&id| id != child);
        self.pending.retain(|&id| id != child);
        self.link(parent, child);
        Ok(())
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        let Some(parent_node) = self.nodes.get_mut(parent) else {
            return;
        };
        parent_node.children.push(child);
        let parent_world = parent_node.world;

        if let Some(child_node) = self.nodes.get_mut(child) {
            child_node.parent = Some(parent);
            child_node.local = child_node.world - parent_world;
        }
    }

    fn unlink(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let Some(parent) = node.parent.take() else {
            return;
        };
        node.local = Vec2::ZERO;

        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.retain(|&c| c != id);
        }
    }

    /// Requests removal of `id` and its whole subtree.
    ///
    /// `id` is detached from its parent immediately and every descendant is
    /// detached from its own parent. Flagged nodes stay in the arena (and a
    /// flagged organism stays live) until the next sweep.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if !self.nodes.contains_key(id) {
            return false;
        }

        self.unlink(id);
        let mut stack = vec![id];
        let mut flagged = 0usize;
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get_mut(current) else {
                continue;
            };
            node.removal_requested = true;
            flagged += 1;

            let children = std::mem::take(&mut node.children);
            for child in children {
                if let Some(child_node) = self.nodes.get_mut(child) {
                    child_node.parent = None;
                    child_node.local = Vec2::ZERO;
                }
                stack.push(child);
            }
        }

        tracing::debug!(node = ?id, flagged, "removal requested");
        true
    }

    // ------------------------------------------------------------------
    // Positions
    // ------------------------------------------------------------------

    /// Sets the world position and re-derives the local one, then moves the
    /// whole subtree along.
    pub fn move_world(&mut self, id: NodeId, position: Vec2) -> bool {
        let parent_world = self.parent_world(id);
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };

        node.world = position;
        node.local = parent_world.map_or(Vec2::ZERO, |pw| position - pw);
        self.propagate(id);
        true
    }

    /// Sets the position relative to the parent and re-derives the world
    /// one, then moves the whole subtree along. For a node without a parent
    /// this is a world move.
    pub fn move_local(&mut self, id: NodeId, local: Vec2) -> bool {
        let parent_world = self.parent_world(id);
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };

        match parent_world {
            Some(pw) => {
                node.local = local;
                node.world = pw + local;
            }
            None => {
                node.world = local;
                node.local = Vec2::ZERO;
            }
        }
        self.propagate(id);
        true
    }

    fn propagate(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            let world = node.world;
            let children = node.children.clone();

            for child in children {
                if let Some(child_node) = self.nodes.get_mut(child) {
                    child_node.world = world + child_node.local;
                    stack.push(child);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Traits
    // ------------------------------------------------------------------

    /// Attaches a new trait. It is initialized at the start of the node's
    /// next update.
    pub fn add_trait(&mut self, id: NodeId, spec: &TraitSpec) -> Option<TraitId> {
        let node = self.nodes.get_mut(id)?;
        let trait_id = TraitId(self.next_trait);
        self.next_trait += 1;
        node.attach_trait(TraitSlot::new(trait_id, spec.build()));
        Some(trait_id)
    }

    /// Detaches a trait, undoing its initialization first if it ran.
    pub fn remove_trait(&mut self, id: NodeId, trait_id: TraitId) -> Option<Trait> {
        let node = self.nodes.get_mut(id)?;
        let mut slot = node.detach_trait(trait_id)?;

        if slot.is_initialized() {
            let mut ctx = TraitContext::new(
                id,
                node.world,
                0.0,
                &mut node.shape,
                &mut self.rng,
                &mut self.commands,
            );
            slot.get_mut().uninitialize(&mut ctx);
        }
        Some(slot.into_inner())
    }

    /// Runs `f` on a trait and the shape of the node that owns it.
    pub fn edit_trait<R>(
        &mut self,
        id: NodeId,
        trait_id: TraitId,
        f: impl FnOnce(&mut Trait, &mut Shape) -> R,
    ) -> Option<R> {
        let (slot, shape) = self.nodes.get_mut(id)?.trait_and_shape_mut(trait_id)?;
        Some(f(slot.get_mut(), shape))
    }

    /// Recolors a color trait; the node's shape follows once the trait is
    /// initialized.
    pub fn set_color(&mut self, id: NodeId, trait_id: TraitId, color: Rgba) -> bool {
        self.edit_trait(id, trait_id, |t, shape| match t {
            Trait::Color(c) => {
                c.set_color(color, shape);
                true
            }
            _ => false,
        })
        .unwrap_or(false)
    }

    pub fn replenish(&mut self, id: NodeId, trait_id: TraitId) -> bool {
        self.edit_trait(id, trait_id, |t, _| match t {
            Trait::Energy(e) => {
                e.replenish();
                true
            }
            _ => false,
        })
        .unwrap_or(false)
    }

    // ------------------------------------------------------------------
    // Frame
    // ------------------------------------------------------------------

    /// Defers a change to the end of the next (or current) update.
    pub fn queue(&mut self, command: Command) {
        self.commands.push(command);
    }

    /// Advances the scene by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        // Hooks can only queue commands, so the live list is stable here.
        for index in 0..self.live.len() {
            let id = self.live[index];
            self.update_node(id, dt);
        }

        self.apply_commands();
        self.sweep();
        self.admit_pending();
        self.frame += 1;
    }

    fn update_node(&mut self, id: NodeId, dt: f32) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        node.run_traits(id, dt, &mut self.rng, &mut self.commands);

        let children = node.children.clone();
        for child in children {
            self.update_node(child, dt);
        }
    }

    fn apply_commands(&mut self) {
        let commands = std::mem::take(&mut self.commands);
        for command in commands {
            self.apply(command);
        }
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Spawn {
                blueprint,
                position,
            } => {
                if let Err(err) = self.spawn_blueprint(&blueprint, position) {
                    tracing::warn!(%err, "spawn command ignored");
                }
            }
            Command::GrowChild {
                parent,
                blueprint,
                angle,
            } => self.grow_child(parent, &blueprint, angle),
            Command::Remove(id) => {
                self.remove(id);
            }
            Command::AddTrait { node, spec } => {
                if self.add_trait(node, &spec).is_none() {
                    tracing::warn!(node = ?node, "add-trait command for missing node ignored");
                }
            }
            Command::RemoveTrait { node, id } => {
                if self.remove_trait(node, id).is_none() {
                    tracing::warn!(node = ?node, trait_id = %id, "remove-trait command ignored");
                }
            }
        }
    }

    fn grow_child(&mut self, parent: NodeId, blueprint: &str, angle: f32) {
        let Some(parent_node) = self.nodes.get(parent) else {
            return;
        };
        if parent_node.removal_requested {
            return;
        }
        let edge = parent_node.shape.edge_point(angle.to_radians());

        match self.instantiate_named(blueprint) {
            Ok(child) => {
                self.link(parent, child);
                self.move_local(child, edge);
                tracing::debug!(parent = ?parent, child = ?child, %blueprint, "organ grown");
            }
            Err(err) => tracing::warn!(%err, "grow command ignored"),
        }
    }

    fn sweep(&mut self) {
        let nodes = &self.nodes;
        self.live
            .retain(|&id| nodes.get(id).is_some_and(|n| !n.removal_requested));

        let before = self.nodes.len();
        self.nodes.retain(|_, node| !node.removal_requested);
        let swept = before - self.nodes.len();
        if swept > 0 {
            tracing::debug!(swept, frame = self.frame, "swept removed organs");
        }
    }

    fn admit_pending(&mut self) {
        for id in std::mem::take(&mut self.pending) {
            if self.nodes.contains_key(id) && !self.live.contains(&id) {
                self.live.push(id);
            }
        }
    }

    /// Draws every live organism, parents beneath children.
    pub fn draw<C: Canvas>(&self, canvas: &mut C) {
        for &id in &self.live {
            self.draw_node(id, canvas);
        }
    }

    fn draw_node<C: Canvas>(&self, id: NodeId, canvas: &mut C) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        node.shape.render(node.world, canvas);
        for &child in &node.children {
            self.draw_node(child, canvas);
        }
    }

    /// Drops every node and queued change. Blueprints and the random
    /// generator are kept.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.live.clear();
        self.pending.clear();
        self.commands.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::tests::RecordingCanvas;
    use crate::traits::MatureAction;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn scene() -> Scene {
        Scene::new(Blueprint::defaults(), Some(1))
    }

    fn assert_close(a: Vec2, b: Vec2) {
        assert!((a - b).length() < 1e-4, "{a:?} != {b:?}");
    }

    fn world(scene: &Scene, id: NodeId) -> Vec2 {
        scene.node(id).map(|n| n.world()).unwrap()
    }

    fn local(scene: &Scene, id: NodeId) -> Vec2 {
        scene.node(id).map(|n| n.local()).unwrap()
    }

    /// root -> a -> b -> c, all detached from the live list.
    fn chain(scene: &mut Scene) -> [NodeId; 4] {
        let ids = [
            scene.create("root", &[]),
            scene.create("a", &[]),
            scene.create("b", &[]),
            scene.create("c", &[]),
        ];
        for pair in ids.windows(2) {
            scene.add_child(pair[0], pair[1]).unwrap();
        }
        ids
    }

    #[test]
    fn spawn_becomes_live_after_the_frame() {
        let mut scene = scene();
        let id = scene.spawn_blueprint("cell", Vec2::new(5.0, 5.0)).unwrap();

        assert!(scene.live().is_empty());
        assert_eq!(scene.pending(), &[id]);
        assert_eq!(world(&scene, id), Vec2::new(5.0, 5.0));

        // Frame K: admitted at the end, but not updated.
        scene.update(DT);
        assert_eq!(scene.live(), &[id]);
        assert!(scene.pending().is_empty());
        assert!(!scene.node(id).unwrap().is_initialized());

        // Frame K+1: updated and drawn.
        scene.update(DT);
        let node = scene.node(id).unwrap();
        assert!(node.is_initialized());
        assert_eq!(node.shape().color, Rgba::RED);

        let mut canvas = RecordingCanvas::default();
        scene.draw(&mut canvas);
        assert_eq!(canvas.calls, vec![("rectangle", Vec2::new(5.0, 5.0), Rgba::RED)]);
    }

    #[test]
    fn queued_spawn_is_not_updated_in_its_frame() {
        let mut scene = scene();
        scene.queue(Command::Spawn {
            blueprint: "cell".into(),
            position: Vec2::new(1.0, 2.0),
        });

        scene.update(DT);
        assert_eq!(scene.live().len(), 1);
        let id = scene.live()[0];
        assert!(!scene.node(id).unwrap().is_initialized());

        scene.update(DT);
        assert!(scene.node(id).unwrap().is_initialized());
    }

    #[test]
    fn unknown_blueprint_is_an_error() {
        let mut scene = scene();
        assert_eq!(
            scene.spawn_blueprint("dragon", Vec2::ZERO),
            Err(SceneError::UnknownBlueprint("dragon".into()))
        );
        assert_eq!(scene.node_count(), 0);
    }

    #[test]
    fn removal_cascades_and_detaches() {
        let mut scene = scene();
        let parent = scene.create("parent", &[]);
        let node = scene.create("node", &[]);
        let left = scene.create("left", &[]);
        let right = scene.create("right", &[]);
        scene.add_child(parent, node).unwrap();
        scene.add_child(node, left).unwrap();
        scene.add_child(node, right).unwrap();
        scene.spawn(parent, Vec2::ZERO);
        scene.update(DT);

        assert!(scene.remove(node));

        for id in [node, left, right] {
            assert!(scene.node(id).unwrap().removal_requested());
        }
        let parent_node = scene.node(parent).unwrap();
        assert!(!parent_node.removal_requested());
        assert!(parent_node.children().is_empty());
        assert_eq!(scene.node(node).unwrap().parent(), None);

        scene.update(DT);
        for id in [node, left, right] {
            assert!(!scene.contains(id));
        }
        assert_eq!(scene.live(), &[parent]);
    }

    #[test]
    fn removed_organism_stays_live_until_the_sweep() {
        let mut scene = scene();
        let id = scene.spawn_blueprint("cell", Vec2::ZERO).unwrap();
        scene.update(DT);
        scene.update(DT);

        scene.remove(id);
        assert_eq!(scene.live(), &[id]);

        let mut canvas = RecordingCanvas::default();
        scene.draw(&mut canvas);
        assert_eq!(canvas.calls.len(), 1);

        scene.update(DT);
        assert!(scene.live().is_empty());
        assert!(!scene.contains(id));
    }

    #[test]
    fn pending_node_removed_before_admission_never_goes_live() {
        let mut scene = scene();
        let id = scene.spawn_blueprint("cell", Vec2::ZERO).unwrap();
        scene.remove(id);
        scene.update(DT);
        assert!(scene.live().is_empty());
        assert!(scene.pending().is_empty());
        assert!(!scene.contains(id));
    }

    #[test]
    fn moves_propagate_through_the_whole_subtree() {
        let mut scene = scene();
        let [root, a, b, c] = chain(&mut scene);

        scene.move_local(b, Vec2::new(1.0, 0.0));
        scene.move_local(c, Vec2::new(0.0, 1.0));
        scene.move_world(root, Vec2::new(10.0, 10.0));

        assert_close(world(&scene, a), Vec2::new(10.0, 10.0));
        assert_close(world(&scene, b), Vec2::new(11.0, 10.0));
        assert_close(world(&scene, c), Vec2::new(11.0, 11.0));

        scene.move_world(a, Vec2::new(0.0, 0.0));
        assert_close(local(&scene, a), Vec2::new(-10.0, -10.0));
        assert_close(world(&scene, c), Vec2::new(1.0, 1.0));

        assert_eq!(local(&scene, root), Vec2::ZERO);
    }

    #[test]
    fn move_local_on_a_root_is_a_world_move() {
        let mut scene = scene();
        let root = scene.create("root", &[]);
        scene.move_local(root, Vec2::new(3.0, 4.0));
        assert_eq!(world(&scene, root), Vec2::new(3.0, 4.0));
        assert_eq!(local(&scene, root), Vec2::ZERO);
    }

    #[test]
    fn add_child_keeps_world_position() {
        let mut scene = scene();
        let parent = scene.create("parent", &[]);
        let child = scene.create("child", &[]);
        scene.move_world(parent, Vec2::new(5.0, 0.0));
        scene.move_world(child, Vec2::new(7.0, 2.0));

        scene.add_child(parent, child).unwrap();
        assert_eq!(world(&scene, child), Vec2::new(7.0, 2.0));
        assert_eq!(local(&scene, child), Vec2::new(2.0, 2.0));
        assert_eq!(scene.node(child).unwrap().parent(), Some(parent));
        assert_eq!(scene.node(parent).unwrap().children(), &[child]);
    }

    #[test]
    fn add_child_reparents_and_leaves_the_live_list() {
        let mut scene = scene();
        let first = scene.create("first", &[]);
        let second = scene.create("second", &[]);
        let child = scene.create("child", &[]);
        scene.spawn(child, Vec2::ZERO);
        scene.add_child(first, child).unwrap();
        assert!(scene.pending().is_empty());

        scene.add_child(second, child).unwrap();
        assert!(scene.node(first).unwrap().children().is_empty());
        assert_eq!(scene.node(second).unwrap().children(), &[child]);
        assert_eq!(scene.node(child).unwrap().parent(), Some(second));
    }

    #[test]
    fn add_child_rejects_cycles_and_unknown_nodes() {
        let mut scene = scene();
        let [root, _, _, c] = chain(&mut scene);

        assert_eq!(
            scene.add_child(c, root),
            Err(SceneError::Cycle {
                parent: c,
                child: root
            })
        );
        assert_eq!(
            scene.add_child(root, root),
            Err(SceneError::Cycle {
                parent: root,
                child: root
            })
        );

        let gone = scene.create("gone", &[]);
        scene.remove(gone);
        scene.update(DT);
        assert_eq!(scene.add_child(root, gone), Err(SceneError::UnknownNode(gone)));
    }

    #[test]
    fn add_child_rejects_nodes_being_removed() {
        let mut scene = scene();
        let parent = scene.spawn_blueprint("cell", Vec2::ZERO).unwrap();
        scene.update(DT);
        scene.remove(parent);

        let late = scene.create("late", &[]);
        assert_eq!(
            scene.add_child(parent, late),
            Err(SceneError::RemovalRequested(parent))
        );
        let other = scene.create("other", &[]);
        assert_eq!(
            scene.add_child(other, parent),
            Err(SceneError::RemovalRequested(parent))
        );

        scene.update(DT);
        assert!(!scene.contains(parent));
        assert_eq!(scene.node(late).unwrap().parent(), None);
        assert!(scene.node(other).unwrap().children().is_empty());
    }

    #[test]
    fn queued_add_trait_lands_after_the_pass() {
        let mut scene = scene();
        let id = scene.spawn_blueprint("cell", Vec2::ZERO).unwrap();
        scene.update(DT);
        scene.update(DT);
        let before = scene.node(id).unwrap().traits().count();

        scene.queue(Command::AddTrait {
            node: id,
            spec: TraitSpec::Energy {
                max_level: 5.0,
                depletion_rate: 1.0,
            },
        });
        assert_eq!(scene.node(id).unwrap().traits().count(), before);

        scene.update(DT);
        let node = scene.node(id).unwrap();
        assert_eq!(node.traits().count(), before + 1);
        let added = node.dominant_traits().last().unwrap();
        assert!(matches!(added.get(), Trait::Energy(_)));
        assert!(!added.is_initialized());
        let added_id = added.id();

        scene.update(DT);
        assert!(scene.node(id).unwrap().find_trait(added_id).unwrap().is_initialized());
    }

    #[test]
    fn queued_remove_trait_restores_the_color() {
        let mut scene = scene();
        let id = scene.spawn_blueprint("cell", Vec2::ZERO).unwrap();
        scene.update(DT);
        scene.update(DT);
        let color_id = scene.node(id).unwrap().regular_traits()[0].id();

        scene.queue(Command::RemoveTrait { node: id, id: color_id });
        assert_eq!(scene.node(id).unwrap().shape().color, Rgba::RED);

        scene.update(DT);
        let node = scene.node(id).unwrap();
        assert_eq!(node.shape().color, Rgba::WHITE);
        assert!(node.find_trait(color_id).is_none());
    }

    #[test]
    fn trait_commands_for_swept_nodes_are_ignored() {
        let mut scene = scene();
        let id = scene.spawn_blueprint("cell", Vec2::ZERO).unwrap();
        scene.update(DT);
        scene.update(DT);
        let color_id = scene.node(id).unwrap().regular_traits()[0].id();
        scene.remove(id);
        scene.update(DT);
        assert!(!scene.contains(id));

        scene.queue(Command::AddTrait {
            node: id,
            spec: TraitSpec::Color { color: Rgba::BLUE },
        });
        scene.queue(Command::RemoveTrait { node: id, id: color_id });
        scene.update(DT);

        assert!(!scene.contains(id));
        assert_eq!(scene.node_count(), 0);
        assert_eq!(scene.frame(), 4);
    }

    #[test]
    fn blueprint_children_sit_at_their_offsets() {
        let mut scene = scene();
        let id = scene.spawn_blueprint("sprout", Vec2::new(100.0, 50.0)).unwrap();
        let children = scene.node(id).unwrap().children().to_vec();

        assert_eq!(children.len(), 2);
        assert_close(world(&scene, children[0]), Vec2::new(114.0, 50.0));
        assert_close(world(&scene, children[1]), Vec2::new(86.0, 50.0));
        assert_eq!(scene.subtree(id).len(), 3);
    }

    #[test]
    fn removing_an_initialized_color_restores_the_shape() {
        let mut scene = scene();
        let id = scene.spawn_blueprint("cell", Vec2::ZERO).unwrap();
        scene.update(DT);
        scene.update(DT);

        let color_id = scene.node(id).unwrap().regular_traits()[0].id();
        assert!(scene.set_color(id, color_id, Rgba::BLUE));
        assert_eq!(scene.node(id).unwrap().shape().color, Rgba::BLUE);

        let removed = scene.remove_trait(id, color_id);
        assert!(matches!(removed, Some(Trait::Color(_))));
        assert_eq!(scene.node(id).unwrap().shape().color, Rgba::WHITE);
        assert!(scene.node(id).unwrap().find_trait(color_id).is_none());
    }

    #[test]
    fn trait_added_later_initializes_on_next_update() {
        let mut scene = scene();
        let id = scene.spawn_blueprint("cell", Vec2::ZERO).unwrap();
        scene.update(DT);
        scene.update(DT);

        let energy = scene
            .add_trait(
                id,
                &TraitSpec::Energy {
                    max_level: 5.0,
                    depletion_rate: 2.0,
                },
            )
            .unwrap();
        assert!(!scene.node(id).unwrap().find_trait(energy).unwrap().is_initialized());

        scene.update(1.0);
        let slot = scene.node(id).unwrap().find_trait(energy).unwrap();
        assert!(slot.is_initialized());
        assert!(matches!(slot.get(), Trait::Energy(e) if e.level == 3.0));

        assert!(scene.replenish(id, energy));
        assert!(!scene.replenish(id, TraitId(9_999)));
    }

    #[test]
    fn uninitialized_trait_is_removed_without_side_effects() {
        let mut scene = scene();
        let id = scene.create("plain", &[]);
        let color = scene.add_trait(id, &TraitSpec::Color { color: Rgba::RED }).unwrap();
        let removed = scene.remove_trait(id, color);
        assert!(matches!(removed, Some(Trait::Color(c)) if c.snapshot().is_none()));
        assert_eq!(scene.node(id).unwrap().shape().color, Rgba::WHITE);
    }

    #[test]
    fn maturity_grows_exactly_one_child_on_the_outline() {
        let seed = Blueprint::new("seed")
            .with_trait(TraitSpec::Shape {
                shape: Shape::circle(5.0),
            })
            .with_trait(TraitSpec::Maturity {
                max_progress: 1.0,
                rate: 1.0,
                on_mature: Some(MatureAction::GrowChild {
                    blueprint: "bud".into(),
                    angle: 0.0,
                    chance: 1.0,
                }),
            });
        let bud = Blueprint::new("bud").with_trait(TraitSpec::Shape {
            shape: Shape::circle(1.0),
        });
        let mut scene = Scene::new(vec![seed, bud], Some(3));

        let id = scene.spawn_blueprint("seed", Vec2::new(10.0, 0.0)).unwrap();
        scene.update(DT);
        scene.update(1.0);

        let children = scene.node(id).unwrap().children().to_vec();
        assert_eq!(children.len(), 1);
        assert_close(world(&scene, children[0]), Vec2::new(15.0, 0.0));
        assert_eq!(scene.node(children[0]).unwrap().name(), "bud");

        for _ in 0..30 {
            scene.update(1.0);
        }
        assert_eq!(scene.node(id).unwrap().children().len(), 1);
    }

    #[test]
    fn withering_organism_leaves_after_maturing() {
        let mut scene = scene();
        let id = scene.spawn_blueprint("sporeling", Vec2::ZERO).unwrap();
        scene.update(DT);

        for _ in 0..7 {
            scene.update(1.0);
        }
        assert!(scene.contains(id));

        scene.update(1.0);
        assert!(!scene.contains(id));
        assert!(scene.live().is_empty());
    }

    #[test]
    fn draw_and_pick_follow_tree_order() {
        let parent_bp = Blueprint::new("parent")
            .with_trait(TraitSpec::Shape {
                shape: Shape::rectangle(10.0, 10.0),
            })
            .with_child(
                Vec2::new(1.0, 0.0),
                Blueprint::new("child").with_trait(TraitSpec::Shape {
                    shape: Shape::circle(2.0),
                }),
            );
        let mut scene = Scene::new(vec![parent_bp], Some(0));
        let id = scene.spawn_blueprint("parent", Vec2::ZERO).unwrap();
        scene.update(DT);
        scene.update(DT);

        let mut canvas = RecordingCanvas::default();
        scene.draw(&mut canvas);
        let kinds: Vec<&str> = canvas.calls.iter().map(|c| c.0).collect();
        assert_eq!(kinds, vec!["rectangle", "circle"]);

        let child = scene.node(id).unwrap().children()[0];
        assert_eq!(scene.pick(Vec2::new(1.0, 0.0)), Some(child));
        assert_eq!(scene.pick(Vec2::new(-4.0, -4.0)), Some(id));
        assert_eq!(scene.pick(Vec2::new(100.0, 100.0)), None);
    }

    #[test]
    fn clear_empties_the_scene() {
        let mut scene = scene();
        scene.spawn_blueprint("cell", Vec2::ZERO).unwrap();
        scene.update(DT);
        scene.clear();
        assert_eq!(scene.node_count(), 0);
        assert!(scene.live().is_empty());
        assert!(scene.blueprint("cell").is_some());
    }

    proptest! {
        #[test]
        fn world_equals_parent_world_plus_local(
            moves in prop::collection::vec(
                (0usize..4, any::<bool>(), -100.0f32..100.0, -100.0f32..100.0),
                1..32,
            )
        ) {
            let mut scene = scene();
            let ids = chain(&mut scene);

            for (index, is_world, x, y) in moves {
                let target = Vec2::new(x, y);
                if is_world {
                    scene.move_world(ids[index], target);
                } else {
                    scene.move_local(ids[index], target);
                }
            }

            prop_assert_eq!(local(&scene, ids[0]), Vec2::ZERO);
            for pair in ids.windows(2) {
                let expected = world(&scene, pair[0]) + local(&scene, pair[1]);
                prop_assert!((world(&scene, pair[1]) - expected).length() < 1e-3);
            }
        }
    }
}
