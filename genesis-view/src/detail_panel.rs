//! Right-hand panel showing the selected organ.
//!
//! The panel only reads the scene while it draws. Everything the user does
//! is returned as [`PanelAction`]s, which the viewer applies once the
//! frame's update and draw are done.

use genesis_core::{
    scene::Scene,
    shape::Rgba,
    traits::{MatureAction, Trait, TraitSpec},
    types::{NodeId, TraitId},
};
use glam::Vec2;
use rand::Rng;

use crate::canvas::color32;

/// A change to one field of an attached trait.
#[derive(Clone, Debug, PartialEq)]
pub enum TraitEdit {
    Color(Rgba),
    Replenish,
    MaturityMax(f32),
    MaturityRate(f32),
    DepletionRate(f32),
}

/// Something the user asked for in the detail panel, applied by [`apply`]
/// after the frame's update and draw.
#[derive(Clone, Debug, PartialEq)]
pub enum PanelAction {
    Select(Option<NodeId>),
    MoveWorld(NodeId, Vec2),
    MoveLocal(NodeId, Vec2),
    AddTrait(NodeId, TraitSpec),
    RemoveTrait(NodeId, TraitId),
    Edit {
        node: NodeId,
        id: TraitId,
        edit: TraitEdit,
    },
    /// Removes the node and selects its parent.
    Delete(NodeId),
}

fn random_color(rng: &mut impl Rng) -> Rgba {
    Rgba::rgb(rng.random(), rng.random(), rng.random())
}

/// Applies one action to the scene and the viewer's selection. New color
/// traits get a random color.
pub fn apply(
    scene: &mut Scene,
    selected: &mut Option<NodeId>,
    action: PanelAction,
    rng: &mut impl Rng,
) {
    match action {
        PanelAction::Select(id) => *selected = id,
        PanelAction::MoveWorld(id, position) => {
            scene.move_world(id, position);
        }
        PanelAction::MoveLocal(id, position) => {
            scene.move_local(id, position);
        }
        PanelAction::AddTrait(id, mut spec) => {
            if let TraitSpec::Color { color } = &mut spec {
                *color = random_color(rng);
            }
            if let Some(trait_id) = scene.add_trait(id, &spec) {
                tracing::debug!(node = ?id, %trait_id, kind = spec.name(), "trait added");
            }
        }
        PanelAction::RemoveTrait(id, trait_id) => {
            scene.remove_trait(id, trait_id);
        }
        PanelAction::Edit { node, id, edit } => match edit {
            TraitEdit::Color(color) => {
                scene.set_color(node, id, color);
            }
            TraitEdit::Replenish => {
                scene.replenish(node, id);
            }
            TraitEdit::MaturityMax(value) => {
                scene.edit_trait(node, id, |t, _| {
                    if let Trait::Maturity(m) = t {
                        m.max_progress = value.max(0.0);
                    }
                });
            }
            TraitEdit::MaturityRate(value) => {
                scene.edit_trait(node, id, |t, _| {
                    if let Trait::Maturity(m) = t {
                        m.rate = value.max(0.0);
                    }
                });
            }
            TraitEdit::DepletionRate(value) => {
                scene.edit_trait(node, id, |t, _| {
                    if let Trait::Energy(e) = t {
                        e.depletion_rate = value.max(0.0);
                    }
                });
            }
        },
        PanelAction::Delete(id) => {
            let parent = scene.node(id).and_then(|n| n.parent());
            scene.remove(id);
            *selected = parent;
        }
    }
}

/// Detail panel state that outlives a frame.
///
/// ### Fields
/// - `add_choice` - Index into [`TraitSpec::catalog`] picked for "Add trait".
#[derive(Default)]
pub struct DetailPanel {
    add_choice: usize,
}

impl DetailPanel {
    pub fn show(&mut self, ui: &mut egui::Ui, scene: &Scene, id: NodeId) -> Vec<PanelAction> {
        let mut actions = Vec::new();
        let Some(node) = scene.node(id) else {
            ui.label("Nothing selected");
            return actions;
        };

        ui.heading(node.name());
        ui.weak(format!("{id:?}"));
        ui.label(format!("Shape: {}", node.shape().name()));
        if node.removal_requested() {
            ui.colored_label(egui::Color32::LIGHT_RED, "Removal requested");
        }

        ui.separator();
        ui.label("Position");
        let mut world = node.world();
        if vec2_editor(ui, "world", &mut world) {
            actions.push(PanelAction::MoveWorld(id, world));
        }
        if node.parent().is_some() {
            let mut local = node.local();
            if vec2_editor(ui, "local", &mut local) {
                actions.push(PanelAction::MoveLocal(id, local));
            }
        }

        ui.separator();
        ui.label("Hierarchy");
        match node.parent() {
            Some(parent) => {
                if ui.button(format!("⬆ {}", node_label(scene, parent))).clicked() {
                    actions.push(PanelAction::Select(Some(parent)));
                }
            }
            None => {
                ui.weak("No parent");
            }
        }
        for &child in node.children() {
            if ui.button(format!("↳ {}", node_label(scene, child))).clicked() {
                actions.push(PanelAction::Select(Some(child)));
            }
        }

        for (heading, slots) in [
            ("Dominant traits", node.dominant_traits()),
            ("Regular traits", node.regular_traits()),
        ] {
            ui.separator();
            ui.label(heading);
            if slots.is_empty() {
                ui.weak("none");
            }
            for slot in slots {
                ui.group(|ui| {
                    ui.horizontal(|ui| {
                        ui.strong(slot.get().name());
                        ui.weak(slot.id().to_string());
                        if !slot.is_initialized() {
                            ui.weak("(pending)");
                        }
                        if ui.small_button("✖").on_hover_text("Remove trait").clicked() {
                            actions.push(PanelAction::RemoveTrait(id, slot.id()));
                        }
                    });
                    if let Some(edit) = trait_editor(ui, slot.get()) {
                        actions.push(PanelAction::Edit {
                            node: id,
                            id: slot.id(),
                            edit,
                        });
                    }
                });
            }
        }

        ui.separator();
        let catalog = TraitSpec::catalog();
        ui.horizontal(|ui| {
            let selected_name = catalog.get(self.add_choice).map_or("", |s| s.name());
            egui::ComboBox::from_id_salt("add_trait")
                .selected_text(selected_name)
                .show_ui(ui, |ui| {
                    for (index, spec) in catalog.iter().enumerate() {
                        ui.selectable_value(&mut self.add_choice, index, spec.name());
                    }
                });
            if ui.button("Add trait").clicked()
                && let Some(spec) = catalog.get(self.add_choice)
            {
                actions.push(PanelAction::AddTrait(id, spec.clone()));
            }
        });

        ui.separator();
        if ui.button("🗑 Delete").clicked() {
            actions.push(PanelAction::Delete(id));
        }

        actions
    }
}

fn node_label(scene: &Scene, id: NodeId) -> String {
    let name = scene.node(id).map_or("?", |n| n.name());
    format!("{name} {id:?}")
}

fn vec2_editor(ui: &mut egui::Ui, label: &str, value: &mut Vec2) -> bool {
    ui.horizontal(|ui| {
        ui.label(label);
        let x = ui
            .add(egui::DragValue::new(&mut value.x).speed(0.5).prefix("x: "))
            .changed();
        let y = ui
            .add(egui::DragValue::new(&mut value.y).speed(0.5).prefix("y: "))
            .changed();
        x || y
    })
    .inner
}

fn drag_f32(ui: &mut egui::Ui, label: &str, value: f32) -> Option<f32> {
    let mut value = value;
    ui.horizontal(|ui| {
        ui.label(label);
        ui.add(
            egui::DragValue::new(&mut value)
                .range(0.0..=1000.0)
                .speed(0.1),
        )
        .changed()
    })
    .inner
    .then_some(value)
}

fn mature_action_label(action: Option<&MatureAction>) -> String {
    match action {
        Some(MatureAction::GrowChild {
            blueprint,
            angle,
            chance,
        }) => format!(
            "on mature: grow `{blueprint}` at {angle:.0}° ({:.0}%)",
            chance * 100.0
        ),
        Some(MatureAction::Wither) => "on mature: wither".to_string(),
        None => "on mature: nothing".to_string(),
    }
}

fn trait_editor(ui: &mut egui::Ui, behavior: &Trait) -> Option<TraitEdit> {
    match behavior {
        Trait::Maturity(m) => {
            ui.add(egui::ProgressBar::new(m.fraction()).text(format!(
                "{:.1} / {:.1}",
                m.current_progress, m.max_progress
            )));
            if m.reached_max() {
                ui.weak("mature");
            }
            ui.weak(mature_action_label(m.on_mature()));
            let max = drag_f32(ui, "max:", m.max_progress).map(TraitEdit::MaturityMax);
            let rate = drag_f32(ui, "rate:", m.rate).map(TraitEdit::MaturityRate);
            max.or(rate)
        }
        Trait::Energy(e) => {
            ui.add(
                egui::ProgressBar::new(e.fraction())
                    .text(format!("{:.1} / {:.1}", e.level, e.max_level)),
            );
            let rate = drag_f32(ui, "depletion:", e.depletion_rate).map(TraitEdit::DepletionRate);
            let replenish = ui.button("Replenish").clicked().then_some(TraitEdit::Replenish);
            rate.or(replenish)
        }
        Trait::Color(c) => {
            let mut color = color32(c.color());
            ui.color_edit_button_srgba(&mut color)
                .changed()
                .then(|| {
                    let [r, g, b, a] = color.to_srgba_unmultiplied();
                    TraitEdit::Color(Rgba::new(r, g, b, a))
                })
        }
        Trait::Shape(s) => {
            ui.label(s.shape.name());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genesis_core::blueprint::Blueprint;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn setup() -> (Scene, StdRng, NodeId) {
        let mut scene = Scene::new(Blueprint::defaults(), Some(5));
        let id = scene.spawn_blueprint("sprout", Vec2::ZERO).unwrap();
        scene.update(1.0 / 60.0);
        scene.update(1.0 / 60.0);
        (scene, StdRng::seed_from_u64(5), id)
    }

    #[test]
    fn mature_action_labels() {
        let grow = MatureAction::GrowChild {
            blueprint: "bud".into(),
            angle: 90.0,
            chance: 0.75,
        };
        assert_eq!(
            mature_action_label(Some(&grow)),
            "on mature: grow `bud` at 90° (75%)"
        );
        assert_eq!(mature_action_label(Some(&MatureAction::Wither)), "on mature: wither");
        assert_eq!(mature_action_label(None), "on mature: nothing");
    }

    #[test]
    fn delete_selects_the_parent() {
        let (mut scene, mut rng, root) = setup();
        let leaf = scene.node(root).unwrap().children()[0];
        let mut selected = Some(leaf);

        apply(&mut scene, &mut selected, PanelAction::Delete(leaf), &mut rng);

        assert_eq!(selected, Some(root));
        assert!(scene.node(leaf).unwrap().removal_requested());
        assert_eq!(scene.node(root).unwrap().children().len(), 1);

        apply(&mut scene, &mut selected, PanelAction::Delete(root), &mut rng);
        assert_eq!(selected, None);
    }

    #[test]
    fn moving_a_root_moves_its_children() {
        let (mut scene, mut rng, root) = setup();
        let leaf = scene.node(root).unwrap().children()[0];
        let mut selected = None;

        apply(
            &mut scene,
            &mut selected,
            PanelAction::MoveWorld(root, Vec2::new(10.0, 20.0)),
            &mut rng,
        );
        assert_eq!(scene.node(leaf).unwrap().world(), Vec2::new(24.0, 20.0));

        apply(
            &mut scene,
            &mut selected,
            PanelAction::MoveLocal(leaf, Vec2::new(0.0, 5.0)),
            &mut rng,
        );
        assert_eq!(scene.node(leaf).unwrap().world(), Vec2::new(10.0, 25.0));
    }

    #[test]
    fn added_traits_start_uninitialized() {
        let (mut scene, mut rng, root) = setup();
        let mut selected = Some(root);
        let before = scene.node(root).unwrap().traits().count();

        apply(
            &mut scene,
            &mut selected,
            PanelAction::AddTrait(root, TraitSpec::Color { color: Rgba::GREEN }),
            &mut rng,
        );

        let node = scene.node(root).unwrap();
        assert_eq!(node.traits().count(), before + 1);
        let added = node.regular_traits().last().unwrap();
        assert!(!added.is_initialized());
        assert!(matches!(added.get(), Trait::Color(_)));
    }

    #[test]
    fn trait_edits_reach_the_scene() {
        let (mut scene, mut rng, root) = setup();
        let mut selected = Some(root);
        let maturity = scene
            .node(root)
            .unwrap()
            .traits()
            .find(|s| matches!(s.get(), Trait::Maturity(_)))
            .map(|s| s.id())
            .unwrap();

        apply(
            &mut scene,
            &mut selected,
            PanelAction::Edit {
                node: root,
                id: maturity,
                edit: TraitEdit::MaturityRate(4.0),
            },
            &mut rng,
        );

        let slot = scene.node(root).unwrap().find_trait(maturity).unwrap();
        assert!(matches!(slot.get(), Trait::Maturity(m) if m.rate == 4.0));

        apply(&mut scene, &mut selected, PanelAction::RemoveTrait(root, maturity), &mut rng);
        assert!(scene.node(root).unwrap().find_trait(maturity).is_none());
    }
}
