//! Interactive organism sandbox built with eframe/egui.
//!
//! [`Viewer`] owns the [`Scene`], the camera and all UI state, and
//! implements [`eframe::App`]. Each frame it:
//! 1. builds the side panels, collecting detail-panel actions;
//! 2. handles canvas input, advances the scene when running and draws it;
//! 3. applies the collected actions.

use eframe::App;
use genesis_core::{command::Command, config::Config, scene::Scene, types::NodeId};
use glam::Vec2;
use rand::rngs::ThreadRng;

use crate::{
    camera::Camera,
    canvas::EguiCanvas,
    detail_panel::{self, DetailPanel, PanelAction},
};

/// What a click on the canvas does.
#[derive(Clone, Debug, PartialEq)]
pub enum Tool {
    Select,
    /// Spawns the named blueprint.
    Spawn(String),
}

/// Main application state for the interactive viewer.
///
/// ### Fields
/// - `scene` - The simulated scene and its blueprint library.
/// - `config` - Loaded configuration (default blueprint, fixed step).
/// - `camera` - Zoom and pan of the canvas.
///
/// - `tool` - What a canvas click does.
/// - `selected` - Organ shown in the detail panel.
/// - `hovered` - Organ under the pointer this frame.
/// - `panel` - Detail panel state.
///
/// - `rng` - Random generator for editor choices such as new colors.
///
/// - `running` - Whether the scene advances every frame.
/// - `time_scale` - Multiplier applied to frame time.
/// - `step_requested` - Set by "Step"; consumed by the next paused frame.
/// - `last_dt` - Scaled time step of the last update (for display only).
pub struct Viewer {
    scene: Scene,
    config: Config,
    camera: Camera,

    tool: Tool,
    selected: Option<NodeId>,
    hovered: Option<NodeId>,
    panel: DetailPanel,

    rng: ThreadRng,

    running: bool,
    time_scale: f32,
    step_requested: bool,
    last_dt: f32,
}

impl Viewer {
    /// Creates a viewer over an empty scene built from `config`.
    ///
    /// ### Returns
    /// A running [`Viewer`] with the select tool active, ready to be passed
    /// to `eframe::run_native`.
    pub fn new(config: Config) -> Self {
        Self {
            scene: Scene::from_config(&config),
            camera: Camera::new(&config.camera),
            tool: Tool::Select,
            selected: None,
            hovered: None,
            panel: DetailPanel::default(),
            rng: rand::rng(),
            running: true,
            time_scale: config.simulation.time_scale,
            step_requested: false,
            last_dt: 0.0,
            config,
        }
    }

    /// Drops every organism; blueprints and settings are kept.
    fn clear(&mut self) {
        self.scene.clear();
        self.selected = None;
        self.hovered = None;
    }

    /// Advances the scene by `dt` scaled seconds.
    fn step(&mut self, dt: f32) {
        self.scene.update(dt);
        self.last_dt = dt;

        if self.selected.is_some_and(|id| !self.scene.contains(id)) {
            self.selected = None;
        }
    }

    /// Queues a spawn of `blueprint` at a world position.
    fn spawn_at(&mut self, blueprint: &str, position: Vec2) {
        self.scene.queue(Command::Spawn {
            blueprint: blueprint.to_string(),
            position,
        });
    }

    fn apply_actions(&mut self, actions: Vec<PanelAction>) {
        for action in actions {
            detail_panel::apply(&mut self.scene, &mut self.selected, action, &mut self.rng);
        }
    }

    /// Builds the top panel UI (run controls, stepping, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                if ui.button("Step").clicked() {
                    self.step_requested = true;
                }

                ui.add(
                    egui::DragValue::new(&mut self.time_scale)
                        .prefix("time scale = ")
                        .range(0.0..=10.0)
                        .speed(0.05),
                );

                if ui.button("Clear").clicked() {
                    self.clear();
                }

                ui.separator();
                let mut zoom = self.camera.zoom();
                if ui
                    .add(egui::Slider::new(&mut zoom, self.camera.zoom_range()).text("Zoom"))
                    .changed()
                {
                    self.camera.set_zoom(zoom);
                }
            });
        });
    }

    /// Builds the bottom status bar (frame, organism and node counts).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt last = {:.4} s", self.last_dt));
                ui.separator();
                ui.label(format!("nodes = {}", self.scene.node_count()));
                ui.label(format!("pending = {}", self.scene.pending().len()));
                ui.label(format!("live = {}", self.scene.live().len()));
                ui.label(format!("frame = {}", self.scene.frame()));
            });
        });
    }

    /// Builds the right-hand panel for the selected organ.
    fn ui_detail_panel(&mut self, ctx: &egui::Context) -> Vec<PanelAction> {
        egui::SidePanel::right("detail_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .show(ui, |ui| match self.selected {
                        Some(id) => self.panel.show(ui, &self.scene, id),
                        None => {
                            ui.heading("Organ");
                            ui.weak("Click an organ to inspect it.");
                            Vec::new()
                        }
                    })
                    .inner
            })
            .inner
    }

    /// Builds the floating toolbar: select plus one spawn tool per blueprint.
    fn ui_toolbar(&mut self, ctx: &egui::Context) {
        egui::Area::new("toolbar".into())
            .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 100.0))
            .movable(false)
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(egui::Color32::from_rgba_unmultiplied(0, 0, 0, 32))
                    .show(ui, |ui| {
                        ui.vertical(|ui| {
                            if ui
                                .selectable_label(self.tool == Tool::Select, "⬉ Select")
                                .clicked()
                            {
                                self.tool = Tool::Select;
                            }

                            for bp in self.scene.blueprints() {
                                let selected =
                                    matches!(&self.tool, Tool::Spawn(name) if *name == bp.name);
                                if ui
                                    .selectable_label(selected, format!("✚ {}", bp.name))
                                    .clicked()
                                {
                                    self.tool = Tool::Spawn(bp.name.clone());
                                }
                            }
                        });
                    });
            });
    }

    /// Builds the central canvas: input, simulation step and drawing.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with drag.
            if response.dragged() {
                self.camera.pan += response.drag_delta();
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer = response.hover_pos().unwrap_or(rect.center());
                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.camera.zoom_around(pointer, rect, factor);
            }

            let hover_world = response
                .hover_pos()
                .map(|p| self.camera.screen_to_world(p, rect));
            self.hovered = hover_world.and_then(|p| self.scene.pick(p));

            if response.clicked()
                && let Some(point) = hover_world
            {
                match self.tool.clone() {
                    Tool::Select => self.selected = self.hovered,
                    Tool::Spawn(blueprint) => self.spawn_at(&blueprint, point),
                }
            }

            if ui.ctx().input(|i| i.key_pressed(egui::Key::T))
                && let Some(point) = hover_world
            {
                let blueprint = self.config.default_blueprint.clone();
                self.spawn_at(&blueprint, point);
            }

            if self.running {
                let dt = ctx.input(|i| i.stable_dt) * self.time_scale;
                self.step(dt);
                ctx.request_repaint();
            } else if std::mem::take(&mut self.step_requested) {
                self.step(self.config.simulation.fixed_step * self.time_scale);
            }

            let mut canvas = EguiCanvas::new(&painter, &self.camera, rect);
            self.scene.draw(&mut canvas);

            if let Some(node) = self.hovered.and_then(|id| self.scene.node(id)) {
                canvas.outline(node.bounds(), egui::Stroke::new(1.0, egui::Color32::YELLOW));
            }
            if let Some(node) = self.selected.and_then(|id| self.scene.node(id)) {
                canvas.outline(node.bounds(), egui::Stroke::new(2.0, egui::Color32::WHITE));
            }
        });
    }
}

impl App for Viewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        let actions = self.ui_detail_panel(ctx);
        self.ui_central_panel(ctx);
        self.ui_toolbar(ctx);
        self.apply_actions(actions);
    }
}
