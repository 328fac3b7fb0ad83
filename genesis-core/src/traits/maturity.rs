use serde::{Deserialize, Serialize};

use super::{Lifecycle, TraitContext};
use crate::{chance::chance, command::Command};

fn always() -> f64 {
    1.0
}

/// What a [`MaturityTrait`] does when its owner matures.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MatureAction {
    /// Grows a child organ from the named blueprint on the owner's outline,
    /// in direction `angle` (degrees), with probability `chance`.
    GrowChild {
        blueprint: String,
        #[serde(default)]
        angle: f32,
        #[serde(default = "always")]
        chance: f64,
    },
    /// Requests removal of the owner.
    Wither,
}

/// Tracks how mature an organ is.
///
/// Progress advances by `dt * rate` each frame until it reaches
/// `max_progress`. The on-mature action fires once, on the frame the
/// threshold is crossed.
#[derive(Clone, Debug, PartialEq)]
pub struct MaturityTrait {
    pub current_progress: f32,
    pub max_progress: f32,
    pub rate: f32,
    reached_max: bool,
    on_mature: Option<MatureAction>,
}

impl MaturityTrait {
    pub fn new(max_progress: f32, rate: f32) -> Self {
        Self {
            current_progress: 0.0,
            max_progress,
            rate,
            reached_max: false,
            on_mature: None,
        }
    }

    pub fn with_action(mut self, action: MatureAction) -> Self {
        self.on_mature = Some(action);
        self
    }

    pub fn reached_max(&self) -> bool {
        self.reached_max
    }

    pub fn on_mature(&self) -> Option<&MatureAction> {
        self.on_mature.as_ref()
    }

    /// Progress in `0..=1`.
    pub fn fraction(&self) -> f32 {
        if self.max_progress > 0.0 {
            (self.current_progress / self.max_progress).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    fn fire(&self, ctx: &mut TraitContext<'_>) {
        let Some(action) = &self.on_mature else {
            return;
        };

        match action {
            MatureAction::GrowChild {
                blueprint,
                angle,
                chance: p,
            } => match chance(*p, ctx.rng()) {
                Ok(true) => {
                    let parent = ctx.node();
                    ctx.queue(Command::GrowChild {
                        parent,
                        blueprint: blueprint.clone(),
                        angle: *angle,
                    });
                }
                Ok(false) => {
                    tracing::debug!(node = ?ctx.node(), %blueprint, "growth roll failed");
                }
                Err(err) => {
                    tracing::warn!(node = ?ctx.node(), %err, "skipping on-mature growth");
                }
            },
            MatureAction::Wither => {
                let node = ctx.node();
                ctx.queue(Command::Remove(node));
            }
        }
    }
}

impl Lifecycle for MaturityTrait {
    fn dominant(&self) -> bool {
        true
    }

    fn update(&mut self, ctx: &mut TraitContext<'_>) {
        if self.reached_max {
            return;
        }

        self.current_progress = (self.current_progress + ctx.dt() * self.rate).min(self.max_progress);
        if self.current_progress >= self.max_progress {
            self.reached_max = true;
            let world = ctx.world();
            tracing::debug!(
                node = ?ctx.node(),
                x = world.x,
                y = world.y,
                shape = ctx.shape().name(),
                "organ matured"
            );
            self.fire(ctx);
        }
    }
}
