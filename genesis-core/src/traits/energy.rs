use super::{Lifecycle, TraitContext};

/// Energy reserve that drains over time.
#[derive(Clone, Debug, PartialEq)]
pub struct EnergyTrait {
    pub level: f32,
    pub max_level: f32,
    pub depletion_rate: f32,
}

impl EnergyTrait {
    /// Starts full.
    pub fn new(max_level: f32, depletion_rate: f32) -> Self {
        Self {
            level: max_level,
            max_level,
            depletion_rate,
        }
    }

    pub fn replenish(&mut self) {
        self.level = self.max_level;
    }

    pub fn is_exhausted(&self) -> bool {
        self.level <= 0.0
    }

    pub fn fraction(&self) -> f32 {
        if self.max_level > 0.0 {
            (self.level / self.max_level).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

impl Lifecycle for EnergyTrait {
    fn dominant(&self) -> bool {
        true
    }

    fn update(&mut self, ctx: &mut TraitContext<'_>) {
        if self.is_exhausted() {
            return;
        }

        self.level = (self.level - ctx.dt() * self.depletion_rate).max(0.0);
        if self.is_exhausted() {
            tracing::debug!(node = ?ctx.node(), "energy exhausted");
        }
    }
}
