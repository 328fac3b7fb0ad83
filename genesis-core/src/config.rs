//! Application configuration.
//!
//! Everything has a default; a TOML file only needs the keys it overrides.
//!
//! ```toml
//! seed = 42
//! default_blueprint = "cell"
//!
//! [camera]
//! zoom = 2.0
//!
//! [[blueprints]]
//! name = "cell"
//! traits = [
//!     { kind = "shape", shape = { kind = "rectangle", width = 10.0, height = 10.0 } },
//!     { kind = "color", color = { r = 230, g = 41, b = 55 } },
//! ]
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{blueprint::Blueprint, error::ConfigError};

/// Camera limits, in screen pixels per world unit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Starting zoom.
    pub zoom: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.8,
            max_zoom: 5.0,
            zoom: 2.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Multiplier applied to real frame time.
    pub time_scale: f32,
    /// Seconds advanced by a manual single step.
    pub fixed_step: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            fixed_step: 1.0 / 60.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seed for the scene's random generator; random when unset.
    pub seed: Option<u64>,
    /// Blueprint spawned by the quick-spawn key.
    pub default_blueprint: String,
    pub camera: CameraConfig,
    pub simulation: SimulationConfig,
    pub blueprints: Vec<Blueprint>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            default_blueprint: "cell".into(),
            camera: CameraConfig::default(),
            simulation: SimulationConfig::default(),
            blueprints: Blueprint::defaults(),
        }
    }
}

impl Config {
    /// Reads and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(
            path = %path.display(),
            blueprints = config.blueprints.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn blueprint(&self, name: &str) -> Option<&Blueprint> {
        self.blueprints.iter().find(|bp| bp.name == name)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let cam = &self.camera;
        if !(cam.min_zoom > 0.0 && cam.min_zoom <= cam.max_zoom) {
            return Err(ConfigError::invalid(
                "camera",
                format!(
                    "need 0 < min_zoom <= max_zoom (got {} and {})",
                    cam.min_zoom, cam.max_zoom
                ),
            ));
        }
        if !(cam.min_zoom..=cam.max_zoom).contains(&cam.zoom) {
            return Err(ConfigError::invalid(
                "camera.zoom",
                format!("{} is outside {}..={}", cam.zoom, cam.min_zoom, cam.max_zoom),
            ));
        }

        let sim = &self.simulation;
        if !(sim.time_scale.is_finite() && sim.time_scale >= 0.0) {
            return Err(ConfigError::invalid(
                "simulation.time_scale",
                format!("must be finite and non-negative (got {})", sim.time_scale),
            ));
        }
        if !(sim.fixed_step.is_finite() && sim.fixed_step > 0.0) {
            return Err(ConfigError::invalid(
                "simulation.fixed_step",
                format!("must be finite and positive (got {})", sim.fixed_step),
            ));
        }

        let mut names = HashSet::new();
        for bp in &self.blueprints {
            if !names.insert(bp.name.as_str()) {
                return Err(ConfigError::DuplicateBlueprint(bp.name.clone()));
            }
            bp.validate()?;
        }

        if !names.contains(self.default_blueprint.as_str()) {
            return Err(ConfigError::UnknownBlueprint {
                referenced_by: "default_blueprint".into(),
                name: self.default_blueprint.clone(),
            });
        }

        for bp in &self.blueprints {
            if let Some(missing) = bp.grown_blueprints().into_iter().find(|n| !names.contains(n)) {
                return Err(ConfigError::UnknownBlueprint {
                    referenced_by: bp.name.clone(),
                    name: missing.to_string(),
                });
            }
        }

        Ok(())
    }
}
