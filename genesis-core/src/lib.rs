//! Core organism sandbox library.
//!
//! Organisms are trees of organs ([`node::Node`]) whose behavior and
//! appearance come from attached traits ([`traits`]). A [`scene::Scene`]
//! owns every node, runs the per-frame update and draw passes, and applies
//! structural changes (spawns, removals, growth) between frames.
//!
//! Main components:
//! - [`scene`]: the scene root, node arena and frame loop.
//! - [`node`]: organs, their trait lists and positions.
//! - [`traits`]: maturity, shape, color and energy traits.
//! - [`shape`]: drawable shapes and the [`shape::Canvas`] they render to.
//! - [`blueprint`]: named organism templates.
//! - [`config`]: TOML configuration.
//! - [`command`]: deferred scene changes queued by traits and tools.
//! - [`chance`], [`input`]: small helpers for randomness and hit tests.

pub mod blueprint;
pub mod chance;
pub mod command;
pub mod config;
pub mod error;
pub mod input;
pub mod node;
pub mod scene;
pub mod shape;
pub mod traits;
pub mod types;
