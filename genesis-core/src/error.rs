//! Error types for the genesis core.
//!
//! Per-frame simulation state never fails; errors only arise from
//! configuration input, structural requests that would break the tree, and
//! the probability helper's contract.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::NodeId;

/// A probability outside `0..=1` was handed to [`crate::chance::chance`].
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("chance must be between 0 and 1, inclusive (got {0})")]
pub struct ProbabilityError(pub f64);

/// Errors raised while loading or validating a [`crate::config::Config`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`crate::config::Config`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Two blueprints share a name.
    #[error("blueprint `{0}` is defined more than once")]
    DuplicateBlueprint(String),

    /// A blueprint or setting refers to a blueprint that does not exist.
    #[error("`{referenced_by}` refers to unknown blueprint `{name}`")]
    UnknownBlueprint { referenced_by: String, name: String },

    /// A numeric setting is out of its allowed range.
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error(transparent)]
    Probability(#[from] ProbabilityError),
}

impl ConfigError {
    pub fn invalid<F: Into<String>, R: Into<String>>(field: F, reason: R) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised by structural requests on a [`crate::scene::Scene`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),

    /// Attaching `child` under `parent` would make a node its own ancestor.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    /// The node is already flagged for removal and will be swept.
    #[error("node {0:?} is being removed")]
    RemovalRequested(NodeId),

    #[error("no blueprint named `{0}`")]
    UnknownBlueprint(String),
}
