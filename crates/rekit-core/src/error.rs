//! Error types for the scene scheduler and its collaborators.

use std::path::PathBuf;

use glam::Vec2;
use rekit_state::StateError;
use thiserror::Error;

use crate::entity::EntityKey;

/// A defect detected by an entity during its own update.
///
/// Returned from [`Entity::update`](crate::entity::Entity::update); the
/// scheduler aborts the rest of the frame and hands it to the driver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EntityError {
    /// An internal invariant of the entity no longer holds.
    #[error("invariant violated: {reason}")]
    InvariantViolated {
        /// Human-readable description of the broken invariant.
        reason: String,
    },

    /// The entity moved to a NaN or infinite position.
    #[error("entity moved to non-finite position {position}")]
    NonFinitePosition {
        /// The offending position.
        position: Vec2,
    },
}

/// Failure of a scene frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    /// An entity update failed; the remaining entities were not updated.
    #[error("update of entity {key} failed")]
    Entity {
        /// Key of the failing entity.
        key: EntityKey,
        /// The entity's error.
        #[source]
        source: EntityError,
    },
}

/// Failure to produce an entity from a prototype.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FactoryError {
    /// No prototype is registered under the requested name.
    #[error("unknown prototype '{0}'")]
    UnknownPrototype(String),

    /// The prototype could not assemble the entity's state machine.
    #[error("prototype '{prototype}' produced an invalid state ring")]
    Construction {
        /// Name of the prototype.
        prototype: String,
        /// The underlying ring error.
        #[source]
        source: StateError,
    },
}

/// Failure to load configuration or level data.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {path}")]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// The I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON for the expected shape.
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A value parsed but lies outside its allowed range.
    #[error("invalid value for '{field}': {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}
