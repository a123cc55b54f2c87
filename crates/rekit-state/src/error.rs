//! Errors raised while assembling a state ring.

use thiserror::Error;

/// Reasons a [`RingBuilder`](crate::RingBuilder) refuses to produce a ring,
/// or a serialized ring is refused on restore.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StateError {
    /// The builder was given no states.
    #[error("a state ring needs at least one state")]
    EmptyRing,

    /// A dwell duration was negative, NaN or infinite.
    #[error("state {index} has an invalid dwell duration {duration}")]
    InvalidDuration {
        /// Position of the offending state in the ring.
        index: usize,
        /// The rejected duration.
        duration: f32,
    },

    /// All dwell durations are zero, so time could never settle in a state.
    #[error("the total dwell duration of the ring is zero")]
    DegenerateCycle,

    /// A restored state does not link to its sequential successor.
    #[error("state {index} links to {next}, which breaks the cycle")]
    BrokenLink {
        /// Position of the offending state in the ring.
        index: usize,
        /// The stored successor index.
        next: usize,
    },
}
