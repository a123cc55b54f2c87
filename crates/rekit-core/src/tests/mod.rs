//! Scheduler protocol and determinism tests.
//!
//! - `determinism.rs`: ordering, split invariance and seeded reproducibility
//! - `integration.rs`: full frames with real enemies, scripts and a render thread
//! - `helpers.rs`: probe entities and scripted scene hooks

mod helpers;

pub use helpers::*;
