//! # rekit-core
//!
//! Real-time update core of the rekit scrolling action game.
//!
//! ## Architecture
//!
//! - **Scene**: owns the live entities and overlays of a level, runs the
//!   per-frame update pass and serializes it against rendering with one lock
//! - **Entities**: positioned, teamed game objects with a per-frame update
//! - **Enemies**: pistons and turrets driven by [`rekit_state`] machines
//! - **Prototypes**: named factories turning level spawns into entities
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use glam::Vec2;
//! use rekit_core::config::GameConfig;
//! use rekit_core::level::{Level, LevelScript, SpawnSpec};
//! use rekit_core::prototype::PrototypeRegistry;
//! use rekit_core::render::RecordingSurface;
//! use rekit_core::scene::Scene;
//!
//! let config = Arc::new(GameConfig::default());
//! let level = Level {
//!     name: "demo".into(),
//!     focus: None,
//!     spawns: vec![SpawnSpec {
//!         prototype: "piston".into(),
//!         position: Vec2::new(1.0, 1.0),
//!         options: vec!["2".into()],
//!     }],
//! };
//! let registry = PrototypeRegistry::with_defaults(Arc::clone(&config), 42);
//! let scene = Scene::new(config.scene.clone(), Box::new(LevelScript::new(level, registry)));
//!
//! for _ in 0..60 {
//!     scene.update(1.0 / 60.0).unwrap();
//! }
//!
//! let mut surface = RecordingSurface::new();
//! scene.render(&mut surface);
//! assert!(!surface.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod commands;
pub mod config;
pub mod enemies;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod level;
pub mod overlay;
pub mod pickups;
pub mod prototype;
pub mod render;
pub mod scene;

pub use commands::SceneCommands;
pub use config::{GameConfig, SceneConfig};
pub use entity::{Entity, EntityCore, EntityKey, FrameContext, Layer, Team};
pub use error::{ConfigError, EntityError, FactoryError, SceneError};
pub use scene::{EmptyScript, Scene, SceneScript};

#[cfg(test)]
mod tests;
