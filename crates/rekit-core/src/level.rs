//! Level descriptions and the script that populates a scene from one.
//!
//! A level is a JSON document listing prototype spawns:
//!
//! ```
//! use rekit_core::level::Level;
//!
//! let level = Level::from_json_str(r#"{
//!     "name": "shaft",
//!     "focus": [4.0, 6.0],
//!     "spawns": [
//!         { "prototype": "piston", "position": [2.0, 1.0], "options": ["2", "2"] },
//!         { "prototype": "canon", "position": [5.0, 0.0] }
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(level.spawns.len(), 2);
//! assert!(level.spawns[1].options.is_empty());
//! ```

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::commands::SceneCommands;
use crate::error::ConfigError;
use crate::prototype::PrototypeRegistry;
use crate::scene::SceneScript;

/// One prototype placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnSpec {
    /// Registry name of the prototype.
    pub prototype: String,
    /// Cell center to spawn at.
    pub position: Vec2,
    /// Positional options handed to the prototype.
    #[serde(default)]
    pub options: Vec<String>,
}

/// A level: a name, an optional initial focus point and its spawns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Level {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Initial point of interest for aiming enemies.
    #[serde(default)]
    pub focus: Option<Vec2>,
    /// Spawns in document order.
    #[serde(default)]
    pub spawns: Vec<SpawnSpec>,
}

impl Level {
    /// Parses a level document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed input.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a level file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

/// Scene script spawning every entity of a level when the scene starts.
///
/// Spawns naming an unknown prototype, or whose prototype fails, are
/// logged and skipped.
#[derive(Debug)]
pub struct LevelScript {
    level: Level,
    registry: PrototypeRegistry,
}

impl LevelScript {
    /// Creates the script.
    #[must_use]
    pub fn new(level: Level, registry: PrototypeRegistry) -> Self {
        Self { level, registry }
    }

    /// The level being played.
    #[must_use]
    pub fn level(&self) -> &Level {
        &self.level
    }
}

impl SceneScript for LevelScript {
    fn on_start(&mut self, commands: &mut SceneCommands) {
        // Restarts must draw the same random options as the first run.
        self.registry.rewind();
        for spec in &self.level.spawns {
            match self.registry.spawn(&spec.prototype, spec.position, &spec.options) {
                Ok(entity) => commands.spawn(entity),
                Err(err) => warn!(
                    level = %self.level.name,
                    prototype = %spec.prototype,
                    error = %err,
                    "skipping spawn"
                ),
            }
        }
        debug!(
            level = %self.level.name,
            spawned = commands.spawn_count(),
            "level started"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::GameConfig;

    fn registry() -> PrototypeRegistry {
        PrototypeRegistry::with_defaults(Arc::new(GameConfig::default()), 0)
    }

    #[test]
    fn empty_document_is_an_empty_level() {
        let level = Level::from_json_str("{}").unwrap();
        assert_eq!(level, Level::default());
    }

    #[test]
    fn spawn_requires_prototype_and_position() {
        assert!(Level::from_json_str(r#"{ "spawns": [ { "prototype": "canon" } ] }"#).is_err());
    }

    #[test]
    fn script_spawns_known_prototypes() {
        let level = Level {
            name: "test".into(),
            focus: None,
            spawns: vec![
                SpawnSpec {
                    prototype: "piston".into(),
                    position: Vec2::ZERO,
                    options: vec!["1".into()],
                },
                SpawnSpec {
                    prototype: "does_not_exist".into(),
                    position: Vec2::ONE,
                    options: Vec::new(),
                },
                SpawnSpec {
                    prototype: "health_pickup".into(),
                    position: Vec2::ONE,
                    options: Vec::new(),
                },
            ],
        };
        let mut script = LevelScript::new(level, registry());
        let mut commands = SceneCommands::new();
        script.on_start(&mut commands);
        assert_eq!(commands.spawn_count(), 2);
    }

    #[test]
    fn bundled_demo_spawns_everything() {
        let level = Level::from_json_str(include_str!("../../../demos/corridor.json")).unwrap();
        assert_eq!(level.focus, Some(Vec2::new(6.0, 4.0)));

        let spawns = level.spawns.len();
        let mut script = LevelScript::new(level, registry());
        let mut commands = SceneCommands::new();
        script.on_start(&mut commands);
        assert_eq!(commands.spawn_count(), spawns);
    }

    #[test]
    fn roundtrips_through_json() {
        let level = Level {
            name: "roundtrip".into(),
            focus: Some(Vec2::new(1.0, 2.0)),
            spawns: vec![SpawnSpec {
                prototype: "canon".into(),
                position: Vec2::new(3.0, 0.0),
                options: vec!["1".into()],
            }],
        };
        let json = serde_json::to_string(&level).unwrap();
        assert_eq!(Level::from_json_str(&json).unwrap(), level);
    }
}
