//! Buffered structural requests issued while the scene is busy.

use crate::entity::{Entity, EntityKey};
use crate::overlay::{Overlay, OverlayKey};

/// Spawn and despawn requests collected during one phase of a frame.
///
/// Entities and scene scripts never touch the live containers directly.
/// They fill a `SceneCommands`, and the scene moves its contents into the
/// pending queues once the phase that produced them has finished.
#[derive(Default)]
pub struct SceneCommands {
    spawns: Vec<Box<dyn Entity>>,
    despawns: Vec<EntityKey>,
    overlays: Vec<Box<dyn Overlay>>,
    overlay_removals: Vec<OverlayKey>,
}

impl SceneCommands {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an entity to be added.
    pub fn spawn(&mut self, entity: Box<dyn Entity>) {
        self.spawns.push(entity);
    }

    /// Queues an entity to be removed.
    pub fn despawn(&mut self, key: EntityKey) {
        self.despawns.push(key);
    }

    /// Queues an overlay to be added.
    pub fn add_overlay(&mut self, overlay: Box<dyn Overlay>) {
        self.overlays.push(overlay);
    }

    /// Queues an overlay to be removed.
    pub fn remove_overlay(&mut self, key: OverlayKey) {
        self.overlay_removals.push(key);
    }

    /// Returns `true` if nothing was requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spawns.is_empty()
            && self.despawns.is_empty()
            && self.overlays.is_empty()
            && self.overlay_removals.is_empty()
    }

    /// Number of queued spawns.
    #[must_use]
    pub fn spawn_count(&self) -> usize {
        self.spawns.len()
    }

    /// Number of queued despawns.
    #[must_use]
    pub fn despawn_count(&self) -> usize {
        self.despawns.len()
    }

    pub(crate) fn into_parts(self) -> CommandParts {
        CommandParts {
            spawns: self.spawns,
            despawns: self.despawns,
            overlays: self.overlays,
            overlay_removals: self.overlay_removals,
        }
    }
}

pub(crate) struct CommandParts {
    pub spawns: Vec<Box<dyn Entity>>,
    pub despawns: Vec<EntityKey>,
    pub overlays: Vec<Box<dyn Overlay>>,
    pub overlay_removals: Vec<OverlayKey>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Layer;

    #[test]
    fn starts_empty() {
        assert!(SceneCommands::new().is_empty());
    }

    #[test]
    fn despawns_are_kept_in_request_order() {
        let mut commands = SceneCommands::new();
        let first = EntityKey::new(Layer::Enemy);
        let second = EntityKey::new(Layer::Terrain);
        commands.despawn(first);
        commands.despawn(second);
        assert_eq!(commands.despawn_count(), 2);
        assert!(!commands.is_empty());
        let parts = commands.into_parts();
        assert_eq!(parts.despawns, vec![first, second]);
    }
}
