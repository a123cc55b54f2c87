//! Entities simulated by a [`Scene`](crate::scene::Scene).
//!
//! - [`EntityId`]: creation-order identifier
//! - [`Layer`]: coarse draw and update layer
//! - [`EntityKey`]: the stable ordering key of a live entity
//! - [`EntityCore`]: position, size, team and lifecycle data shared by all entities
//! - [`Entity`]: the per-frame behavior trait
//!
//! # Ordering
//!
//! The scene visits entities by [`EntityKey`]: first by [`Layer`], then by
//! [`EntityId`]. Ids are allocated from a process-wide counter when an
//! entity is constructed, so two entities on the same layer keep the
//! relative order in which they were built, independent of the order they
//! are handed to the scene.
//!
//! # Example
//!
//! ```
//! use rekit_core::entity::{EntityKey, Layer};
//!
//! let terrain = EntityKey::new(Layer::Terrain);
//! let enemy = EntityKey::new(Layer::Enemy);
//! let later_enemy = EntityKey::new(Layer::Enemy);
//!
//! assert!(terrain < enemy);
//! assert!(enemy < later_enemy);
//! ```

pub mod base;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::commands::SceneCommands;
use crate::error::EntityError;
use crate::geometry::{Direction, Rect};
use crate::render::RenderSurface;

pub use self::base::EntityCore;

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

/// Creation-order identifier of an entity.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates an `EntityId` from a raw value.
    ///
    /// Mostly useful in tests; live entities receive ids from
    /// [`EntityId::allocate`].
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Allocates the next id from the process-wide counter.
    #[must_use]
    pub fn allocate() -> Self {
        Self(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse layer of an entity, in update and draw order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Layer {
    /// Scenery behind everything else.
    Background,
    /// Static level geometry.
    Terrain,
    /// Hostile actors such as pistons and turrets.
    Enemy,
    /// Collectables.
    Pickup,
    /// Bullets and other short-lived movers.
    Projectile,
    /// The player character.
    Player,
    /// Scenery in front of everything else.
    Foreground,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Stable priority key of an entity.
///
/// Keys are assigned once at construction and never change. They order
/// entities by layer and then by creation sequence.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    layer: Layer,
    id: EntityId,
}

impl EntityKey {
    /// Allocates a fresh key on `layer`.
    #[must_use]
    pub fn new(layer: Layer) -> Self {
        Self {
            layer,
            id: EntityId::allocate(),
        }
    }

    /// Builds a key from explicit parts.
    #[must_use]
    pub const fn from_parts(layer: Layer, id: EntityId) -> Self {
        Self { layer, id }
    }

    /// The layer of the entity.
    #[must_use]
    pub const fn layer(self) -> Layer {
        self.layer
    }

    /// The creation-order id of the entity.
    #[must_use]
    pub const fn id(self) -> EntityId {
        self.id
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.layer, self.id)
    }
}

/// Team affiliation, used to decide whether a contact is hostile.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    /// The player and their projectiles.
    Player,
    /// Enemies and their projectiles.
    Enemy,
    /// Collectables that react to the player.
    Pickup,
    /// Scenery that reacts to nobody.
    Neutral,
}

impl Team {
    /// Returns `true` if a contact between the two teams should have an effect.
    ///
    /// The player is hostile to enemies and to pickups; every other pairing
    /// is inert.
    #[must_use]
    pub fn is_hostile(self, other: Team) -> bool {
        matches!(
            (self, other),
            (Team::Player, Team::Enemy | Team::Pickup) | (Team::Enemy | Team::Pickup, Team::Player)
        )
    }
}

bitflags! {
    /// Lifecycle and visibility flags of an entity.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct EntityFlags: u8 {
        /// The entity is removed at the start of its next visit.
        const DELETE_ME = 1 << 0;
        /// The entity is skipped during rendering.
        const HIDDEN = 1 << 1;
    }
}

/// Per-entity view of the running frame.
///
/// Spawn and despawn requests are buffered and applied by the scene after
/// the pass.
pub struct FrameContext<'a> {
    delta: f32,
    focus: Option<Vec2>,
    commands: &'a mut SceneCommands,
}

impl<'a> FrameContext<'a> {
    /// Creates a context for one entity visit.
    #[must_use]
    pub fn new(delta: f32, focus: Option<Vec2>, commands: &'a mut SceneCommands) -> Self {
        Self {
            delta,
            focus,
            commands,
        }
    }

    /// Seconds since the previous frame.
    #[must_use]
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Point of interest of the scene, usually the player position.
    #[must_use]
    pub fn focus(&self) -> Option<Vec2> {
        self.focus
    }

    /// Requests that `entity` join the scene. It becomes live next frame.
    pub fn spawn(&mut self, entity: Box<dyn Entity>) {
        self.commands.spawn(entity);
    }

    /// Requests removal of `key`, flushed right after the pass.
    pub fn despawn(&mut self, key: EntityKey) {
        self.commands.despawn(key);
    }
}

/// A simulated game object.
///
/// Implementors own an [`EntityCore`] and any behavior-specific state,
/// typically a [`TimeStateMachine`](rekit_state::TimeStateMachine).
pub trait Entity: Send {
    /// Shared entity data.
    fn core(&self) -> &EntityCore;

    /// Mutable shared entity data.
    fn core_mut(&mut self) -> &mut EntityCore;

    /// Advances the entity by one frame.
    ///
    /// # Errors
    ///
    /// Returns an [`EntityError`] when an internal invariant is broken. The
    /// scene aborts the rest of the frame and reports it to the driver.
    fn update(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), EntityError>;

    /// Draws the entity.
    fn render(&self, surface: &mut dyn RenderSurface);

    /// Box used by collision detection.
    fn bounds(&self) -> Rect {
        self.core().bounds()
    }

    /// Called by the collision collaborator when this entity touches `other`
    /// from `direction`.
    fn react_to_collision(&mut self, _other: &mut EntityCore, _direction: Direction) {}

    /// Stable key of the entity.
    fn key(&self) -> EntityKey {
        self.core().key()
    }
}

impl fmt::Debug for dyn Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("key", &self.key())
            .field("kind", &self.core().kind())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod entity_key_tests {
        use super::*;

        #[test]
        fn orders_by_layer_before_id() {
            let late_terrain = EntityKey::from_parts(Layer::Terrain, EntityId::new(99));
            let early_enemy = EntityKey::from_parts(Layer::Enemy, EntityId::new(1));
            assert!(late_terrain < early_enemy);
        }

        #[test]
        fn orders_by_creation_within_layer() {
            let first = EntityKey::new(Layer::Projectile);
            let second = EntityKey::new(Layer::Projectile);
            assert!(first < second);
            assert_eq!(first.layer(), second.layer());
        }

        #[test]
        fn display_format() {
            let key = EntityKey::from_parts(Layer::Enemy, EntityId::new(12));
            assert_eq!(key.to_string(), "Enemy#12");
        }

        #[test]
        fn allocated_ids_are_unique() {
            let ids: Vec<_> = (0..100).map(|_| EntityId::allocate()).collect();
            let mut sorted = ids.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len(), ids.len());
        }
    }

    mod team_tests {
        use super::*;

        #[test]
        fn player_is_hostile_to_enemies_and_pickups() {
            assert!(Team::Player.is_hostile(Team::Enemy));
            assert!(Team::Enemy.is_hostile(Team::Player));
            assert!(Team::Player.is_hostile(Team::Pickup));
            assert!(Team::Pickup.is_hostile(Team::Player));
        }

        #[test]
        fn other_pairs_are_inert() {
            assert!(!Team::Enemy.is_hostile(Team::Enemy));
            assert!(!Team::Enemy.is_hostile(Team::Pickup));
            assert!(!Team::Player.is_hostile(Team::Player));
            assert!(!Team::Neutral.is_hostile(Team::Player));
        }
    }

    #[test]
    fn flags_default_empty() {
        let flags = EntityFlags::default();
        assert!(!flags.contains(EntityFlags::DELETE_ME));
        assert!(!flags.contains(EntityFlags::HIDDEN));
    }
}
