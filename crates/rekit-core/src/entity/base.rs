//! Data shared by every entity.

use glam::Vec2;

use super::{EntityFlags, EntityKey, Layer, Team};
use crate::geometry::Rect;
use crate::scene::SceneId;

/// Position, size, team and lifecycle state of an entity.
///
/// The key is fixed at construction. Everything else may be changed by
/// the entity itself or by a collision partner.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityCore {
    key: EntityKey,
    kind: &'static str,
    /// Center position in world units.
    pub pos: Vec2,
    /// Velocity in world units per second.
    pub vel: Vec2,
    /// Full width and height.
    pub size: Vec2,
    team: Team,
    lives: i32,
    flags: EntityFlags,
    scene: Option<SceneId>,
}

impl EntityCore {
    /// Creates the core of a new entity with a freshly allocated key.
    ///
    /// `kind` is a short static label used in logs and profiling.
    #[must_use]
    pub fn new(kind: &'static str, layer: Layer, team: Team, pos: Vec2, size: Vec2) -> Self {
        Self {
            key: EntityKey::new(layer),
            kind,
            pos,
            vel: Vec2::ZERO,
            size,
            team,
            lives: 1,
            flags: EntityFlags::empty(),
            scene: None,
        }
    }

    /// Sets the starting number of lives.
    #[must_use]
    pub fn with_lives(mut self, lives: i32) -> Self {
        self.lives = lives;
        self
    }

    /// Stable key of the entity.
    #[must_use]
    pub fn key(&self) -> EntityKey {
        self.key
    }

    /// Static label of the entity type.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Team affiliation.
    #[must_use]
    pub fn team(&self) -> Team {
        self.team
    }

    /// Remaining lives.
    #[must_use]
    pub fn lives(&self) -> i32 {
        self.lives
    }

    /// Current flags.
    #[must_use]
    pub fn flags(&self) -> EntityFlags {
        self.flags
    }

    /// Scene the entity has been flushed into, if any.
    #[must_use]
    pub fn scene(&self) -> Option<SceneId> {
        self.scene
    }

    /// Returns `true` if the two teams react to each other.
    #[must_use]
    pub fn is_hostile_to(&self, other: &EntityCore) -> bool {
        self.team.is_hostile(other.team)
    }

    /// Removes `damage` lives, marking the entity for deletion once none
    /// are left.
    pub fn add_damage(&mut self, damage: i32) {
        self.lives -= damage;
        if self.lives <= 0 {
            self.destroy();
        }
    }

    /// Adds `amount` lives.
    pub fn heal(&mut self, amount: i32) {
        self.lives += amount;
    }

    /// Marks the entity for deletion. The scene removes it on its next
    /// visit.
    pub fn destroy(&mut self) {
        self.flags.insert(EntityFlags::DELETE_ME);
    }

    /// Returns `true` once [`destroy`](Self::destroy) has been called.
    #[must_use]
    pub fn is_marked_for_deletion(&self) -> bool {
        self.flags.contains(EntityFlags::DELETE_ME)
    }

    /// Shows or hides the entity.
    pub fn set_visible(&mut self, visible: bool) {
        self.flags.set(EntityFlags::HIDDEN, !visible);
    }

    /// Returns `true` unless hidden.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !self.flags.contains(EntityFlags::HIDDEN)
    }

    /// Box centered on the position with the entity's size.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    pub(crate) fn attach(&mut self, scene: SceneId) {
        self.scene = Some(scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn core() -> EntityCore {
        EntityCore::new("probe", Layer::Enemy, Team::Enemy, Vec2::ZERO, Vec2::ONE)
    }

    #[test]
    fn damage_destroys_at_zero_lives() {
        let mut core = core().with_lives(2);
        core.add_damage(1);
        assert!(!core.is_marked_for_deletion());
        core.add_damage(1);
        assert!(core.is_marked_for_deletion());
        assert_eq!(core.lives(), 0);
    }

    #[test]
    fn heal_adds_lives() {
        let mut core = core();
        core.heal(2);
        assert_eq!(core.lives(), 3);
    }

    #[test]
    fn visibility_toggles_hidden_flag() {
        let mut core = core();
        assert!(core.is_visible());
        core.set_visible(false);
        assert!(core.flags().contains(EntityFlags::HIDDEN));
        core.set_visible(true);
        assert!(core.is_visible());
    }

    #[test]
    fn key_is_fixed_after_mutation() {
        let mut core = core();
        let key = core.key();
        core.pos = Vec2::new(5.0, 5.0);
        core.destroy();
        assert_eq!(core.key(), key);
    }

    #[test]
    fn bounds_follow_position() {
        let mut core = core();
        core.pos = Vec2::new(2.0, 3.0);
        assert_eq!(core.bounds().center, Vec2::new(2.0, 3.0));
        assert_eq!(core.bounds().size, Vec2::ONE);
    }
}
