//! The per-frame scene scheduler.
//!
//! A [`Scene`] owns every live entity and overlay of one level. The logic
//! driver calls [`Scene::update`] once per frame while a render thread may
//! call [`Scene::render`] at any time. Both take the same lock, and the live
//! map is only structurally changed at three points of a frame:
//!
//! 1. **Add flush**: pending additions enter the live map.
//! 2. **Entity pass**: entities flagged for deletion are removed as the
//!    pass reaches them; every other entity is updated in key order.
//! 3. **Remove flush**: pending removals leave the live map.
//!
//! Requests made while a pass is running go through a [`SceneCommands`]
//! buffer and are queued once the pass is over, so the pass never observes
//! its own structural changes.
//!
//! # Frame timing
//!
//! | request | becomes effective |
//! |---------|-------------------|
//! | [`Scene::add_entity`] between frames | add flush of the next frame |
//! | spawn from [`SceneScript::pre_update`] | add flush of the same frame |
//! | spawn from an entity update | add flush of the next frame |
//! | [`EntityCore::destroy`](crate::entity::EntityCore::destroy) | next time the pass reaches the entity |
//! | despawn from an entity update | remove flush of the same frame |
//! | despawn from [`SceneScript::post_update`] | remove flush of the next frame |
//!
//! # Example
//!
//! ```
//! use rekit_core::config::{GameConfig, SceneConfig};
//! use rekit_core::pickups::HealthPickup;
//! use rekit_core::scene::{EmptyScript, Scene};
//! use glam::Vec2;
//!
//! let config = GameConfig::default();
//! let scene = Scene::new(SceneConfig::default(), Box::new(EmptyScript));
//! let key = scene.add_entity(Box::new(HealthPickup::new(Vec2::ZERO, &config.pickup)));
//!
//! assert_eq!(scene.entity_count(), 0);
//! scene.update(1.0 / 60.0).unwrap();
//! assert_eq!(scene.live_keys(), vec![key]);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use glam::Vec2;
use tracing::{debug, trace, warn};

use crate::commands::{CommandParts, SceneCommands};
use crate::config::SceneConfig;
use crate::entity::{Entity, EntityKey, FrameContext};
use crate::error::SceneError;
use crate::geometry::Direction;
use crate::overlay::{Overlay, OverlayKey, OverlayStatus};
use crate::render::RenderSurface;

static NEXT_SCENE_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a scene instance, stored in each entity it adopts.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SceneId(u64);

impl SceneId {
    fn allocate() -> Self {
        Self(NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SceneId({})", self.0)
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scene#{}", self.0)
    }
}

// =============================================================================
// SceneScript
// =============================================================================

/// Level-specific hooks run by the scene around the entity pass.
///
/// Scripts are only ever called from the thread driving
/// [`Scene::update`] and [`Scene::restart`].
pub trait SceneScript: Send {
    /// Runs on construction and on every restart, after the scene was cleared.
    fn on_start(&mut self, _commands: &mut SceneCommands) {}

    /// Runs first in every frame. Spawns issued here are live in the same
    /// frame.
    fn pre_update(&mut self, _delta: f32, _commands: &mut SceneCommands) {}

    /// Runs after the remove flush.
    fn post_update(&mut self, _delta: f32, _commands: &mut SceneCommands) {}
}

/// A script that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyScript;

impl SceneScript for EmptyScript {}

// =============================================================================
// Scene
// =============================================================================

/// Containers guarded by the scene lock.
#[derive(Default)]
struct SceneState {
    entities: BTreeMap<EntityKey, Box<dyn Entity>>,
    overlays: BTreeMap<OverlayKey, Box<dyn Overlay>>,
    pending_add: Vec<Box<dyn Entity>>,
    pending_remove: Vec<EntityKey>,
    focus: Option<Vec2>,
    timings: BTreeMap<&'static str, Duration>,
}

impl SceneState {
    fn enqueue(&mut self, commands: SceneCommands) {
        let CommandParts {
            spawns,
            despawns,
            overlays,
            overlay_removals,
        } = commands.into_parts();
        self.pending_add.extend(spawns);
        self.pending_remove.extend(despawns);
        for overlay in overlays {
            self.overlays.insert(overlay.key(), overlay);
        }
        for key in overlay_removals {
            self.overlays.remove(&key);
        }
    }

    fn flush_additions(&mut self, scene: SceneId) {
        if self.pending_add.is_empty() {
            return;
        }
        debug!(scene = %scene, count = self.pending_add.len(), "flushing additions");
        for mut entity in self.pending_add.drain(..) {
            let key = entity.key();
            if self.entities.contains_key(&key) {
                warn!(scene = %scene, key = %key, "entity already live, dropping duplicate add");
                continue;
            }
            entity.core_mut().attach(scene);
            self.entities.insert(key, entity);
        }
    }

    fn flush_removals(&mut self, scene: SceneId) {
        if self.pending_remove.is_empty() {
            return;
        }
        debug!(scene = %scene, count = self.pending_remove.len(), "flushing removals");
        for key in self.pending_remove.drain(..) {
            if self.entities.remove(&key).is_none() {
                trace!(scene = %scene, key = %key, "removal of absent entity ignored");
            }
        }
    }

    fn clear(&mut self) {
        self.entities.clear();
        self.overlays.clear();
        self.pending_add.clear();
        self.pending_remove.clear();
        self.timings.clear();
    }
}

/// Scheduler of one level's entities and overlays.
///
/// `Scene` is `Send + Sync` and is meant to be shared as `Arc<Scene>`
/// between the logic thread and the render thread.
pub struct Scene {
    id: SceneId,
    config: SceneConfig,
    state: Mutex<SceneState>,
    script: Mutex<Box<dyn SceneScript>>,
}

impl Scene {
    /// Creates a scene and runs the script's start hook.
    #[must_use]
    pub fn new(config: SceneConfig, script: Box<dyn SceneScript>) -> Self {
        let scene = Self {
            id: SceneId::allocate(),
            config,
            state: Mutex::new(SceneState::default()),
            script: Mutex::new(script),
        };
        scene.start();
        scene
    }

    /// Identifier stored in adopted entities.
    #[must_use]
    pub fn id(&self) -> SceneId {
        self.id
    }

    /// Settings the scene was created with.
    #[must_use]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Queues `entity` for the next add flush and returns its key.
    pub fn add_entity(&self, entity: Box<dyn Entity>) -> EntityKey {
        let key = entity.key();
        self.lock_state().pending_add.push(entity);
        key
    }

    /// Queues `key` for the next remove flush. Removing an absent entity
    /// is a no-op.
    pub fn remove_entity(&self, key: EntityKey) {
        self.lock_state().pending_remove.push(key);
    }

    /// Inserts an overlay immediately.
    pub fn add_overlay(&self, overlay: Box<dyn Overlay>) -> OverlayKey {
        let key = overlay.key();
        self.lock_state().overlays.insert(key, overlay);
        key
    }

    /// Removes an overlay immediately. Returns `true` if it was present.
    pub fn remove_overlay(&self, key: OverlayKey) -> bool {
        self.lock_state().overlays.remove(&key).is_some()
    }

    /// Sets the point of interest handed to entities.
    pub fn set_focus(&self, focus: Option<Vec2>) {
        self.lock_state().focus = focus;
    }

    /// Current point of interest.
    #[must_use]
    pub fn focus(&self) -> Option<Vec2> {
        self.lock_state().focus
    }

    /// Runs one frame.
    ///
    /// Negative or non-finite deltas are treated as zero.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Entity`] for the first entity whose update
    /// fails. No later entity is updated or removed in that frame, and the
    /// remove flush, post hook and overlay pass are skipped. Requests
    /// issued before the failure stay queued for the next frame.
    pub fn update(&self, delta: f32) -> Result<(), SceneError> {
        let delta = if delta.is_finite() && delta > 0.0 {
            delta
        } else {
            0.0
        };

        self.run_script(|script, commands| script.pre_update(delta, commands));

        let mut state = self.lock_state();
        state.flush_additions(self.id);

        let mut commands = SceneCommands::new();
        let failure = self.entity_pass(&mut state, delta, &mut commands);
        state.enqueue(commands);
        if let Some(err) = failure {
            return Err(err);
        }

        state.flush_removals(self.id);
        drop(state);

        self.run_script(|script, commands| script.post_update(delta, commands));

        self.lock_state()
            .overlays
            .retain(|key, overlay| match overlay.update(delta) {
                OverlayStatus::Active => true,
                OverlayStatus::Finished => {
                    trace!(key = %key, "overlay finished");
                    false
                }
            });
        Ok(())
    }

    fn entity_pass(
        &self,
        state: &mut SceneState,
        delta: f32,
        commands: &mut SceneCommands,
    ) -> Option<SceneError> {
        let SceneState {
            entities,
            focus,
            timings,
            ..
        } = state;
        let focus = *focus;
        let profile = self.config.profile_updates;
        let mut failure = None;

        entities.retain(|key, entity| {
            if failure.is_some() {
                return true;
            }
            if entity.core().is_marked_for_deletion() {
                trace!(key = %key, "removing destroyed entity");
                return false;
            }

            let started = profile.then(Instant::now);
            let result = entity.update(&mut FrameContext::new(delta, focus, commands));
            if let Some(started) = started {
                *timings.entry(entity.core().kind()).or_default() += started.elapsed();
            }

            if let Err(source) = result {
                warn!(key = %key, error = %source, "entity update failed, aborting frame");
                failure = Some(SceneError::Entity { key: *key, source });
            }
            true
        });
        failure
    }

    /// Draws all visible entities, then all overlays, in key order.
    pub fn render(&self, surface: &mut dyn RenderSurface) {
        let state = self.lock_state();
        for entity in state.entities.values() {
            if entity.core().is_visible() {
                entity.render(surface);
            }
        }
        for overlay in state.overlays.values() {
            overlay.render(surface);
        }
    }

    /// Delivers a contact between two live entities.
    ///
    /// `a` reacts to `b` touching it from `direction`, then `b` reacts to
    /// `a` from the opposite direction. Returns `false` without effect if
    /// either entity is not live, is already destroyed, or both keys are
    /// equal.
    pub fn notify_collision(&self, a: EntityKey, b: EntityKey, direction: Direction) -> bool {
        if a == b {
            return false;
        }
        let mut state = self.lock_state();
        let mut first = None;
        let mut second = None;
        for (key, entity) in &mut state.entities {
            if *key == a {
                first = Some(entity);
            } else if *key == b {
                second = Some(entity);
            }
        }
        let (Some(first), Some(second)) = (first, second) else {
            return false;
        };
        if first.core().is_marked_for_deletion() || second.core().is_marked_for_deletion() {
            return false;
        }
        first.react_to_collision(second.core_mut(), direction);
        second.react_to_collision(first.core_mut(), direction.opposite());
        true
    }

    /// Runs `f` on a live entity.
    pub fn with_entity<R>(&self, key: EntityKey, f: impl FnOnce(&dyn Entity) -> R) -> Option<R> {
        let state = self.lock_state();
        state.entities.get(&key).map(|entity| f(entity.as_ref()))
    }

    /// Keys of the live entities in visiting order.
    #[must_use]
    pub fn live_keys(&self) -> Vec<EntityKey> {
        self.lock_state().entities.keys().copied().collect()
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.lock_state().entities.len()
    }

    /// Number of overlays.
    #[must_use]
    pub fn overlay_count(&self) -> usize {
        self.lock_state().overlays.len()
    }

    /// Number of queued additions and removals.
    #[must_use]
    pub fn pending_counts(&self) -> (usize, usize) {
        let state = self.lock_state();
        (state.pending_add.len(), state.pending_remove.len())
    }

    /// Returns and resets the accumulated update time per entity kind.
    ///
    /// Always empty unless [`SceneConfig::profile_updates`] is set.
    pub fn take_update_timings(&self) -> BTreeMap<&'static str, Duration> {
        mem::take(&mut self.lock_state().timings)
    }

    /// Empties the scene and runs the script's start hook again.
    pub fn restart(&self) {
        debug!(scene = %self.id, "restarting");
        self.lock_state().clear();
        self.start();
    }

    fn start(&self) {
        self.run_script(|script, commands| script.on_start(commands));
    }

    fn run_script(&self, hook: impl FnOnce(&mut dyn SceneScript, &mut SceneCommands)) {
        let mut commands = SceneCommands::new();
        {
            let mut script = self.script.lock().unwrap_or_else(PoisonError::into_inner);
            hook(script.as_mut(), &mut commands);
        }
        if !commands.is_empty() {
            self.lock_state().enqueue(commands);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SceneState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(SceneConfig::default(), Box::new(EmptyScript))
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("id", &self.id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
