//! Test doubles for exercising the scene scheduler.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use glam::Vec2;

use crate::commands::SceneCommands;
use crate::config::PistonConfig;
use crate::enemies::{Piston, PistonParams};
use crate::entity::{Entity, EntityCore, EntityKey, FrameContext, Layer, Team};
use crate::error::EntityError;
use crate::geometry::Direction;
use crate::render::{RenderSurface, Rgba};
use crate::scene::{Scene, SceneScript};

// =============================================================================
// Probe entity
// =============================================================================

/// Shared record of which entities were updated, in visiting order.
#[derive(Debug, Clone, Default)]
pub struct VisitLog(Arc<Mutex<Vec<EntityKey>>>);

impl VisitLog {
    /// Appends a visit.
    pub fn record(&self, key: EntityKey) {
        self.0.lock().unwrap().push(key);
    }

    /// All visits so far.
    pub fn visits(&self) -> Vec<EntityKey> {
        self.0.lock().unwrap().clone()
    }

    /// Returns the visits so far and forgets them.
    pub fn take(&self) -> Vec<EntityKey> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

/// Something a probe does on its first update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeAction {
    /// Nothing.
    Idle,
    /// Flags itself for deletion.
    DestroySelf,
    /// Requests its own removal through the frame commands.
    DespawnSelf,
    /// Requests removal of another entity.
    Despawn(EntityKey),
    /// Returns an error.
    Fail,
    /// Spawns an idle probe on the given layer.
    Spawn(Layer),
}

/// An entity that records its visits and performs one scripted action.
#[derive(Debug)]
pub struct Probe {
    core: EntityCore,
    log: VisitLog,
    action: Option<ProbeAction>,
}

impl Probe {
    /// Creates a neutral probe.
    pub fn new(layer: Layer, log: &VisitLog, action: ProbeAction) -> Self {
        Self {
            core: EntityCore::new("probe", layer, Team::Neutral, Vec2::ZERO, Vec2::ONE),
            log: log.clone(),
            action: Some(action),
        }
    }

    /// Creates a boxed probe.
    pub fn boxed(layer: Layer, log: &VisitLog, action: ProbeAction) -> Box<dyn Entity> {
        Box::new(Self::new(layer, log, action))
    }

    /// Creates a player-team probe with three lives.
    pub fn player(log: &VisitLog) -> Self {
        Self {
            core: EntityCore::new("player", Layer::Player, Team::Player, Vec2::ZERO, Vec2::ONE)
                .with_lives(3),
            log: log.clone(),
            action: None,
        }
    }
}

impl Entity for Probe {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), EntityError> {
        self.log.record(self.core.key());
        match self.action.take() {
            None | Some(ProbeAction::Idle) => {}
            Some(ProbeAction::DestroySelf) => self.core.destroy(),
            Some(ProbeAction::DespawnSelf) => ctx.despawn(self.core.key()),
            Some(ProbeAction::Despawn(key)) => ctx.despawn(key),
            Some(ProbeAction::Spawn(layer)) => {
                ctx.spawn(Probe::boxed(layer, &self.log, ProbeAction::Idle));
            }
            Some(ProbeAction::Fail) => {
                return Err(EntityError::InvariantViolated {
                    reason: "probe failure".to_string(),
                })
            }
        }
        Ok(())
    }

    fn render(&self, surface: &mut dyn RenderSurface) {
        surface.draw_rect(self.core.pos, self.core.size, Rgba::WHITE);
    }

    fn react_to_collision(&mut self, _other: &mut EntityCore, _direction: Direction) {}
}

/// A boxed idle probe.
pub fn probe(layer: Layer, log: &VisitLog) -> Box<dyn Entity> {
    Probe::boxed(layer, log, ProbeAction::Idle)
}

// =============================================================================
// Scripts
// =============================================================================

/// Scene script with queued hook actions, counting its starts.
#[derive(Default)]
pub struct ScriptedHooks {
    /// Entities spawned by the next pre-hook.
    pub pre_spawns: Vec<Box<dyn Entity>>,
    /// Keys despawned by the next post-hook.
    pub post_despawns: Vec<EntityKey>,
    /// Number of start hook runs.
    pub starts: Arc<AtomicUsize>,
}

impl SceneScript for ScriptedHooks {
    fn on_start(&mut self, _commands: &mut SceneCommands) {
        self.starts.fetch_add(1, Ordering::SeqCst);
    }

    fn pre_update(&mut self, _delta: f32, commands: &mut SceneCommands) {
        for entity in self.pre_spawns.drain(..) {
            commands.spawn(entity);
        }
    }

    fn post_update(&mut self, _delta: f32, commands: &mut SceneCommands) {
        for key in self.post_despawns.drain(..) {
            commands.despawn(key);
        }
    }
}

// =============================================================================
// Setup
// =============================================================================

/// Runs `frames` updates of `delta` seconds, panicking on failure.
pub fn run_frames(scene: &Scene, frames: usize, delta: f32) {
    for _ in 0..frames {
        scene.update(delta).expect("frame failed");
    }
}

/// A downward piston in the cell at the origin.
pub fn piston_with(open: f32, closed: f32, speed: f32, length: u32) -> Piston {
    let params = PistonParams {
        expansion_length: length,
        direction: Direction::Down,
        open_time: open,
        closed_time: closed,
        speed,
        start_phase: 0,
    };
    Piston::new(Vec2::ZERO, params, &PistonConfig::default()).expect("valid piston")
}
