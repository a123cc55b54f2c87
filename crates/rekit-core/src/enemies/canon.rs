//! A ceiling-mounted turret that aims at the focus and fires.
//!
//! Which phase the turret is in and where its barrel currently points are
//! tracked separately. Phases switch on elapsed time like any
//! [`TimeStateMachine`], and each phase only names a *target* angle. The
//! barrel angle then turns toward that target at a fixed speed every frame
//! through an [`AngleTracker`].

use std::sync::Arc;

use glam::Vec2;
use rekit_state::{Phase, RingBuilder, StateError, TimeStateMachine};

use super::bullet::CanonBullet;
use crate::config::{BulletConfig, CanonConfig, GameConfig};
use crate::entity::{Entity, EntityCore, FrameContext, Layer, Team};
use crate::error::{EntityError, FactoryError};
use crate::geometry::{angle_toward, aim_vector, Direction, Polygon};
use crate::prototype::{Prototype, SpawnOptions};
use crate::render::RenderSurface;

// =============================================================================
// AngleTracker
// =============================================================================

/// Turns an angle toward a target at a fixed speed.
///
/// ```
/// use rekit_core::enemies::AngleTracker;
///
/// let quarter = std::f32::consts::FRAC_PI_2;
/// let mut tracker = AngleTracker::new(0.0, quarter / 2.0);
/// tracker.step(quarter, 1.0);
/// tracker.step(quarter, 1.0);
/// assert_eq!(tracker.current(), quarter);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleTracker {
    current: f32,
    speed: f32,
}

impl AngleTracker {
    /// Starts at `current`, turning at `speed` units per second.
    #[must_use]
    pub fn new(current: f32, speed: f32) -> Self {
        Self {
            current,
            speed: speed.abs(),
        }
    }

    /// Current angle.
    #[must_use]
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Moves toward `target` by at most `speed * delta`.
    ///
    /// The angle never passes the target and snaps onto it once closer
    /// than a tenth of the speed.
    pub fn step(&mut self, target: f32, delta: f32) {
        let max_step = self.speed * delta.max(0.0);
        let diff = target - self.current;
        if diff.abs() <= max_step {
            self.current = target;
        } else {
            self.current += diff.signum() * max_step;
        }
        if (target - self.current).abs() < self.speed / 10.0 {
            self.current = target;
        }
    }
}

// =============================================================================
// Phases
// =============================================================================

/// Data the canon phases read and write.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonContext {
    origin: Vec2,
    rest_angle: f32,
    focus: Option<Vec2>,
    locked: Option<f32>,
    shots: Vec<f32>,
}

impl CanonContext {
    fn new(origin: Vec2, rest_angle: f32) -> Self {
        Self {
            origin,
            rest_angle,
            focus: None,
            locked: None,
            shots: Vec::new(),
        }
    }
}

/// Phase of the turret cycle, each holding its target barrel angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CanonPhase {
    /// Barrel returns to the rest angle.
    Idle {
        /// Target angle.
        target: f32,
    },
    /// Barrel turns toward the focus seen when aiming began.
    Aiming {
        /// Target angle.
        target: f32,
    },
    /// A bullet left on entry; the barrel holds the aim.
    Shooting {
        /// Target angle.
        target: f32,
    },
}

impl CanonPhase {
    /// Angle the barrel should turn to.
    #[must_use]
    pub fn target(self) -> f32 {
        match self {
            Self::Idle { target } | Self::Aiming { target } | Self::Shooting { target } => target,
        }
    }
}

impl Phase for CanonPhase {
    type Context = CanonContext;

    fn name(&self) -> &'static str {
        match self {
            Self::Idle { .. } => "idle",
            Self::Aiming { .. } => "aiming",
            Self::Shooting { .. } => "shooting",
        }
    }

    fn enter(&mut self, ctx: &mut CanonContext) {
        match self {
            Self::Idle { target } => *target = ctx.rest_angle,
            Self::Aiming { target } => {
                *target = ctx
                    .focus
                    .map_or(ctx.rest_angle, |focus| angle_toward(ctx.origin, focus));
            }
            Self::Shooting { target } => {
                *target = ctx.locked.take().unwrap_or(ctx.rest_angle);
                ctx.shots.push(*target);
            }
        }
    }

    fn leave(&mut self, ctx: &mut CanonContext) {
        if let Self::Aiming { target } = self {
            ctx.locked = Some(*target);
        }
    }
}

// =============================================================================
// Canon
// =============================================================================

/// The turret enemy.
#[derive(Debug)]
pub struct Canon {
    core: EntityCore,
    machine: TimeStateMachine<CanonPhase>,
    context: CanonContext,
    angle: AngleTracker,
    barrel: Polygon,
    config: CanonConfig,
    bullet: BulletConfig,
}

impl Canon {
    /// Builds a turret hanging from the ceiling of the cell centered on
    /// `cell`, skipping `start_phase` phases.
    ///
    /// # Errors
    ///
    /// Returns a [`StateError`] if the configured phase durations do not
    /// form a valid cycle.
    pub fn new(
        cell: Vec2,
        start_phase: usize,
        config: &CanonConfig,
        bullet: &BulletConfig,
    ) -> Result<Self, StateError> {
        let pos = cell + Vec2::new(0.0, -0.5 + config.size.y / 2.0);
        let rest = config.rest_angle;
        let ring = RingBuilder::new()
            .state(CanonPhase::Idle { target: rest }, config.idle_time)
            .state(CanonPhase::Aiming { target: rest }, config.aiming_time)
            .state(CanonPhase::Shooting { target: rest }, config.shooting_time)
            .build()?;
        let mut context = CanonContext::new(pos, rest);
        let machine = TimeStateMachine::with_offset(ring, start_phase % 3, &mut context);
        let angle = AngleTracker::new(machine.phase().target(), config.angle_speed);

        let half = config.barrel_width / 2.0;
        let length = config.barrel_length;
        let barrel = Polygon::new(
            pos,
            vec![
                Vec2::new(half, 0.0),
                Vec2::new(half, length),
                Vec2::new(-half, length),
                Vec2::new(-half, 0.0),
                Vec2::ZERO,
            ],
        );

        Ok(Self {
            core: EntityCore::new("canon", Layer::Enemy, Team::Enemy, pos, config.size),
            machine,
            context,
            angle,
            barrel,
            config: config.clone(),
            bullet: bullet.clone(),
        })
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> CanonPhase {
        *self.machine.phase()
    }

    /// Current barrel angle in radians; `0` points down.
    #[must_use]
    pub fn angle(&self) -> f32 {
        self.angle.current()
    }

    /// Where bullets leave the barrel.
    #[must_use]
    pub fn muzzle(&self, angle: f32) -> Vec2 {
        self.core.pos + aim_vector(angle) * self.config.barrel_length
    }
}

impl Entity for Canon {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), EntityError> {
        self.context.focus = ctx.focus();
        self.machine.update(ctx.delta(), &mut self.context);

        for angle in std::mem::take(&mut self.context.shots) {
            let bullet = CanonBullet::new(self.muzzle(angle), aim_vector(angle), &self.bullet);
            ctx.spawn(Box::new(bullet));
        }

        self.angle.step(self.machine.phase().target(), ctx.delta());
        if self.angle.current().is_finite() {
            Ok(())
        } else {
            Err(EntityError::InvariantViolated {
                reason: "canon angle is not finite".to_string(),
            })
        }
    }

    fn render(&self, surface: &mut dyn RenderSurface) {
        surface.draw_circle(self.core.pos, self.core.size.x / 2.0, self.config.body_color);
        let barrel = self.barrel.rotate(self.angle(), self.core.pos);
        surface.draw_polygon(&barrel, self.config.barrel_color, true);
    }

    fn react_to_collision(&mut self, other: &mut EntityCore, _direction: Direction) {
        if self.core.is_hostile_to(other) {
            other.add_damage(1);
        }
    }
}

/// Factory for turrets.
///
/// Option 0, optional: start phase, taken modulo 3 (default 0).
#[derive(Debug)]
pub struct CanonPrototype {
    config: Arc<GameConfig>,
}

impl CanonPrototype {
    /// Creates the prototype.
    #[must_use]
    pub fn new(config: Arc<GameConfig>) -> Self {
        Self { config }
    }
}

impl Prototype for CanonPrototype {
    fn name(&self) -> &'static str {
        "canon"
    }

    fn create(&mut self, start: Vec2, options: &[String]) -> Result<Box<dyn Entity>, FactoryError> {
        let options = SpawnOptions::new("canon", options);
        let phase = options.int_or(0, "start_phase", 0).rem_euclid(3);
        let canon = Canon::new(
            start,
            usize::try_from(phase).unwrap_or(0),
            &self.config.canon,
            &self.config.bullet,
        )
        .map_err(|source| FactoryError::Construction {
            prototype: "canon".to_string(),
            source,
        })?;
        Ok(Box::new(canon))
    }
}
