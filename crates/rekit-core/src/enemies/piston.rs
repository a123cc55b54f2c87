//! A piston that periodically smashes toward a direction.
//!
//! The piston occupies one grid cell. A fixed base plate sits on the side
//! of the cell opposite to the smashing direction and a moving arm extends
//! from the base face. Only the arm hurts.
//!
//! The arm follows a four phase cycle:
//!
//! | phase | duration | extension |
//! |-------|----------|-----------|
//! | `Open` | open time | full |
//! | `Closing` | length / speed | full to zero |
//! | `Closed` | closed time | zero |
//! | `Opening` | length / speed | zero to full |

use std::sync::Arc;

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rekit_state::{Phase, RingBuilder, StateError, TimeStateMachine};

use crate::config::{GameConfig, PistonConfig};
use crate::entity::{Entity, EntityCore, FrameContext, Layer, Team};
use crate::error::{EntityError, FactoryError};
use crate::geometry::{Direction, Rect};
use crate::prototype::{Prototype, SpawnOptions};
use crate::render::{RenderSurface, Rgba};

/// Slowest arm speed accepted, in cells per second.
const MIN_SPEED: f32 = 1e-3;

/// Phase of the piston cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PistonPhase {
    /// Fully extended, standing still.
    Open,
    /// Retracting.
    Closing,
    /// Fully retracted, standing still.
    Closed,
    /// Extending.
    Opening,
}

impl PistonPhase {
    /// Extension for `progress` through this phase of an arm with reach `full`.
    #[must_use]
    pub fn extension(self, full: f32, progress: f32) -> f32 {
        match self {
            Self::Open => full,
            Self::Closing => full * (1.0 - progress),
            Self::Closed => 0.0,
            Self::Opening => full * progress,
        }
    }
}

impl Phase for PistonPhase {
    type Context = ();

    fn name(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Closed => "closed",
            Self::Opening => "opening",
        }
    }
}

/// Resolved construction parameters of a piston.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PistonParams {
    /// Number of cells the arm reaches beyond its own cell.
    pub expansion_length: u32,
    /// Smashing direction.
    pub direction: Direction,
    /// Seconds spent fully extended.
    pub open_time: f32,
    /// Seconds spent fully retracted.
    pub closed_time: f32,
    /// Arm speed in cells per second.
    pub speed: f32,
    /// Number of phases to skip at construction.
    pub start_phase: usize,
}

impl Default for PistonParams {
    fn default() -> Self {
        Self {
            expansion_length: 1,
            direction: Direction::Down,
            open_time: 1.0,
            closed_time: 1.0,
            speed: 1.0,
            start_phase: 0,
        }
    }
}

/// The piston enemy.
#[derive(Debug)]
pub struct Piston {
    core: EntityCore,
    origin: Vec2,
    direction: Direction,
    expansion_length: f32,
    machine: TimeStateMachine<PistonPhase>,
    base_height: f32,
    piston_width: f32,
    lower_margin: f32,
    base_color: Rgba,
    arm_color: Rgba,
}

impl Piston {
    /// Builds a piston in the cell centered on `origin`.
    ///
    /// # Errors
    ///
    /// Returns a [`StateError`] if the resolved durations do not form a
    /// valid cycle, for example when every phase lasts zero seconds.
    #[allow(clippy::cast_precision_loss)]
    pub fn new(origin: Vec2, params: PistonParams, config: &PistonConfig) -> Result<Self, StateError> {
        let expansion_length = params.expansion_length.max(1) as f32;
        let speed = if params.speed.is_finite() {
            params.speed.max(MIN_SPEED)
        } else {
            MIN_SPEED
        };
        let travel_time = expansion_length / speed;

        let ring = RingBuilder::new()
            .state(PistonPhase::Open, params.open_time)
            .state(PistonPhase::Closing, travel_time)
            .state(PistonPhase::Closed, params.closed_time)
            .state(PistonPhase::Opening, travel_time)
            .build()?;
        let machine = TimeStateMachine::with_offset(ring, params.start_phase % 4, &mut ());

        let direction = params.direction;
        let base_center = origin - direction.vector() * (0.5 - config.base_height / 2.0);
        let base_size = direction.oriented_size(config.base_height, 1.0);

        Ok(Self {
            core: EntityCore::new("piston", Layer::Enemy, Team::Enemy, base_center, base_size),
            origin,
            direction,
            expansion_length,
            machine,
            base_height: config.base_height,
            piston_width: config.piston_width,
            lower_margin: config.lower_margin,
            base_color: config.base_color,
            arm_color: config.arm_color,
        })
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> PistonPhase {
        *self.machine.phase()
    }

    /// How far the arm currently reaches beyond the piston's own cell.
    #[must_use]
    pub fn extension(&self) -> f32 {
        self.phase()
            .extension(self.expansion_length, self.machine.progress())
    }

    /// Smashing direction.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The underlying state machine.
    #[must_use]
    pub fn machine(&self) -> &TimeStateMachine<PistonPhase> {
        &self.machine
    }

    /// Box covered by the moving arm.
    #[must_use]
    pub fn arm_bounds(&self) -> Rect {
        let dir = self.direction.vector();
        let face = self.origin - dir * (0.5 - self.base_height);
        let length =
            (self.extension() + (0.5 - self.base_height) - self.lower_margin).max(0.0);
        Rect::new(
            face + dir * (length / 2.0),
            self.direction.oriented_size(length, self.piston_width),
        )
    }
}

impl Entity for Piston {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), EntityError> {
        self.machine.update(ctx.delta(), &mut ());
        let extension = self.extension();
        if extension.is_finite() && (0.0..=self.expansion_length).contains(&extension) {
            Ok(())
        } else {
            Err(EntityError::InvariantViolated {
                reason: format!(
                    "piston extension {extension} outside [0, {}]",
                    self.expansion_length
                ),
            })
        }
    }

    fn render(&self, surface: &mut dyn RenderSurface) {
        let arm = self.arm_bounds();
        if arm.size.x > 0.0 && arm.size.y > 0.0 {
            surface.draw_rect(arm.center, arm.size, self.arm_color);
        }
        surface.draw_rect(self.core.pos, self.core.size, self.base_color);
    }

    fn bounds(&self) -> Rect {
        self.arm_bounds()
    }

    fn react_to_collision(&mut self, other: &mut EntityCore, _direction: Direction) {
        if self.core.is_hostile_to(other) {
            other.add_damage(1);
        }
    }
}

// =============================================================================
// Prototype
// =============================================================================

/// Factory for pistons.
///
/// Options, all optional:
///
/// 0. expansion length in cells, at least 1 (default 1)
/// 1. direction code `0` up, `1` right, `2` down, `3` left (default down)
/// 2. open time as a fraction of the configured range (default 0.5)
/// 3. closed time as a fraction of the configured range (default 0.5)
/// 4. speed as a fraction of the configured range (default 0.5)
/// 5. start phase, taken modulo 4 (default 0)
///
/// Fractions accept `?` for a random pick.
#[derive(Debug)]
pub struct PistonPrototype {
    config: Arc<GameConfig>,
    rng: ChaCha8Rng,
}

impl PistonPrototype {
    /// Creates the prototype.
    #[must_use]
    pub fn new(config: Arc<GameConfig>, rng: ChaCha8Rng) -> Self {
        Self { config, rng }
    }

    /// Resolves spawn options into concrete parameters.
    pub fn params(&mut self, options: &[String]) -> PistonParams {
        let options = SpawnOptions::new("piston", options);
        let config = &self.config.piston;

        let length = options.int_or(0, "expansion_length", 1);
        let expansion_length = match u32::try_from(length) {
            Ok(length) if length >= 1 => length,
            _ => {
                options.fallback("expansion_length", &length.to_string(), 1);
                1
            }
        };

        let code = options.int_or(1, "direction", 2);
        let direction = Direction::from_code(code).unwrap_or_else(|| {
            options.fallback("direction", &code.to_string(), Direction::Down);
            Direction::Down
        });

        let open_time = options.interval_or(2, "open_time", config.open_time, 0.5, &mut self.rng);
        let closed_time =
            options.interval_or(3, "closed_time", config.closed_time, 0.5, &mut self.rng);
        let speed = options.interval_or(4, "speed", config.movement_speed, 0.5, &mut self.rng);

        let phase = options.int_or(5, "start_phase", 0).rem_euclid(4);

        PistonParams {
            expansion_length,
            direction,
            open_time,
            closed_time,
            speed,
            start_phase: usize::try_from(phase).unwrap_or(0),
        }
    }
}

impl Prototype for PistonPrototype {
    fn name(&self) -> &'static str {
        "piston"
    }

    fn create(&mut self, start: Vec2, options: &[String]) -> Result<Box<dyn Entity>, FactoryError> {
        let params = self.params(options);
        let piston =
            Piston::new(start, params, &self.config.piston).map_err(|source| {
                FactoryError::Construction {
                    prototype: self.name().to_string(),
                    source,
                }
            })?;
        Ok(Box::new(piston))
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::SceneCommands;

    fn tick(piston: &mut Piston, delta: f32) {
        let mut commands = SceneCommands::new();
        piston
            .update(&mut FrameContext::new(delta, None, &mut commands))
            .unwrap();
    }

    fn params(open: f32, closed: f32, speed: f32, length: u32) -> PistonParams {
        PistonParams {
            expansion_length: length,
            direction: Direction::Down,
            open_time: open,
            closed_time: closed,
            speed,
            start_phase: 0,
        }
    }

    fn opts(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    mod cycle_tests {
        use super::*;

        #[test]
        fn starts_open_and_fully_extended() {
            let piston = Piston::new(Vec2::ZERO, params(1.0, 1.0, 1.0, 3), &PistonConfig::default())
                .unwrap();
            assert_eq!(piston.phase(), PistonPhase::Open);
            assert_eq!(piston.extension(), 3.0);
        }

        #[test]
        fn walks_all_four_phases() {
            let mut piston =
                Piston::new(Vec2::ZERO, params(1.0, 1.0, 2.0, 2), &PistonConfig::default())
                    .unwrap();
            let mut seen = vec![piston.phase()];
            for _ in 0..4 {
                tick(&mut piston, 1.0);
                seen.push(piston.phase());
            }
            assert_eq!(
                seen,
                vec![
                    PistonPhase::Open,
                    PistonPhase::Closing,
                    PistonPhase::Closed,
                    PistonPhase::Opening,
                    PistonPhase::Open,
                ]
            );
        }

        #[test]
        fn closing_interpolates_linearly() {
            let mut piston =
                Piston::new(Vec2::ZERO, params(1.0, 1.0, 1.0, 2), &PistonConfig::default())
                    .unwrap();
            tick(&mut piston, 1.5);
            assert_eq!(piston.phase(), PistonPhase::Closing);
            assert!((piston.extension() - 1.5).abs() < 1e-5);
        }

        #[test]
        fn start_phase_wraps_modulo_four() {
            let config = PistonConfig::default();
            let mut p = params(1.0, 1.0, 1.0, 1);
            p.start_phase = 6;
            let piston = Piston::new(Vec2::ZERO, p, &config).unwrap();
            assert_eq!(piston.phase(), PistonPhase::Closed);
            assert_eq!(piston.extension(), 0.0);
        }

        #[test]
        fn zero_length_is_raised_to_one() {
            let piston = Piston::new(Vec2::ZERO, params(1.0, 1.0, 1.0, 0), &PistonConfig::default())
                .unwrap();
            assert_eq!(piston.extension(), 1.0);
        }
    }

    mod geometry_tests {
        use super::*;

        fn approx(a: f32, b: f32) -> bool {
            (a - b).abs() < 1e-5
        }

        #[test]
        fn base_sits_opposite_to_direction() {
            let config = PistonConfig::default();
            let piston = Piston::new(Vec2::ZERO, params(1.0, 1.0, 1.0, 1), &config).unwrap();
            // Pointing down: base on the upper edge of the cell.
            assert!(approx(piston.core().pos.y, -0.5 + config.base_height / 2.0));
            assert_eq!(piston.core().size, Vec2::new(1.0, config.base_height));
        }

        #[test]
        fn arm_extends_along_direction() {
            let config = PistonConfig::default();
            let mut p = params(1.0, 1.0, 1.0, 2);
            p.direction = Direction::Right;
            let piston = Piston::new(Vec2::ZERO, p, &config).unwrap();
            let arm = piston.arm_bounds();
            let face = -0.5 + config.base_height;
            let reach = 2.0 + (0.5 - config.base_height) - config.lower_margin;
            assert!(approx(arm.min().x, face));
            assert!(approx(arm.max().x, face + reach));
            assert!(approx(arm.size.y, config.piston_width));
            assert_eq!(piston.bounds(), arm);
        }

        #[test]
        fn closed_arm_stays_inside_own_cell() {
            let config = PistonConfig::default();
            let mut p = params(1.0, 1.0, 1.0, 1);
            p.start_phase = 2;
            let piston = Piston::new(Vec2::ZERO, p, &config).unwrap();
            assert!(piston.arm_bounds().max().y <= 0.5);
        }
    }

    mod collision_tests {
        use super::*;

        #[test]
        fn damages_hostile_party() {
            let mut piston =
                Piston::new(Vec2::ZERO, PistonParams::default(), &PistonConfig::default())
                    .unwrap();
            let mut player =
                EntityCore::new("player", Layer::Player, Team::Player, Vec2::ZERO, Vec2::ONE)
                    .with_lives(3);
            piston.react_to_collision(&mut player, Direction::Up);
            assert_eq!(player.lives(), 2);
        }

        #[test]
        fn ignores_friendly_party() {
            let mut piston =
                Piston::new(Vec2::ZERO, PistonParams::default(), &PistonConfig::default())
                    .unwrap();
            let mut other =
                EntityCore::new("enemy", Layer::Enemy, Team::Enemy, Vec2::ZERO, Vec2::ONE);
            piston.react_to_collision(&mut other, Direction::Up);
            assert_eq!(other.lives(), 1);
        }
    }

    mod prototype_tests {
        use super::*;

        fn prototype() -> PistonPrototype {
            PistonPrototype::new(Arc::new(GameConfig::default()), ChaCha8Rng::seed_from_u64(9))
        }

        #[test]
        fn no_options_give_defaults() {
            let config = PistonConfig::default();
            let params = prototype().params(&[]);
            assert_eq!(params.expansion_length, 1);
            assert_eq!(params.direction, Direction::Down);
            assert_eq!(params.open_time, config.open_time.at(0.5));
            assert_eq!(params.closed_time, config.closed_time.at(0.5));
            assert_eq!(params.speed, config.movement_speed.at(0.5));
            assert_eq!(params.start_phase, 0);
        }

        #[test]
        fn options_are_positional() {
            let params = prototype().params(&opts(&["3", "1", "0", "1", "1", "5"]));
            let config = PistonConfig::default();
            assert_eq!(params.expansion_length, 3);
            assert_eq!(params.direction, Direction::Right);
            assert_eq!(params.open_time, config.open_time.min);
            assert_eq!(params.closed_time, config.closed_time.max);
            assert_eq!(params.speed, config.movement_speed.max);
            assert_eq!(params.start_phase, 1);
        }

        #[test]
        fn closed_time_uses_closed_range() {
            let mut config = GameConfig::default();
            config.piston.open_time = rekit_state::Interval::fixed(9.0);
            config.piston.closed_time = rekit_state::Interval::fixed(0.25);
            let mut prototype =
                PistonPrototype::new(Arc::new(config), ChaCha8Rng::seed_from_u64(0));
            let params = prototype.params(&[]);
            assert_eq!(params.open_time, 9.0);
            assert_eq!(params.closed_time, 0.25);
        }

        #[test]
        fn malformed_options_fall_back() {
            let params = prototype().params(&opts(&["0", "7", "-1", "abc", "", "-1"]));
            assert_eq!(params.expansion_length, 1);
            assert_eq!(params.direction, Direction::Down);
            assert_eq!(params.open_time, PistonConfig::default().open_time.at(0.5));
            assert_eq!(params.start_phase, 3);
        }

        #[test]
        fn random_options_stay_in_range() {
            let config = PistonConfig::default();
            let mut prototype = prototype();
            for _ in 0..50 {
                let params = prototype.params(&opts(&["1", "2", "?", "?", "?"]));
                assert!(config.open_time.contains(params.open_time));
                assert!(config.closed_time.contains(params.closed_time));
                assert!(config.movement_speed.contains(params.speed));
            }
        }

        #[test]
        fn create_builds_a_piston() {
            let entity = prototype()
                .create(Vec2::new(4.0, 4.0), &opts(&["2"]))
                .unwrap();
            assert_eq!(entity.core().kind(), "piston");
            assert_eq!(entity.core().team(), Team::Enemy);
        }
    }
}
