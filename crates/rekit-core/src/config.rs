//! Tunable parameters, loaded once and shared immutably.
//!
//! Every section has a `Default` matching the stock game and accepts
//! partial JSON: missing fields keep their defaults.
//!
//! ```
//! use rekit_core::config::GameConfig;
//!
//! let config = GameConfig::from_json_str(r#"{ "canon": { "angle_speed": 4.0 } }"#).unwrap();
//! assert_eq!(config.canon.angle_speed, 4.0);
//! assert_eq!(config.bullet, Default::default());
//! ```

use std::fs;
use std::path::Path;

use glam::Vec2;
use rekit_state::Interval;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::render::Rgba;

// =============================================================================
// Sections
// =============================================================================

/// Scene scheduler settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Accumulate wall-clock update time per entity kind.
    pub profile_updates: bool,
}

/// Piston geometry, colors and timing ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PistonConfig {
    /// Thickness of the base plate, in cells.
    pub base_height: f32,
    /// Width of the moving arm, in cells.
    pub piston_width: f32,
    /// Gap left between the arm tip and the end of its reach.
    pub lower_margin: f32,
    /// Base plate color.
    pub base_color: Rgba,
    /// Arm color.
    pub arm_color: Rgba,
    /// Dwell range of the fully extended phase, in seconds.
    pub open_time: Interval,
    /// Dwell range of the fully retracted phase, in seconds.
    pub closed_time: Interval,
    /// Range of arm speeds, in cells per second.
    pub movement_speed: Interval,
}

impl Default for PistonConfig {
    fn default() -> Self {
        Self {
            base_height: 0.25,
            piston_width: 0.5,
            lower_margin: 0.1,
            base_color: Rgba::rgb(110, 110, 120),
            arm_color: Rgba::rgb(200, 60, 40),
            open_time: Interval::new(0.5, 2.0),
            closed_time: Interval::new(0.5, 2.0),
            movement_speed: Interval::new(1.0, 10.0),
        }
    }
}

/// Turret timing, turning speed and look.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonConfig {
    /// Size of the turret body.
    pub size: Vec2,
    /// Seconds spent idle at the rest angle.
    pub idle_time: f32,
    /// Seconds spent turning toward the focus.
    pub aiming_time: f32,
    /// Seconds spent holding the aim after firing.
    pub shooting_time: f32,
    /// Turning speed in radians per second.
    pub angle_speed: f32,
    /// Barrel angle while idle, in radians.
    pub rest_angle: f32,
    /// Body color.
    pub body_color: Rgba,
    /// Barrel color.
    pub barrel_color: Rgba,
    /// Barrel half-width.
    pub barrel_width: f32,
    /// Barrel length measured from the body center.
    pub barrel_length: f32,
}

impl Default for CanonConfig {
    fn default() -> Self {
        Self {
            size: Vec2::new(0.8, 0.8),
            idle_time: 2.0,
            aiming_time: 1.0,
            shooting_time: 0.5,
            angle_speed: 2.0,
            rest_angle: 0.0,
            body_color: Rgba::rgb(60, 60, 70),
            barrel_color: Rgba::rgb(30, 30, 30),
            barrel_width: 0.3,
            barrel_length: 0.9,
        }
    }
}

/// Turret projectile parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulletConfig {
    /// Flight speed in cells per second.
    pub speed: f32,
    /// Seconds before the bullet disappears on its own.
    pub lifetime: f32,
    /// Diameter.
    pub size: f32,
    /// Color.
    pub color: Rgba,
}

impl Default for BulletConfig {
    fn default() -> Self {
        Self {
            speed: 6.0,
            lifetime: 3.0,
            size: 0.2,
            color: Rgba::rgb(250, 200, 30),
        }
    }
}

/// Health pickup parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickupConfig {
    /// Size of the pickup.
    pub size: Vec2,
    /// Color.
    pub color: Rgba,
    /// Lives given to the collector.
    pub heal: i32,
}

impl Default for PickupConfig {
    fn default() -> Self {
        Self {
            size: Vec2::new(0.5, 0.5),
            color: Rgba::rgb(40, 200, 80),
            heal: 1,
        }
    }
}

// =============================================================================
// GameConfig
// =============================================================================

/// All tunables of the game.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Piston settings.
    pub piston: PistonConfig,
    /// Turret settings.
    pub canon: CanonConfig,
    /// Turret projectile settings.
    pub bullet: BulletConfig,
    /// Health pickup settings.
    pub pickup: PickupConfig,
    /// Scheduler settings.
    pub scene: SceneConfig,
}

impl GameConfig {
    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed input and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
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

    /// Checks ranges and speeds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_interval("piston.open_time", self.piston.open_time)?;
        check_interval("piston.closed_time", self.piston.closed_time)?;
        check_interval("piston.movement_speed", self.piston.movement_speed)?;
        if self.piston.movement_speed.min <= 0.0 {
            return Err(invalid("piston.movement_speed", "speeds must be positive"));
        }
        if !(0.0..0.5).contains(&self.piston.base_height) {
            return Err(invalid("piston.base_height", "must lie in [0, 0.5)"));
        }
        check_non_negative("piston.piston_width", self.piston.piston_width)?;
        check_non_negative("piston.lower_margin", self.piston.lower_margin)?;

        check_non_negative("canon.idle_time", self.canon.idle_time)?;
        check_non_negative("canon.aiming_time", self.canon.aiming_time)?;
        check_non_negative("canon.shooting_time", self.canon.shooting_time)?;
        if self.canon.idle_time + self.canon.aiming_time + self.canon.shooting_time <= 0.0 {
            return Err(invalid("canon", "phase durations must not all be zero"));
        }
        check_positive("canon.angle_speed", self.canon.angle_speed)?;
        if !self.canon.rest_angle.is_finite() {
            return Err(invalid("canon.rest_angle", "must be finite"));
        }

        check_non_negative("bullet.speed", self.bullet.speed)?;
        check_non_negative("bullet.lifetime", self.bullet.lifetime)?;
        check_positive("bullet.size", self.bullet.size)?;
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

fn check_interval(field: &'static str, interval: Interval) -> Result<(), ConfigError> {
    if interval.is_valid() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!(
                "range [{}, {}] must be finite, non-negative and ordered",
                interval.min, interval.max
            ),
        })
    }
}

fn check_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} must be finite and non-negative"),
        })
    }
}

fn check_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("{value} must be finite and positive"),
        })
    }
}
