//! Enemies whose behavior is driven by cyclic state machines.
//!
//! - [`Piston`]: extends and retracts an arm on a four phase cycle
//! - [`Canon`]: idles, aims at the focus and fires a [`CanonBullet`]

mod bullet;
mod canon;
mod piston;

pub use bullet::CanonBullet;
pub use canon::{AngleTracker, Canon, CanonContext, CanonPhase, CanonPrototype};
pub use piston::{Piston, PistonParams, PistonPhase, PistonPrototype};
