//! # rekit-state
//!
//! Cyclic, time-driven state machines for periodic game behavior.
//!
//! A machine is a closed ring of states. Each state carries a phase value
//! (usually a small enum owned by the entity that drives the machine) and a
//! dwell duration. Feeding frame deltas into [`TimeStateMachine::update`]
//! advances the ring whenever the dwell time of the current state is used
//! up, carrying any overflow into the following state.
//!
//! - [`Phase`]: enter/leave/update hooks implemented by the owner's phase enum
//! - [`RingBuilder`] / [`StateRing`]: construction and wiring of the cycle
//! - [`TimeStateMachine`]: elapsed-time bookkeeping and transitions
//! - [`Interval`]: min/max ranges for configurable durations and speeds
//! - [`Timer`]: a plain countdown
//!
//! ## Quick Start
//!
//! ```
//! use rekit_state::{Phase, RingBuilder, TimeStateMachine};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! enum Light {
//!     Green,
//!     Red,
//! }
//!
//! impl Phase for Light {
//!     type Context = ();
//!
//!     fn name(&self) -> &'static str {
//!         match self {
//!             Self::Green => "green",
//!             Self::Red => "red",
//!         }
//!     }
//! }
//!
//! let ring = RingBuilder::new()
//!     .state(Light::Green, 2.0)
//!     .state(Light::Red, 1.0)
//!     .build()
//!     .unwrap();
//! let mut machine = TimeStateMachine::new(ring, &mut ());
//!
//! machine.update(2.5, &mut ());
//! assert_eq!(*machine.phase(), Light::Red);
//! assert!((machine.elapsed() - 0.5).abs() < f32::EPSILON);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod interval;
pub mod machine;
pub mod ring;
pub mod timer;

pub use error::StateError;
pub use interval::Interval;
pub use machine::{TimeStateMachine, MAX_PROGRESS};
pub use ring::{RingBuilder, State, StateRing};
pub use timer::Timer;

/// Behavior of one phase of a cyclic machine.
///
/// Implemented by a closed enum owned by the driving entity. Each variant
/// carries only the data its behavior needs; dispatch happens with a `match`
/// inside the hook bodies.
///
/// Hooks receive an owner-defined context. Machines that need nothing use
/// `()`.
pub trait Phase {
    /// Data handed to every hook by the owner of the machine.
    type Context: ?Sized;

    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Runs exactly once each time the machine moves into this phase.
    fn enter(&mut self, _ctx: &mut Self::Context) {}

    /// Runs exactly once each time the machine moves out of this phase.
    fn leave(&mut self, _ctx: &mut Self::Context) {}

    /// Runs once per machine update, after any transitions, on the phase
    /// that is current at the end of the update.
    fn update(&mut self, _ctx: &mut Self::Context, _delta: f32) {}
}
