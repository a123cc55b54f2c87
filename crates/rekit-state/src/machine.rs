//! Time-driven traversal of a state ring.

use tracing::{trace, warn};

use crate::ring::{State, StateRing};
use crate::Phase;

/// Largest value [`TimeStateMachine::progress`] reports: the greatest `f32`
/// below one.
pub const MAX_PROGRESS: f32 = 1.0 - f32::EPSILON / 2.0;

/// Deltas covering more than this many full cycles are folded instead of
/// walked state by state.
const MAX_WALKED_CYCLES: f32 = 16.0;

/// A machine that dwells in each state of a ring for that state's duration.
///
/// # Invariants
///
/// - After any [`update`](Self::update), `0 <= elapsed < current duration`.
/// - When a state's time runs out, the overflow is carried into the next
///   state, so one large delta may cross several phase boundaries.
/// - `enter` and `leave` run exactly once per visit of a state.
///
/// # Example
///
/// ```
/// use rekit_state::{Phase, RingBuilder, TimeStateMachine};
///
/// #[derive(Debug, PartialEq)]
/// enum Blink {
///     On,
///     Off,
/// }
///
/// impl Phase for Blink {
///     type Context = u32;
///
///     fn name(&self) -> &'static str {
///         "blink"
///     }
///
///     fn enter(&mut self, visits: &mut u32) {
///         *visits += 1;
///     }
/// }
///
/// let mut visits = 0;
/// let ring = RingBuilder::new()
///     .state(Blink::On, 1.0)
///     .state(Blink::Off, 1.0)
///     .build()
///     .unwrap();
/// let mut machine = TimeStateMachine::new(ring, &mut visits);
///
/// machine.update(3.5, &mut visits);
/// assert_eq!(*machine.phase(), Blink::Off);
/// assert_eq!(visits, 4);
/// ```
#[derive(Debug, Clone)]
pub struct TimeStateMachine<P> {
    ring: StateRing<P>,
    current: usize,
    elapsed: f32,
}

impl<P: Phase> TimeStateMachine<P> {
    /// Creates a machine positioned on the first state of `ring` and runs
    /// that state's `enter` hook.
    pub fn new(mut ring: StateRing<P>, ctx: &mut P::Context) -> Self {
        ring.get_mut(0).phase_mut().enter(ctx);
        Self {
            ring,
            current: 0,
            elapsed: 0.0,
        }
    }

    /// Creates a machine and immediately advances it `offset` times.
    ///
    /// Equivalent to [`new`](Self::new) followed by
    /// [`fast_forward`](Self::fast_forward).
    pub fn with_offset(ring: StateRing<P>, offset: usize, ctx: &mut P::Context) -> Self {
        let mut machine = Self::new(ring, ctx);
        machine.fast_forward(offset, ctx);
        machine
    }

    /// Advances time by `delta` seconds.
    ///
    /// Negative and non-finite deltas are treated as zero. After the
    /// transitions, the current phase's `update` hook runs once.
    ///
    /// Every state visited within the delta has its `leave` and `enter`
    /// hooks run exactly once per visit, as long as the delta covers fewer
    /// than 16 full cycles. Longer deltas are first reduced modulo the cycle
    /// length: the machine lands on the same state and offset, but the hooks
    /// of the skipped whole cycles never run. An owner that counts visits
    /// (a turret firing once per shooting phase) sees only the visits of the
    /// remainder.
    pub fn update(&mut self, delta: f32, ctx: &mut P::Context) {
        let delta = if delta.is_finite() && delta > 0.0 {
            delta
        } else {
            0.0
        };
        self.elapsed += delta;

        let cycle = self.ring.total_duration();
        if self.elapsed >= cycle * MAX_WALKED_CYCLES {
            // A full cycle lands on the same state with the same offset.
            warn!(
                elapsed = self.elapsed,
                cycle, "folding oversized delta into a single cycle"
            );
            self.elapsed %= cycle;
        }

        while self.elapsed >= self.state().duration() {
            self.elapsed -= self.state().duration();
            self.transition(ctx);
        }

        self.ring
            .get_mut(self.current)
            .phase_mut()
            .update(ctx, delta);
    }

    /// Leaves the current state and enters the next one, resetting the
    /// elapsed time to zero.
    pub fn advance(&mut self, ctx: &mut P::Context) {
        self.transition(ctx);
        self.elapsed = 0.0;
    }

    /// Calls [`advance`](Self::advance) `steps` times.
    pub fn fast_forward(&mut self, steps: usize, ctx: &mut P::Context) {
        for _ in 0..steps {
            self.advance(ctx);
        }
    }

    fn transition(&mut self, ctx: &mut P::Context) {
        let from = self.current;
        let to = self.ring.get(from).next();

        self.ring.get_mut(from).phase_mut().leave(ctx);
        self.current = to;
        self.ring.get_mut(to).phase_mut().enter(ctx);

        trace!(
            from = self.ring.get(from).phase().name(),
            to = self.ring.get(to).phase().name(),
            "phase transition"
        );
    }
}

impl<P> TimeStateMachine<P> {
    /// The active state.
    #[must_use]
    pub fn state(&self) -> &State<P> {
        self.ring.get(self.current)
    }

    /// The active state's phase value.
    #[must_use]
    pub fn phase(&self) -> &P {
        self.state().phase()
    }

    /// Mutable access to the active phase value.
    #[must_use]
    pub fn phase_mut(&mut self) -> &mut P {
        self.ring.get_mut(self.current).phase_mut()
    }

    /// Index of the active state in the ring.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Seconds spent in the active state.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Seconds left before the active state ends.
    #[must_use]
    pub fn remaining(&self) -> f32 {
        (self.state().duration() - self.elapsed).max(0.0)
    }

    /// Fraction of the active state's duration already spent.
    ///
    /// Clamped to `[0, 1)`. A zero-duration state reports `0`.
    #[must_use]
    pub fn progress(&self) -> f32 {
        let duration = self.state().duration();
        if duration <= 0.0 {
            return 0.0;
        }
        (self.elapsed / duration).clamp(0.0, MAX_PROGRESS)
    }

    /// The underlying ring.
    #[must_use]
    pub fn ring(&self) -> &StateRing<P> {
        &self.ring
    }
}
