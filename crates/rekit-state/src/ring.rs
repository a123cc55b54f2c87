//! Closed rings of states.
//!
//! States are stored in an indexed arena and link to their successor by
//! index. The builder wires every new state as the successor of the previous
//! one; the last state initially points one past the end and is back-patched
//! to the first state when the ring is closed by [`RingBuilder::build`].

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::error::StateError;

/// One node of a state ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State<P> {
    phase: P,
    duration: f32,
    next: usize,
}

impl<P> State<P> {
    /// The phase value held by this state.
    #[must_use]
    pub fn phase(&self) -> &P {
        &self.phase
    }

    /// Mutable access to the phase value.
    #[must_use]
    pub fn phase_mut(&mut self) -> &mut P {
        &mut self.phase
    }

    /// Dwell duration in seconds.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Index of the state that follows this one.
    #[must_use]
    pub fn next(&self) -> usize {
        self.next
    }
}

/// Incrementally assembles a [`StateRing`].
///
/// # Example
///
/// ```
/// use rekit_state::RingBuilder;
///
/// let ring = RingBuilder::new()
///     .state("open", 1.0)
///     .state("closing", 0.5)
///     .build()
///     .unwrap();
///
/// assert_eq!(ring.len(), 2);
/// assert_eq!(ring.get(1).next(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct RingBuilder<P> {
    states: Vec<State<P>>,
}

impl<P> RingBuilder<P> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { states: Vec::new() }
    }

    /// Appends a state that follows the previously appended one.
    #[must_use]
    pub fn state(mut self, phase: P, duration: f32) -> Self {
        let next = self.states.len() + 1;
        self.states.push(State {
            phase,
            duration,
            next,
        });
        self
    }

    /// Validates the durations and closes the cycle.
    ///
    /// # Errors
    ///
    /// - [`StateError::EmptyRing`] if no state was added
    /// - [`StateError::InvalidDuration`] for a negative or non-finite duration
    /// - [`StateError::DegenerateCycle`] if every duration is zero
    pub fn build(mut self) -> Result<StateRing<P>, StateError> {
        if self.states.is_empty() {
            return Err(StateError::EmptyRing);
        }

        let mut total = 0.0_f32;
        for (index, state) in self.states.iter().enumerate() {
            if !state.duration.is_finite() || state.duration < 0.0 {
                return Err(StateError::InvalidDuration {
                    index,
                    duration: state.duration,
                });
            }
            total += state.duration;
        }
        if total <= 0.0 {
            return Err(StateError::DegenerateCycle);
        }

        // Back-patch: the last state still points past the end.
        if let Some(last) = self.states.last_mut() {
            last.next = 0;
        }

        Ok(StateRing {
            states: self.states,
            total_duration: total,
        })
    }
}

impl<P> Default for RingBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// A closed cycle of states.
///
/// Following [`State::next`] `len()` times from any state returns to that
/// state. Deserialized rings are rebuilt through [`RingBuilder`], so a
/// restored ring satisfies the same checks as a freshly built one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateRing<P> {
    states: Vec<State<P>>,
    total_duration: f32,
}

impl<P> StateRing<P> {
    /// Number of states in the ring. Never zero.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always `false`; a built ring holds at least one state.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Sum of all dwell durations, i.e. the length of one full cycle.
    #[must_use]
    pub fn total_duration(&self) -> f32 {
        self.total_duration
    }

    /// Returns the state at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[must_use]
    pub fn get(&self, index: usize) -> &State<P> {
        &self.states[index]
    }

    /// Mutable access to the state at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[must_use]
    pub fn get_mut(&mut self, index: usize) -> &mut State<P> {
        &mut self.states[index]
    }

    /// Follows `next` links `steps` times starting from `from`.
    #[must_use]
    pub fn walk(&self, from: usize, steps: usize) -> usize {
        (0..steps).fold(from, |index, _| self.states[index].next)
    }

    /// Iterates the states in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &State<P>> + '_ {
        self.states.iter()
    }
}

/// Wire form of a ring; `total_duration` is recomputed on restore.
#[derive(Deserialize)]
struct StoredRing<P> {
    states: Vec<State<P>>,
}

impl<P> StoredRing<P> {
    fn rebuild(self) -> Result<StateRing<P>, StateError> {
        let links: Vec<usize> = self.states.iter().map(State::next).collect();
        let ring = self
            .states
            .into_iter()
            .fold(RingBuilder::new(), |builder, state| {
                builder.state(state.phase, state.duration)
            })
            .build()?;

        for (index, next) in links.into_iter().enumerate() {
            if ring.get(index).next() != next {
                return Err(StateError::BrokenLink { index, next });
            }
        }
        Ok(ring)
    }
}

impl<'de, P: Deserialize<'de>> Deserialize<'de> for StateRing<P> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        StoredRing::deserialize(deserializer)?
            .rebuild()
            .map_err(de::Error::custom)
    }
}
