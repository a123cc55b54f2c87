//! Entity factories keyed by name.
//!
//! A [`Prototype`] is a long-lived template that builds fresh entities from
//! a spawn position and a list of free-form option strings. Options are
//! positional and interpreted by each prototype; a missing or malformed
//! option never fails a spawn, it falls back to the documented default and
//! logs a warning.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use glam::Vec2;
//! use rekit_core::config::GameConfig;
//! use rekit_core::prototype::PrototypeRegistry;
//!
//! let mut registry = PrototypeRegistry::with_defaults(Arc::new(GameConfig::default()), 7);
//! assert_eq!(registry.names(), vec!["canon", "health_pickup", "piston"]);
//!
//! let piston = registry
//!     .spawn("piston", Vec2::new(3.0, 1.0), &["2".into(), "banana".into()])
//!     .unwrap();
//! assert_eq!(piston.core().kind(), "piston");
//! assert!(registry.spawn("dragon", Vec2::ZERO, &[]).is_err());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rekit_state::Interval;
use tracing::{debug, warn};

use crate::config::GameConfig;
use crate::enemies::{CanonPrototype, PistonPrototype};
use crate::entity::Entity;
use crate::error::FactoryError;
use crate::pickups::HealthPickupPrototype;

/// Wildcard option value asking for a random pick.
pub const RANDOM_OPTION: &str = "?";

/// A template producing entities of one kind.
pub trait Prototype: Send {
    /// Registry name.
    fn name(&self) -> &'static str;

    /// Builds a new entity at `start`.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::Construction`] only if the configuration the
    /// prototype was built with cannot produce a valid state machine.
    /// Malformed options are not errors.
    fn create(&mut self, start: Vec2, options: &[String]) -> Result<Box<dyn Entity>, FactoryError>;

    /// Restarts the prototype's random stream from `seed`. Prototypes
    /// without randomness ignore it.
    fn reseed(&mut self, _seed: u64) {}
}

// =============================================================================
// Option parsing
// =============================================================================

/// Positional view of spawn options with logged fallbacks.
#[derive(Debug, Clone, Copy)]
pub struct SpawnOptions<'a> {
    prototype: &'static str,
    options: &'a [String],
}

impl<'a> SpawnOptions<'a> {
    /// Wraps the options of one spawn of `prototype`.
    #[must_use]
    pub fn new(prototype: &'static str, options: &'a [String]) -> Self {
        Self { prototype, options }
    }

    /// The trimmed option at `index`, or `None` if absent or blank.
    #[must_use]
    pub fn raw(&self, index: usize) -> Option<&'a str> {
        self.options
            .get(index)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    /// Parses an integer option.
    #[must_use]
    pub fn int_or(&self, index: usize, name: &'static str, default: i64) -> i64 {
        match self.raw(index) {
            None => default,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                self.fallback(name, raw, default);
                default
            }),
        }
    }

    /// Resolves a value of `interval` from a fraction in `[0, 1]`.
    /// [`RANDOM_OPTION`] samples the interval with `rng`; absent or
    /// malformed fractions use `default`.
    pub fn interval_or<R: Rng + ?Sized>(
        &self,
        index: usize,
        name: &'static str,
        interval: Interval,
        default: f32,
        rng: &mut R,
    ) -> f32 {
        match self.raw(index) {
            None => interval.at(default),
            Some(RANDOM_OPTION) => interval.sample(rng),
            Some(raw) => match raw.parse::<f32>() {
                Ok(value) if (0.0..=1.0).contains(&value) => interval.at(value),
                _ => {
                    self.fallback(name, raw, default);
                    interval.at(default)
                }
            },
        }
    }

    /// Logs that option `name` was replaced by `default`.
    pub fn fallback(&self, name: &'static str, raw: &str, default: impl fmt::Display) {
        warn!(
            prototype = self.prototype,
            option = name,
            value = raw,
            %default,
            "malformed spawn option, using default"
        );
    }
}

// =============================================================================
// PrototypeRegistry
// =============================================================================

/// Name-indexed collection of prototypes.
#[derive(Default)]
pub struct PrototypeRegistry {
    prototypes: HashMap<&'static str, Box<dyn Prototype>>,
    seed: u64,
}

impl PrototypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the stock piston, canon and health pickup.
    ///
    /// Each prototype gets its own random stream derived from `seed`, so a
    /// level spawned twice with the same seed is identical.
    #[must_use]
    pub fn with_defaults(config: Arc<GameConfig>, seed: u64) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(PistonPrototype::new(
            Arc::clone(&config),
            ChaCha8Rng::seed_from_u64(seed),
        )));
        registry.register(Box::new(CanonPrototype::new(Arc::clone(&config))));
        registry.register(Box::new(HealthPickupPrototype::new(config)));
        registry.reseed(seed);
        registry
    }

    /// Seed the random streams were last started from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Restarts every prototype's random stream from a seed derived from
    /// `seed` and the prototype's name order.
    pub fn reseed(&mut self, seed: u64) {
        let mut seeds = ChaCha8Rng::seed_from_u64(seed);
        for name in self.names() {
            if let Some(prototype) = self.prototypes.get_mut(name) {
                prototype.reseed(seeds.gen());
            }
        }
        self.seed = seed;
        debug!(seed, prototypes = self.prototypes.len(), "reseeded prototypes");
    }

    /// Restarts every random stream from the current seed, so the next
    /// spawns repeat the ones made since the last reseed.
    pub fn rewind(&mut self) {
        self.reseed(self.seed);
    }

    /// Adds `prototype`, replacing any prototype with the same name.
    pub fn register(&mut self, prototype: Box<dyn Prototype>) {
        if let Some(previous) = self.prototypes.insert(prototype.name(), prototype) {
            warn!(name = previous.name(), "replaced registered prototype");
        }
    }

    /// Builds an entity from the prototype called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::UnknownPrototype`] if nothing is registered
    /// under `name`, or the prototype's own construction error.
    pub fn spawn(
        &mut self,
        name: &str,
        start: Vec2,
        options: &[String],
    ) -> Result<Box<dyn Entity>, FactoryError> {
        self.prototypes
            .get_mut(name)
            .ok_or_else(|| FactoryError::UnknownPrototype(name.to_string()))?
            .create(start, options)
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.prototypes.contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.prototypes.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered prototypes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }
}

impl fmt::Debug for PrototypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrototypeRegistry")
            .field("names", &self.names())
            .finish()
    }
}
