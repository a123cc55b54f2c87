//! Closed value ranges for configurable durations and speeds.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A closed range `[min, max]` of non-negative values.
///
/// Configuration files describe tunable quantities (dwell times, movement
/// speeds) as intervals. A concrete value is picked once at construction,
/// either by a fraction in `[0, 1]` or by sampling.
///
/// # Example
///
/// ```
/// use rekit_state::Interval;
///
/// let open_time = Interval::new(0.5, 1.5);
/// assert_eq!(open_time.at(0.0), 0.5);
/// assert_eq!(open_time.at(0.5), 1.0);
/// assert_eq!(open_time.at(7.0), 1.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    /// Lower bound.
    pub min: f32,
    /// Upper bound.
    pub max: f32,
}

impl Interval {
    /// Creates an interval, swapping the bounds if given in reverse.
    #[must_use]
    pub fn new(min: f32, max: f32) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// An interval holding a single value.
    #[must_use]
    pub fn fixed(value: f32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// Linear interpolation between the bounds; `fraction` is clamped to
    /// `[0, 1]`, and a NaN fraction selects the midpoint.
    #[must_use]
    pub fn at(&self, fraction: f32) -> f32 {
        let fraction = if fraction.is_nan() {
            0.5
        } else {
            fraction.clamp(0.0, 1.0)
        };
        self.min + (self.max - self.min) * fraction
    }

    /// Draws a value uniformly from the interval.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.min >= self.max {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }

    /// Returns `true` if `value` lies within the bounds.
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Returns `true` if both bounds are finite, non-negative and ordered.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min >= 0.0 && self.min <= self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn new_orders_bounds() {
        let interval = Interval::new(3.0, 1.0);
        assert_eq!(interval.min, 1.0);
        assert_eq!(interval.max, 3.0);
    }

    #[test]
    fn at_interpolates_and_clamps() {
        let interval = Interval::new(2.0, 4.0);
        assert_eq!(interval.at(0.25), 2.5);
        assert_eq!(interval.at(-1.0), 2.0);
        assert_eq!(interval.at(2.0), 4.0);
        assert_eq!(interval.at(f32::NAN), 3.0);
    }

    #[test]
    fn fixed_interval_always_yields_its_value() {
        let interval = Interval::fixed(0.7);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(interval.at(0.9), 0.7);
        assert_eq!(interval.sample(&mut rng), 0.7);
    }

    #[test]
    fn samples_stay_in_bounds() {
        let interval = Interval::new(0.5, 2.0);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..1000 {
            assert!(interval.contains(interval.sample(&mut rng)));
        }
    }

    #[test]
    fn sampling_is_deterministic_for_a_seed() {
        let interval = Interval::new(0.0, 10.0);
        let mut a = ChaCha8Rng::seed_from_u64(7);
        let mut b = ChaCha8Rng::seed_from_u64(7);
        let left: Vec<f32> = (0..16).map(|_| interval.sample(&mut a)).collect();
        let right: Vec<f32> = (0..16).map(|_| interval.sample(&mut b)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn validity() {
        assert!(Interval::new(0.0, 1.0).is_valid());
        assert!(!Interval { min: -1.0, max: 1.0 }.is_valid());
        assert!(!Interval { min: 2.0, max: 1.0 }.is_valid());
        assert!(!Interval::new(0.0, f32::INFINITY).is_valid());
    }

    #[test]
    fn deserializes_from_json() {
        let interval: Interval = serde_json::from_str(r#"{"min": 0.25, "max": 0.75}"#).unwrap();
        assert_eq!(interval, Interval::new(0.25, 0.75));
    }
}
