//! Directions, boxes and polygons in world units.
//!
//! World space uses grid units with `y` growing downwards, so
//! [`Direction::Up`] is `(0, -1)`.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// One of the four axis directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards negative `y`.
    Up,
    /// Towards positive `x`.
    Right,
    /// Towards positive `y`.
    Down,
    /// Towards negative `x`.
    Left,
}

impl Direction {
    /// All directions in code order.
    pub const ALL: [Self; 4] = [Self::Up, Self::Right, Self::Down, Self::Left];

    /// Looks up a direction by its numeric code (`0` up, `1` right,
    /// `2` down, `3` left).
    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|index| Self::ALL.get(index).copied())
    }

    /// Unit vector pointing in this direction.
    #[must_use]
    pub const fn vector(self) -> Vec2 {
        match self {
            Self::Up => Vec2::new(0.0, -1.0),
            Self::Right => Vec2::new(1.0, 0.0),
            Self::Down => Vec2::new(0.0, 1.0),
            Self::Left => Vec2::new(-1.0, 0.0),
        }
    }

    /// The direction pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
        }
    }

    /// Returns `true` for `Up` and `Down`.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }

    /// Lays out a box that is `along` long in this direction and `across`
    /// wide perpendicular to it.
    #[must_use]
    pub fn oriented_size(self, along: f32, across: f32) -> Vec2 {
        if self.is_vertical() {
            Vec2::new(across, along)
        } else {
            Vec2::new(along, across)
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "Up"),
            Self::Right => write!(f, "Right"),
            Self::Down => write!(f, "Down"),
            Self::Left => write!(f, "Left"),
        }
    }
}

/// Axis-aligned box described by its center and full size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Center point.
    pub center: Vec2,
    /// Full width and height.
    pub size: Vec2,
}

impl Rect {
    /// Creates a box from center and size.
    #[must_use]
    pub const fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    /// Minimum corner.
    #[must_use]
    pub fn min(&self) -> Vec2 {
        self.center - self.size * 0.5
    }

    /// Maximum corner.
    #[must_use]
    pub fn max(&self) -> Vec2 {
        self.center + self.size * 0.5
    }

    /// Returns `true` if the two boxes overlap with positive area.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x < b_max.x && b_min.x < a_max.x && a_min.y < b_max.y && b_min.y < a_max.y
    }

    /// Returns `true` if `point` lies inside or on the border.
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        let (min, max) = (self.min(), self.max());
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }
}

/// A polygon with vertices relative to an origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Reference point the vertices are relative to.
    pub origin: Vec2,
    /// Vertices relative to `origin`.
    pub points: Vec<Vec2>,
}

impl Polygon {
    /// Creates a polygon.
    #[must_use]
    pub fn new(origin: Vec2, points: Vec<Vec2>) -> Self {
        Self { origin, points }
    }

    /// Returns a copy rotated by `angle` radians around `pivot`.
    #[must_use]
    pub fn rotate(&self, angle: f32, pivot: Vec2) -> Self {
        let rotation = Vec2::from_angle(angle);
        let origin_offset = self.origin - pivot;
        let points = self
            .points
            .iter()
            .map(|p| rotation.rotate(origin_offset + *p) - origin_offset)
            .collect();
        Self {
            origin: self.origin,
            points,
        }
    }
}

/// Unit vector of a barrel angle. Angle `0` points down (`+y`) and
/// positive angles turn toward `-x`.
#[must_use]
pub fn aim_vector(angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(Vec2::Y)
}

/// Barrel angle pointing from `from` to `to`, the inverse of [`aim_vector`].
#[must_use]
pub fn angle_toward(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    (-d.x).atan2(d.y)
}
