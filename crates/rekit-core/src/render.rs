//! Drawing capability consumed by the scene.
//!
//! The scene never rasterizes anything itself. Entities and overlays issue
//! primitive draw calls against a [`RenderSurface`] supplied by the host.
//! [`RecordingSurface`] keeps the calls in a list, which is what tests and
//! the headless driver use.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::geometry::Polygon;

/// An RGBA color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba {
    /// Opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
}

/// Primitive drawing operations in world units.
pub trait RenderSurface {
    /// Fills an axis-aligned rectangle.
    fn draw_rect(&mut self, center: Vec2, size: Vec2, color: Rgba);

    /// Fills a circle.
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Rgba);

    /// Draws a polygon outline, or fills it when `filled` is set.
    fn draw_polygon(&mut self, polygon: &Polygon, color: Rgba, filled: bool);
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    /// See [`RenderSurface::draw_rect`].
    Rect {
        /// Center.
        center: Vec2,
        /// Size.
        size: Vec2,
        /// Color.
        color: Rgba,
    },
    /// See [`RenderSurface::draw_circle`].
    Circle {
        /// Center.
        center: Vec2,
        /// Radius.
        radius: f32,
        /// Color.
        color: Rgba,
    },
    /// See [`RenderSurface::draw_polygon`].
    Polygon {
        /// The polygon as drawn.
        polygon: Polygon,
        /// Color.
        color: Rgba,
        /// Filled or outline.
        filled: bool,
    },
}

/// A surface that records every call instead of drawing.
#[derive(Debug, Default, Clone)]
pub struct RecordingSurface {
    calls: Vec<DrawCall>,
}

impl RecordingSurface {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls recorded since the last [`clear`](Self::clear).
    #[must_use]
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    /// Returns `true` if nothing was drawn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Forgets all recorded calls.
    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl RenderSurface for RecordingSurface {
    fn draw_rect(&mut self, center: Vec2, size: Vec2, color: Rgba) {
        self.calls.push(DrawCall::Rect {
            center,
            size,
            color,
        });
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.calls.push(DrawCall::Circle {
            center,
            radius,
            color,
        });
    }

    fn draw_polygon(&mut self, polygon: &Polygon, color: Rgba, filled: bool) {
        self.calls.push(DrawCall::Polygon {
            polygon: polygon.clone(),
            color,
            filled,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_calls_in_order() {
        let mut surface = RecordingSurface::new();
        surface.draw_rect(Vec2::ZERO, Vec2::ONE, Rgba::WHITE);
        surface.draw_circle(Vec2::X, 0.5, Rgba::BLACK);
        assert_eq!(surface.len(), 2);
        assert!(matches!(surface.calls()[0], DrawCall::Rect { .. }));
        assert!(matches!(surface.calls()[1], DrawCall::Circle { radius, .. } if radius == 0.5));
        surface.clear();
        assert!(surface.is_empty());
    }

    #[test]
    fn color_parses_from_json() {
        let color: Rgba = serde_json::from_str(r#"{"r": 10, "g": 20, "b": 30, "a": 255}"#).unwrap();
        assert_eq!(color, Rgba::rgb(10, 20, 30));
    }
}
