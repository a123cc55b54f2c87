//! Secondary HUD elements updated after the gameplay entities.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::Vec2;
use rekit_state::Timer;
use serde::{Deserialize, Serialize};

use crate::render::{RenderSurface, Rgba};

static NEXT_OVERLAY_ID: AtomicU64 = AtomicU64::new(1);

/// Ordering key of an overlay: draw layer first, then creation order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OverlayKey {
    layer: i32,
    id: u64,
}

impl OverlayKey {
    /// Allocates a fresh key on draw layer `layer`. Higher layers draw last.
    #[must_use]
    pub fn new(layer: i32) -> Self {
        Self {
            layer,
            id: NEXT_OVERLAY_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Draw layer.
    #[must_use]
    pub const fn layer(self) -> i32 {
        self.layer
    }
}

impl fmt::Display for OverlayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "overlay[{}]#{}", self.layer, self.id)
    }
}

/// Result of an overlay update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayStatus {
    /// Keep the overlay.
    Active,
    /// Remove the overlay after this pass.
    Finished,
}

/// A HUD element.
pub trait Overlay: Send {
    /// Ordering key.
    fn key(&self) -> OverlayKey;

    /// Advances the overlay by `delta` seconds.
    fn update(&mut self, delta: f32) -> OverlayStatus;

    /// Draws the overlay.
    fn render(&self, surface: &mut dyn RenderSurface);
}

/// A plain colored rectangle.
#[derive(Debug, Clone)]
pub struct Banner {
    key: OverlayKey,
    center: Vec2,
    size: Vec2,
    color: Rgba,
}

impl Banner {
    /// Creates a banner on draw layer `layer`.
    #[must_use]
    pub fn new(layer: i32, center: Vec2, size: Vec2, color: Rgba) -> Self {
        Self {
            key: OverlayKey::new(layer),
            center,
            size,
            color,
        }
    }
}

impl Overlay for Banner {
    fn key(&self) -> OverlayKey {
        self.key
    }

    fn update(&mut self, _delta: f32) -> OverlayStatus {
        OverlayStatus::Active
    }

    fn render(&self, surface: &mut dyn RenderSurface) {
        surface.draw_rect(self.center, self.size, self.color);
    }
}

/// Wraps an overlay and finishes it once a timer runs out.
///
/// ```
/// use glam::Vec2;
/// use rekit_core::overlay::{Banner, Overlay, OverlayStatus, TimedOverlay};
/// use rekit_core::render::Rgba;
///
/// let banner = Banner::new(0, Vec2::ZERO, Vec2::ONE, Rgba::WHITE);
/// let mut timed = TimedOverlay::new(banner, 1.0);
/// assert_eq!(timed.update(0.5), OverlayStatus::Active);
/// assert_eq!(timed.update(0.5), OverlayStatus::Finished);
/// ```
#[derive(Debug, Clone)]
pub struct TimedOverlay<O> {
    inner: O,
    timer: Timer,
}

impl<O: Overlay> TimedOverlay<O> {
    /// Shows `inner` for `seconds`.
    #[must_use]
    pub fn new(inner: O, seconds: f32) -> Self {
        Self {
            inner,
            timer: Timer::new(seconds),
        }
    }

    /// Seconds until the overlay finishes.
    #[must_use]
    pub fn remaining(&self) -> f32 {
        self.timer.remaining()
    }
}

impl<O: Overlay> Overlay for TimedOverlay<O> {
    fn key(&self) -> OverlayKey {
        self.inner.key()
    }

    fn update(&mut self, delta: f32) -> OverlayStatus {
        self.timer.tick(delta);
        if self.timer.is_up() {
            return OverlayStatus::Finished;
        }
        self.inner.update(delta)
    }

    fn render(&self, surface: &mut dyn RenderSurface) {
        self.inner.render(surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingSurface;

    #[test]
    fn keys_order_by_layer_then_creation() {
        let top = OverlayKey::new(5);
        let bottom = OverlayKey::new(1);
        let bottom_later = OverlayKey::new(1);
        assert!(bottom < bottom_later);
        assert!(bottom_later < top);
    }

    #[test]
    fn banner_never_finishes() {
        let mut banner = Banner::new(0, Vec2::ZERO, Vec2::ONE, Rgba::WHITE);
        for _ in 0..100 {
            assert_eq!(banner.update(10.0), OverlayStatus::Active);
        }
    }

    #[test]
    fn timed_overlay_keeps_inner_key_and_rendering() {
        let banner = Banner::new(3, Vec2::ZERO, Vec2::ONE, Rgba::BLACK);
        let key = banner.key();
        let timed = TimedOverlay::new(banner, 2.0);
        assert_eq!(timed.key(), key);

        let mut surface = RecordingSurface::new();
        timed.render(&mut surface);
        assert_eq!(surface.len(), 1);
    }

    #[test]
    fn timed_overlay_counts_down() {
        let banner = Banner::new(0, Vec2::ZERO, Vec2::ONE, Rgba::WHITE);
        let mut timed = TimedOverlay::new(banner, 1.0);
        assert_eq!(timed.update(0.25), OverlayStatus::Active);
        assert_eq!(timed.remaining(), 0.75);
        assert_eq!(timed.update(2.0), OverlayStatus::Finished);
    }
}
