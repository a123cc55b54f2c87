//! Projectile fired by the canon.

use glam::Vec2;
use rekit_state::Timer;

use crate::config::BulletConfig;
use crate::entity::{Entity, EntityCore, FrameContext, Layer, Team};
use crate::error::EntityError;
use crate::geometry::Direction;
use crate::render::{RenderSurface, Rgba};

/// A bullet flying in a straight line until it hits something or expires.
#[derive(Debug)]
pub struct CanonBullet {
    core: EntityCore,
    lifetime: Timer,
    color: Rgba,
}

impl CanonBullet {
    /// Creates a bullet at `pos` moving along `direction`.
    #[must_use]
    pub fn new(pos: Vec2, direction: Vec2, config: &BulletConfig) -> Self {
        let mut core = EntityCore::new(
            "canon_bullet",
            Layer::Projectile,
            Team::Enemy,
            pos,
            Vec2::splat(config.size),
        );
        core.vel = direction.normalize_or_zero() * config.speed;
        Self {
            core,
            lifetime: Timer::new(config.lifetime),
            color: config.color,
        }
    }

    /// Seconds left before the bullet disappears.
    #[must_use]
    pub fn remaining_lifetime(&self) -> f32 {
        self.lifetime.remaining()
    }
}

impl Entity for CanonBullet {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn update(&mut self, ctx: &mut FrameContext<'_>) -> Result<(), EntityError> {
        self.lifetime.tick(ctx.delta());
        if self.lifetime.is_up() {
            self.core.destroy();
            return Ok(());
        }
        self.core.pos += self.core.vel * ctx.delta();
        if self.core.pos.is_finite() {
            Ok(())
        } else {
            Err(EntityError::NonFinitePosition {
                position: self.core.pos,
            })
        }
    }

    fn render(&self, surface: &mut dyn RenderSurface) {
        surface.draw_circle(self.core.pos, self.core.size.x / 2.0, self.color);
    }

    fn react_to_collision(&mut self, other: &mut EntityCore, _direction: Direction) {
        if self.core.is_hostile_to(other) {
            other.add_damage(1);
            self.core.destroy();
        }
    }
}
