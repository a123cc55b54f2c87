//! Collectables that act on whoever picks them up.

use std::sync::Arc;

use glam::Vec2;

use crate::config::{GameConfig, PickupConfig};
use crate::entity::{Entity, EntityCore, FrameContext, Layer, Team};
use crate::error::{EntityError, FactoryError};
use crate::geometry::Direction;
use crate::prototype::Prototype;
use crate::render::{RenderSurface, Rgba};

/// Gives lives to the collector and disappears.
#[derive(Debug)]
pub struct HealthPickup {
    core: EntityCore,
    heal: i32,
    color: Rgba,
}

impl HealthPickup {
    /// Creates a pickup centered on `pos`.
    #[must_use]
    pub fn new(pos: Vec2, config: &PickupConfig) -> Self {
        Self {
            core: EntityCore::new("health_pickup", Layer::Pickup, Team::Pickup, pos, config.size),
            heal: config.heal,
            color: config.color,
        }
    }

    /// Applies the pickup effect to `collector` and consumes the pickup.
    pub fn perform(&mut self, collector: &mut EntityCore) {
        collector.heal(self.heal);
        self.core.destroy();
    }
}

impl Entity for HealthPickup {
    fn core(&self) -> &EntityCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EntityCore {
        &mut self.core
    }

    fn update(&mut self, _ctx: &mut FrameContext<'_>) -> Result<(), EntityError> {
        Ok(())
    }

    fn render(&self, surface: &mut dyn RenderSurface) {
        surface.draw_rect(self.core.pos, self.core.size, self.color);
    }

    fn react_to_collision(&mut self, other: &mut EntityCore, _direction: Direction) {
        if self.core.is_hostile_to(other) && !self.core.is_marked_for_deletion() {
            self.perform(other);
        }
    }
}

/// Factory for health pickups. Takes no options.
#[derive(Debug)]
pub struct HealthPickupPrototype {
    config: Arc<GameConfig>,
}

impl HealthPickupPrototype {
    /// Creates the prototype.
    #[must_use]
    pub fn new(config: Arc<GameConfig>) -> Self {
        Self { config }
    }
}

impl Prototype for HealthPickupPrototype {
    fn name(&self) -> &'static str {
        "health_pickup"
    }

    fn create(&mut self, start: Vec2, _options: &[String]) -> Result<Box<dyn Entity>, FactoryError> {
        Ok(Box::new(HealthPickup::new(start, &self.config.pickup)))
    }
}
