//! Common ECS components used across the engine.

/// Health component for damageable entities.
#[derive(Debug, Clone, Copy)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Tag component for regular enemies.
#[derive(Debug, Clone, Copy, Default)]
pub struct Enemy;

/// Tag component for the level boss.
#[derive(Debug, Clone, Copy, Default)]
pub struct Boss;

/// Tag added once an entity has been killed; it stays in the world for presentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dead;
