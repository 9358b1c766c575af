//! Transform component and utilities for spatial positioning.

use glam::{Quat, Vec3};

/// A 3D pose: position and orientation.
///
/// Forward is negative Z in right-handed coordinates, matching the rest of the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform at `position` facing `forward`.
    pub fn facing(position: Vec3, forward: Vec3) -> Self {
        let mut transform = Self::from_position(position);
        transform.set_forward(forward);
        transform
    }

    /// Get the forward direction (negative Z in right-handed coordinates).
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Translate the transform by a delta.
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// Rotate so that `forward()` points along `direction`, using the shortest arc
    /// from the current forward. Zero-length directions are ignored.
    pub fn set_forward(&mut self, direction: Vec3) {
        let Some(target) = direction.try_normalize() else {
            return;
        };
        let arc = Quat::from_rotation_arc(self.forward(), target);
        self.rotation = (arc * self.rotation).normalize();
    }

    /// Turn the forward direction toward `direction` by at most `max_angle` radians.
    pub fn turn_toward(&mut self, direction: Vec3, max_angle: f32) {
        let Some(target) = direction.try_normalize() else {
            return;
        };
        let current = self.forward();
        let angle = current.angle_between(target);
        if angle <= max_angle || angle <= f32::EPSILON {
            self.set_forward(target);
            return;
        }
        let arc = Quat::from_rotation_arc(current, target);
        let (axis, _) = arc.to_axis_angle();
        self.rotation = (Quat::from_axis_angle(axis, max_angle) * self.rotation).normalize();
    }

    /// Express a world-space vector in this transform's local frame.
    pub fn to_local(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * world
    }
}
