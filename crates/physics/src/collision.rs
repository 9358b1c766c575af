//! Collision groups, contact categories and contacts.

use engine_core::Vec3;
use rapier3d::prelude::*;

/// Collision groups for different entity types.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroup {
    /// Static environment (ground, walls, props). Projectiles ricochet off these.
    Environment = 1 << 0,
    /// Regular enemies.
    Enemy = 1 << 1,
    /// The level boss. Boss colliders are members of `Enemy` as well.
    Boss = 1 << 2,
    /// The player's projectile.
    Projectile = 1 << 3,
}

impl CollisionGroup {
    /// Rapier group holding just this bit.
    pub fn bits(self) -> Group {
        Group::from_bits_retain(self as u32)
    }

    /// Create a collision group for environment.
    pub fn environment() -> (Group, Group) {
        (Self::Environment.bits(), Group::ALL)
    }

    /// Create a collision group for enemies.
    pub fn enemy() -> (Group, Group) {
        (Self::Enemy.bits(), Group::ALL)
    }

    /// Create a collision group for the boss.
    pub fn boss() -> (Group, Group) {
        (Self::Enemy.bits() | Self::Boss.bits(), Group::ALL)
    }

    /// Create a collision group for the projectile.
    pub fn projectile() -> (Group, Group) {
        let membership = Self::Projectile.bits();
        let filter = Self::Environment.bits() | Self::Enemy.bits() | Self::Boss.bits();
        (membership, filter)
    }

    /// Interaction groups for a collider of this kind.
    pub fn interaction_groups(self) -> InteractionGroups {
        let (membership, filter) = match self {
            Self::Environment => Self::environment(),
            Self::Enemy => Self::enemy(),
            Self::Boss => Self::boss(),
            Self::Projectile => Self::projectile(),
        };
        InteractionGroups::new(membership, filter)
    }
}

/// What kind of surface a contact touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactCategory {
    Enemy,
    Boss,
    Environment,
    Other,
}

impl ContactCategory {
    /// Classify a collider by its membership bits. Boss wins over enemy.
    pub fn from_memberships(memberships: Group) -> Self {
        if memberships.contains(CollisionGroup::Boss.bits()) {
            Self::Boss
        } else if memberships.contains(CollisionGroup::Enemy.bits()) {
            Self::Enemy
        } else if memberships.contains(CollisionGroup::Environment.bits()) {
            Self::Environment
        } else {
            Self::Other
        }
    }
}

/// One overlap between the projectile's collision volume and world geometry.
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// The collider that was touched.
    pub collider: ColliderHandle,
    /// Category of the touched collider.
    pub category: ContactCategory,
    /// Closest point on the touched collider to the projectile center.
    pub point: Vec3,
}
