//! Level content: static geometry in the physics world and targets in the ECS world.

use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;

use engine_core::{Boss, Dead, Entity, Enemy, Health, Transform, World};
use glam::{Quat, Vec3};
use physics::{ColliderHandle, CollisionGroup, PhysicsWorld};

/// Kind of target standing in the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Enemy,
    Boss,
}

/// A shootable target. Lives next to [`Health`] and an [`Enemy`] or [`Boss`] tag.
#[derive(Debug, Clone, Copy)]
pub struct Target {
    pub kind: TargetKind,
    pub collider: ColliderHandle,
    pub position: Vec3,
}

/// Result of damaging a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetHit {
    pub entity: Entity,
    pub kind: TargetKind,
    pub killed: bool,
}

/// The face of a wall the projectile can bank off.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallFace {
    pub point: Vec3,
    pub normal: Vec3,
}

impl WallFace {
    /// Mirror image of `point` behind this face. Aiming at it from in front banks off the wall
    /// toward `point`.
    pub fn mirror(&self, point: Vec3) -> Vec3 {
        point - 2.0 * (point - self.point).dot(self.normal) * self.normal
    }
}

// Capsule dimensions of a standing target.
const TARGET_HALF_HEIGHT: f32 = 0.6;
const TARGET_RADIUS: f32 = 0.4;

pub struct Level {
    physics: PhysicsWorld,
    world: World,
    by_collider: HashMap<ColliderHandle, Entity>,
    walls: Vec<WallFace>,
    spawn: Transform,
}

impl Level {
    /// An empty level with the projectile resting at `spawn`.
    pub fn new(spawn: Transform) -> Self {
        Self {
            physics: PhysicsWorld::new(),
            world: World::new(),
            by_collider: HashMap::new(),
            walls: Vec::new(),
            spawn,
        }
    }

    /// The scripted demo range: two enemies down the lane, a boss off to the side and a back
    /// wall to bank the final shot off.
    pub fn demo() -> Self {
        let mut level = Self::new(Transform::facing(Vec3::new(0.0, 1.5, 0.0), -Vec3::Z));
        level.add_ground(0.0);
        level.add_wall(Vec3::new(0.0, 5.0, -70.5), 0.0, Vec3::new(15.0, 5.0, 0.5));
        level.add_wall(Vec3::new(-15.5, 5.0, -40.0), FRAC_PI_2, Vec3::new(30.0, 5.0, 0.5));
        level.add_wall(Vec3::new(15.5, 5.0, -40.0), -FRAC_PI_2, Vec3::new(30.0, 5.0, 0.5));
        level.add_enemy(Vec3::new(0.0, 1.4, -20.0));
        level.add_enemy(Vec3::new(6.0, 1.4, -40.0));
        level.add_boss(Vec3::new(-10.0, 1.4, -50.0));
        level.finish();
        level
    }

    pub fn add_ground(&mut self, height: f32) -> ColliderHandle {
        self.physics.add_ground_plane(height)
    }

    /// Add a wall cuboid. Its +Z face (after the Y rotation) is recorded as a bank face.
    pub fn add_wall(&mut self, center: Vec3, rotation_y: f32, half_extents: Vec3) -> ColliderHandle {
        let normal = Quat::from_rotation_y(rotation_y) * Vec3::Z;
        self.walls.push(WallFace {
            point: center + normal * half_extents.z,
            normal,
        });
        self.physics.add_static_cuboid(center, rotation_y, half_extents)
    }

    pub fn add_enemy(&mut self, position: Vec3) -> Entity {
        self.add_target(TargetKind::Enemy, position)
    }

    pub fn add_boss(&mut self, position: Vec3) -> Entity {
        self.add_target(TargetKind::Boss, position)
    }

    fn add_target(&mut self, kind: TargetKind, position: Vec3) -> Entity {
        let group = match kind {
            TargetKind::Enemy => CollisionGroup::Enemy,
            TargetKind::Boss => CollisionGroup::Boss,
        };
        let collider =
            self.physics
                .add_target_capsule(position, TARGET_HALF_HEIGHT, TARGET_RADIUS, group);
        let target = Target {
            kind,
            collider,
            position,
        };
        let entity = match kind {
            TargetKind::Enemy => self.world.spawn((target, Health::new(1.0), Enemy)),
            TargetKind::Boss => self.world.spawn((target, Health::new(1.0), Boss)),
        };
        self.by_collider.insert(collider, entity);
        entity
    }

    /// Rebuild the query pipeline. Call once after adding content.
    pub fn finish(&mut self) {
        self.physics.update_query_pipeline();
    }

    /// Deal one point of damage to the target owning `collider`. A killed target is tagged
    /// [`Dead`] and its collider leaves the physics world.
    pub fn hit_target(&mut self, collider: ColliderHandle) -> Option<TargetHit> {
        let entity = *self.by_collider.get(&collider)?;
        let kind = self.world.get::<&Target>(entity).ok()?.kind;
        let killed = {
            let mut health = self.world.get::<&mut Health>(entity).ok()?;
            health.take_damage(1.0);
            health.is_dead()
        };

        if killed {
            if self.world.insert_one(entity, Dead).is_err() {
                log::warn!("target {:?} vanished while dying", entity);
            }
            self.by_collider.remove(&collider);
            self.physics.remove_collider(collider);
            self.physics.update_query_pipeline();
            log::debug!("{:?} {:?} killed", kind, entity);
        }

        Some(TargetHit {
            entity,
            kind,
            killed,
        })
    }

    pub fn living_enemies(&self) -> usize {
        self.world
            .query::<(&Target, &Enemy)>()
            .without::<&Dead>()
            .iter()
            .count()
    }

    /// Closest living enemy to `from`.
    pub fn nearest_enemy(&self, from: Vec3) -> Option<Vec3> {
        self.world
            .query::<(&Target, &Enemy)>()
            .without::<&Dead>()
            .iter()
            .map(|(_, (target, _))| target.position)
            .min_by(|a, b| a.distance_squared(from).total_cmp(&b.distance_squared(from)))
    }

    pub fn living_boss(&self) -> Option<Vec3> {
        self.world
            .query::<(&Target, &Boss)>()
            .without::<&Dead>()
            .iter()
            .map(|(_, (target, _))| target.position)
            .next()
    }

    pub fn walls(&self) -> &[WallFace] {
        &self.walls
    }

    pub fn spawn(&self) -> Transform {
        self.spawn
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn world(&self) -> &World {
        &self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use physics::{ContactCategory, SceneQuery};

    #[test]
    fn demo_has_targets_and_walls() {
        let level = Level::demo();
        assert_eq!(level.living_enemies(), 2);
        assert!(level.living_boss().is_some());
        assert_eq!(level.walls().len(), 3);
    }

    #[test]
    fn killing_an_enemy_removes_its_collider() {
        let mut level = Level::new(Transform::default());
        let position = Vec3::new(0.0, 0.0, -5.0);
        level.add_enemy(position);
        level.finish();

        let contacts = level.physics().contacts(position, 0.1);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].category, ContactCategory::Enemy);

        let hit = level.hit_target(contacts[0].collider).unwrap();
        assert!(hit.killed);
        assert_eq!(hit.kind, TargetKind::Enemy);
        assert_eq!(level.living_enemies(), 0);
        assert!(level.physics().contacts(position, 0.1).is_empty());
        assert!(level.hit_target(contacts[0].collider).is_none());
    }

    #[test]
    fn boss_contacts_are_boss() {
        let mut level = Level::new(Transform::default());
        level.add_boss(Vec3::ZERO);
        level.finish();
        let contacts = level.physics().contacts(Vec3::ZERO, 0.1);
        assert_eq!(contacts[0].category, ContactCategory::Boss);
    }

    #[test]
    fn rotated_wall_faces_inward() {
        let mut level = Level::new(Transform::default());
        level.add_wall(Vec3::new(-15.5, 5.0, 0.0), FRAC_PI_2, Vec3::new(30.0, 5.0, 0.5));
        let face = level.walls()[0];
        assert!((face.normal - Vec3::X).length() < 1e-5);
        assert!((face.point - Vec3::new(-15.0, 5.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn nearest_enemy_picks_closest() {
        let mut level = Level::new(Transform::default());
        level.add_enemy(Vec3::new(0.0, 0.0, -30.0));
        level.add_enemy(Vec3::new(0.0, 0.0, -10.0));
        assert_eq!(level.nearest_enemy(Vec3::ZERO), Some(Vec3::new(0.0, 0.0, -10.0)));
    }

    #[test]
    fn wall_mirror_reflects_across_face() {
        let face = WallFace {
            point: Vec3::new(0.0, 0.0, -70.0),
            normal: Vec3::Z,
        };
        assert_eq!(
            face.mirror(Vec3::new(-10.0, 1.0, -50.0)),
            Vec3::new(-10.0, 1.0, -90.0)
        );
    }
}
