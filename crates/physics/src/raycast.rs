//! Scene queries: raycasts for surface normals and overlaps for contacts.

use crate::collision::{Contact, ContactCategory};
use crate::PhysicsWorld;
use engine_core::Vec3;
use rapier3d::prelude::*;

/// Result of a raycast query.
#[derive(Debug, Clone, Copy)]
pub struct RaycastHit {
    /// The collider that was hit.
    pub collider: ColliderHandle,
    /// Distance along the ray to the hit point.
    pub distance: f32,
    /// World position of the hit.
    pub point: Vec3,
    /// Surface normal at the hit point.
    pub normal: Vec3,
}

/// Geometry queries the simulation core needs from the physics collaborator.
pub trait SceneQuery {
    /// First hit along `direction` within `max_distance`, restricted to colliders whose
    /// membership intersects `mask`.
    fn raycast_first_hit(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: Group,
    ) -> Option<RaycastHit>;

    /// Every collider overlapping a sphere of `radius` at `center`.
    fn contacts(&self, center: Vec3, radius: f32) -> Vec<Contact>;
}

fn mask_filter(mask: Group) -> QueryFilter<'static> {
    QueryFilter::default().groups(InteractionGroups::new(Group::ALL, mask))
}

impl SceneQuery for PhysicsWorld {
    fn raycast_first_hit(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: Group,
    ) -> Option<RaycastHit> {
        let direction = direction.try_normalize()?;
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );

        self.query_pipeline
            .cast_ray_and_get_normal(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                max_distance,
                true,
                mask_filter(mask),
            )
            .map(|(collider, intersection)| {
                let point = ray.point_at(intersection.time_of_impact);
                RaycastHit {
                    collider,
                    distance: intersection.time_of_impact,
                    point: Vec3::new(point.x, point.y, point.z),
                    normal: Vec3::new(
                        intersection.normal.x,
                        intersection.normal.y,
                        intersection.normal.z,
                    ),
                }
            })
    }

    fn contacts(&self, center: Vec3, radius: f32) -> Vec<Contact> {
        let shape = Ball::new(radius);
        let shape_pos = Isometry::translation(center.x, center.y, center.z);
        let query_point = point![center.x, center.y, center.z];

        let mut contacts = Vec::new();
        self.query_pipeline.intersections_with_shape(
            &self.rigid_body_set,
            &self.collider_set,
            &shape_pos,
            &shape,
            QueryFilter::default(),
            |handle| {
                if let Some(collider) = self.collider_set.get(handle) {
                    let projection =
                        collider
                            .shape()
                            .project_point(collider.position(), &query_point, true);
                    contacts.push(Contact {
                        collider: handle,
                        category: ContactCategory::from_memberships(
                            collider.collision_groups().memberships,
                        ),
                        point: Vec3::new(
                            projection.point.x,
                            projection.point.y,
                            projection.point.z,
                        ),
                    });
                }
                true // Continue searching
            },
        );

        // Stable order so the single contact resolved per tick is deterministic.
        contacts.sort_by_key(|c| c.collider.into_raw_parts());
        contacts
    }
}
