//! Contact classification and ricochet surface normals.

use glam::Vec3;
use physics::{Contact, ContactCategory, Group, SceneQuery};

use crate::config::{Features, ProjectileConfig};

/// Where a ricochet normal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalSource {
    /// Retrospective probe along the last tick's movement hit the surface.
    Raycast,
    /// The probe missed; world up was used.
    Fallback,
}

/// Result of resolving the surface normal for an environment contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalResolution {
    /// Unit surface normal.
    pub normal: Vec3,
    /// Where to snap the projectile: the probe hit point pushed off the surface.
    /// `None` when the probe missed.
    pub corrected_position: Option<Vec3>,
    pub source: NormalSource,
}

/// Categorizes contacts and recovers surface normals for ricochets.
#[derive(Debug, Clone, Copy)]
pub struct CollisionClassifier {
    has_boss_lane: bool,
    collider_radius: f32,
    probe_epsilon: f32,
    surface_offset: f32,
}

impl CollisionClassifier {
    pub fn new(features: &Features, projectile: &ProjectileConfig) -> Self {
        Self {
            has_boss_lane: features.has_boss_lane,
            collider_radius: projectile.collider_radius,
            probe_epsilon: projectile.probe_epsilon,
            surface_offset: projectile.surface_offset,
        }
    }

    /// Category of a contact. Without a boss lane, bosses are plain enemies.
    pub fn classify(&self, contact: &Contact) -> ContactCategory {
        match contact.category {
            ContactCategory::Boss if !self.has_boss_lane => ContactCategory::Enemy,
            category => category,
        }
    }

    /// Probe from `last_position` toward `current_position` against colliders in `mask`.
    ///
    /// Contacts register when the surface is within the collider radius of the centre, so the
    /// ray runs past `current_position` by that radius plus a small epsilon. A miss, or a
    /// zero-length movement, falls back to world up.
    pub fn resolve_environment_normal<S: SceneQuery + ?Sized>(
        &self,
        last_position: Vec3,
        current_position: Vec3,
        mask: Group,
        scene: &S,
    ) -> NormalResolution {
        let delta = current_position - last_position;
        let hit = delta.try_normalize().and_then(|direction| {
            scene.raycast_first_hit(
                last_position,
                direction,
                delta.length() + self.collider_radius + self.probe_epsilon,
                mask,
            )
        });

        match hit.and_then(|hit| hit.normal.try_normalize().map(|n| (hit, n))) {
            Some((hit, normal)) => NormalResolution {
                normal,
                corrected_position: Some(hit.point + normal * self.surface_offset),
                source: NormalSource::Raycast,
            },
            None => {
                log::warn!(
                    "normal probe from {:.2?} to {:.2?} found no surface; using up",
                    last_position,
                    current_position
                );
                NormalResolution {
                    normal: Vec3::Y,
                    corrected_position: None,
                    source: NormalSource::Fallback,
                }
            }
        }
    }
}

/// Mirror `incident` about the plane with unit `normal`.
pub fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * incident.dot(normal) * normal
}
