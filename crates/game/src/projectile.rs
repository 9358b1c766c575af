//! The player's bullet: kinematic flight, flight limits and contact handling.
//!
//! The projectile is integrated by hand each tick (forward speed plus a separate vertical
//! velocity under gravity); the physics collaborator is only used for queries.

use engine_core::Transform;
use glam::Vec3;
use physics::{ColliderHandle, CollisionGroup, Contact, ContactCategory, SceneQuery};

use crate::classifier::{reflect, CollisionClassifier, NormalSource};
use crate::config::{ConfigError, Features, ProjectileConfig};
use crate::events::EndReason;
use crate::hooks::{HookId, TickHook, TickHooks};
use crate::state::SpeedMode;

/// What a handled contact meant for the run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ContactOutcome {
    EnemyHit {
        collider: ColliderHandle,
        point: Vec3,
    },
    BossHit {
        collider: ColliderHandle,
        point: Vec3,
    },
    RicochetSucceeded {
        remaining: u32,
        normal: Vec3,
        source: NormalSource,
    },
    RicochetFailed {
        normal: Vec3,
        source: NormalSource,
    },
}

impl ContactOutcome {
    /// How the surface normal was found, for ricochet outcomes.
    pub fn normal_source(&self) -> Option<NormalSource> {
        match self {
            Self::RicochetSucceeded { source, .. } | Self::RicochetFailed { source, .. } => {
                Some(*source)
            }
            _ => None,
        }
    }
}

/// Result of one projectile tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickOutcome {
    /// Velocity in the projectile's local frame; zero when it did not move.
    pub local_velocity: Vec3,
    /// Set when a flight limit ended the bullet this tick.
    pub ended: Option<EndReason>,
}

pub struct Projectile {
    config: ProjectileConfig,
    features: Features,
    spawn: Transform,
    transform: Transform,
    last_position: Vec3,
    vertical_velocity: f32,
    distance_traveled: f32,
    flight_timer: f32,
    ricochet_budget: u32,
    speed_mode: SpeedMode,
    active: bool,
    fired: bool,
    /// A contact was already handled this tick.
    contact_handled: bool,
    /// Colliders overlapped at the end of the previous contact query.
    touching: Vec<ColliderHandle>,
    hooks: TickHooks,
}

impl Projectile {
    /// Create an inactive projectile resting at `spawn`.
    pub fn new(
        config: &ProjectileConfig,
        features: Features,
        spawn: Transform,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let ricochet_budget = u32::try_from(config.ricochet_budget).map_err(|_| {
            ConfigError::Invalid {
                field: "projectile.ricochet_budget",
                reason: format!("must not be negative, got {}", config.ricochet_budget),
            }
        })?;
        Ok(Self {
            config: *config,
            features,
            spawn,
            transform: spawn,
            last_position: spawn.position,
            vertical_velocity: 0.0,
            distance_traveled: 0.0,
            flight_timer: 0.0,
            ricochet_budget,
            speed_mode: SpeedMode::Normal,
            active: false,
            fired: false,
            contact_handled: false,
            touching: Vec::new(),
            hooks: TickHooks::default(),
        })
    }

    /// Reset per-flight state and place the projectile back at its spawn pose.
    /// The ricochet budget belongs to the run and is left alone.
    pub fn activate(&mut self) {
        self.transform = self.spawn;
        self.last_position = self.spawn.position;
        self.vertical_velocity = 0.0;
        self.distance_traveled = 0.0;
        self.flight_timer = 0.0;
        self.speed_mode = SpeedMode::Normal;
        self.fired = false;
        self.contact_handled = false;
        self.touching.clear();
        self.active = true;
    }

    /// Launch along the current forward. Returns false if already fired or inactive.
    pub fn fire(&mut self) -> bool {
        if !self.active || self.fired {
            return false;
        }
        self.fired = true;
        self.flight_timer = 0.0;
        self.distance_traveled = 0.0;
        self.vertical_velocity = 0.0;
        self.last_position = self.transform.position;
        self.touching.clear();
        log::debug!("projectile fired from {:.2?}", self.transform.position);
        true
    }

    /// Advance the flight by `dt` scaled seconds.
    ///
    /// `gravity_scale` multiplies the configured gravity for this tick.
    pub fn tick(&mut self, dt: f32, gravity_scale: f32) -> TickOutcome {
        let dt = dt.max(0.0);
        self.contact_handled = false;
        self.hooks.run_pre(&mut self.transform);

        if !self.fired {
            self.hooks.run_post(&self.transform, Vec3::ZERO);
            return TickOutcome::default();
        }

        self.flight_timer += dt;
        if self.config.max_flight_seconds > 0.0 && self.flight_timer >= self.config.max_flight_seconds
        {
            self.end(EndReason::FlightTimeExceeded);
            return TickOutcome {
                local_velocity: Vec3::ZERO,
                ended: Some(EndReason::FlightTimeExceeded),
            };
        }

        let in_bullet_time = self.speed_mode == SpeedMode::BulletTime;
        let gravity = if in_bullet_time && self.config.reduce_gravity_in_bullet_time {
            0.0
        } else {
            self.config.gravity
        };
        self.vertical_velocity -= gravity * gravity_scale * dt;

        let velocity = self.transform.forward() * self.current_speed() + Vec3::Y * self.vertical_velocity;
        let displacement = velocity * dt;
        self.last_position = self.transform.position;
        self.transform.translate(displacement);
        self.distance_traveled += displacement.length();

        if self.config.max_distance > 0.0 && self.distance_traveled >= self.config.max_distance {
            self.end(EndReason::DistanceLimitReached);
            return TickOutcome {
                local_velocity: Vec3::ZERO,
                ended: Some(EndReason::DistanceLimitReached),
            };
        }

        let local_velocity = self.transform.to_local(velocity);
        self.hooks.run_post(&self.transform, local_velocity);
        TickOutcome {
            local_velocity,
            ended: None,
        }
    }

    /// Handle one contact. At most one contact per tick is acted on; later contacts in the
    /// same tick, contacts while not flying and unclassified contacts return `None`.
    pub fn on_contact<S: SceneQuery + ?Sized>(
        &mut self,
        contact: &Contact,
        classifier: &CollisionClassifier,
        scene: &S,
    ) -> Option<ContactOutcome> {
        if !self.fired || self.contact_handled {
            return None;
        }

        match classifier.classify(contact) {
            ContactCategory::Enemy => {
                self.contact_handled = true;
                self.distance_traveled = 0.0;
                Some(ContactOutcome::EnemyHit {
                    collider: contact.collider,
                    point: contact.point,
                })
            }
            ContactCategory::Boss => {
                self.contact_handled = true;
                Some(ContactOutcome::BossHit {
                    collider: contact.collider,
                    point: contact.point,
                })
            }
            ContactCategory::Environment => {
                self.contact_handled = true;
                let resolution = classifier.resolve_environment_normal(
                    self.last_position,
                    self.transform.position,
                    CollisionGroup::Environment.bits(),
                    scene,
                );
                if let Some(position) = resolution.corrected_position {
                    self.transform.position = position;
                }
                if self.features.has_ricochet && self.try_ricochet(resolution.normal) {
                    Some(ContactOutcome::RicochetSucceeded {
                        remaining: self.ricochet_budget,
                        normal: resolution.normal,
                        source: resolution.source,
                    })
                } else {
                    Some(ContactOutcome::RicochetFailed {
                        normal: resolution.normal,
                        source: resolution.source,
                    })
                }
            }
            ContactCategory::Other => None,
        }
    }

    /// Filter this tick's overlaps down to colliders the projectile has just entered.
    ///
    /// `overlaps` becomes the touching set for the next call, so a collider stays silent
    /// until the projectile leaves it and comes back.
    pub fn entered_contacts(&mut self, overlaps: Vec<Contact>) -> Vec<Contact> {
        let entered = overlaps
            .iter()
            .filter(|contact| !self.touching.contains(&contact.collider))
            .copied()
            .collect();
        self.touching = overlaps.into_iter().map(|contact| contact.collider).collect();
        entered
    }

    /// Bounce off a surface with unit `normal`, spending one ricochet.
    /// Returns false and changes nothing when the budget is empty.
    pub fn try_ricochet(&mut self, normal: Vec3) -> bool {
        if self.ricochet_budget == 0 {
            log::debug!("ricochet refused: budget spent");
            return false;
        }
        self.ricochet_budget -= 1;
        let reflected = reflect(self.transform.forward(), normal);
        self.transform.set_forward(reflected);
        self.vertical_velocity = 0.0;
        self.distance_traveled = 0.0;
        log::debug!(
            "ricochet off {:.2?}, new heading {:.2?}, {} left",
            normal,
            reflected,
            self.ricochet_budget
        );
        true
    }

    /// Point the projectile along `direction` and drop any accumulated fall.
    pub fn reaim(&mut self, direction: Vec3) {
        if direction.try_normalize().is_none() {
            log::warn!("ignoring zero-length aim direction");
            return;
        }
        self.transform.set_forward(direction);
        self.vertical_velocity = 0.0;
    }

    /// Turn toward `aim` by at most `max_angle` radians.
    pub fn steer(&mut self, aim: Vec3, max_angle: f32) {
        self.transform.turn_toward(aim, max_angle);
    }

    /// Stop flying. Returns false if the bullet was not in flight.
    pub fn end(&mut self, reason: EndReason) -> bool {
        if !self.fired {
            return false;
        }
        self.fired = false;
        self.active = false;
        log::info!("Bullet ended: {}", reason);
        true
    }

    pub fn set_speed_mode(&mut self, mode: SpeedMode) {
        self.speed_mode = mode;
    }

    pub fn add_hook(&mut self, hook: Box<dyn TickHook>) -> HookId {
        self.hooks.register(hook)
    }

    pub fn remove_hook(&mut self, id: HookId) -> Option<Box<dyn TickHook>> {
        self.hooks.unregister(id)
    }

    pub fn current_speed(&self) -> f32 {
        match self.speed_mode {
            SpeedMode::Normal => self.config.normal_speed,
            SpeedMode::BulletTime => self.config.bullet_time_speed,
        }
    }

    pub fn speed_mode(&self) -> SpeedMode {
        self.speed_mode
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn forward(&self) -> Vec3 {
        self.transform.forward()
    }

    pub fn last_position(&self) -> Vec3 {
        self.last_position
    }

    pub fn vertical_velocity(&self) -> f32 {
        self.vertical_velocity
    }

    pub fn distance_traveled(&self) -> f32 {
        self.distance_traveled
    }

    pub fn flight_timer(&self) -> f32 {
        self.flight_timer
    }

    pub fn ricochet_budget(&self) -> u32 {
        self.ricochet_budget
    }

    pub fn collider_radius(&self) -> f32 {
        self.config.collider_radius
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_fired(&self) -> bool {
        self.fired
    }
}
