//! One run: input, level, controller and frame clock stepped together.

use engine_core::Time;
use input::InputState;

use crate::bullet_time::{time_scale_for, BulletTimeController, FrameReport};
use crate::config::{ConfigError, GameConfig};
use crate::events::Presentation;
use crate::level::{Level, TargetKind};
use crate::projectile::{ContactOutcome, Projectile};
use crate::state::FlightPhase;

pub struct Session<P: Presentation> {
    controller: BulletTimeController<P>,
    level: Level,
    input: InputState,
    time: Time,
    score: u32,
}

impl<P: Presentation> Session<P> {
    pub fn new(config: &GameConfig, level: Level, presentation: P) -> Result<Self, ConfigError> {
        let projectile = Projectile::new(&config.projectile, config.features, level.spawn())?;
        let controller = BulletTimeController::new(
            config,
            projectile,
            time_scale_for(&config.time),
            presentation,
        )?;
        Ok(Self {
            controller,
            level,
            input: InputState::new(),
            time: Time::new(),
            score: 0,
        })
    }

    /// Host-side input. Presses land on the next [`Self::step`].
    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    /// Advance one frame of `real_dt` seconds and apply hits to the level.
    pub fn step(&mut self, real_dt: f32) -> FrameReport {
        let frame = self.input.begin_frame();
        let report = self.controller.update(real_dt, &frame, self.level.physics());
        self.time.advance(real_dt, self.controller.time_scale().current());

        let collider = match report.contact {
            Some(ContactOutcome::EnemyHit { collider, .. })
            | Some(ContactOutcome::BossHit { collider, .. }) => Some(collider),
            _ => None,
        };
        if let Some(hit) = collider.and_then(|c| self.level.hit_target(c)) {
            if hit.killed && hit.kind == TargetKind::Enemy {
                self.score += 1;
                log::info!("Score: {}", self.score);
            }
        }
        report
    }

    /// The terminal phase, once the run is over.
    pub fn outcome(&self) -> Option<FlightPhase> {
        let phase = self.controller.phase();
        phase.is_terminal().then_some(phase)
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn controller(&self) -> &BulletTimeController<P> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut BulletTimeController<P> {
        &mut self.controller
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn time(&self) -> &Time {
        &self.time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventLog, Notice};
    use engine_core::Transform;
    use glam::Vec3;
    use input::Signal;

    fn lane() -> Level {
        let mut level = Level::new(Transform::facing(Vec3::new(0.0, 1.5, 0.0), -Vec3::Z));
        level.add_enemy(Vec3::new(0.0, 1.4, -6.0));
        level.finish();
        level
    }

    #[test]
    fn enemy_in_the_lane_is_killed_and_scored() {
        let mut session = Session::new(&GameConfig::default(), lane(), EventLog::new()).unwrap();
        session.input_mut().press(Signal::Start);
        for _ in 0..600 {
            session.step(1.0 / 60.0);
            if session.score() > 0 {
                break;
            }
        }
        assert_eq!(session.score(), 1);
        assert_eq!(session.level().living_enemies(), 0);
        assert_eq!(
            session.controller().presentation().count(|n| matches!(n, Notice::EnemyHit(_))),
            1
        );
        assert_eq!(session.controller().phase(), FlightPhase::RampingDown { quick: true });
    }

    #[test]
    fn clock_tracks_scaled_time() {
        let mut session = Session::new(&GameConfig::default(), lane(), ()).unwrap();
        session.step(0.5);
        assert_eq!(session.time().frame_count(), 1);
        assert!((session.time().scaled_delta_seconds() - 0.3).abs() < 1e-4);
        assert!(session.outcome().is_none());
    }
}
