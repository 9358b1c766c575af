//! Bullet-time controller: drives the time scale and the projectile's speed mode from flight
//! events and player signals.
//!
//! Ramps run against real time through [`TimeScale`]; delayed actions (the boss win) sit in a
//! [`Timers`] queue. Neither advances while paused.

use engine_core::{TimeScale, Timers};
use glam::Vec3;
use input::FrameInput;
use physics::SceneQuery;

use crate::classifier::{CollisionClassifier, NormalSource};
use crate::config::{ConfigError, Features, GameConfig, LimitPolicy, TimeConfig};
use crate::events::{EndReason, GameOverReason, Presentation};
use crate::projectile::{ContactOutcome, Projectile};
use crate::state::{FlightPhase, PauseSnapshot, RampPurpose, SpeedMode};

/// Actions scheduled on the real-time queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delayed {
    Win,
}

/// What happened during one [`BulletTimeController::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    /// A ramp reached its target this frame.
    pub ramp_completed: Option<RampPurpose>,
    /// The contact acted on this frame, if any.
    pub contact: Option<ContactOutcome>,
    /// A flight limit ended the bullet this frame.
    pub ended: Option<EndReason>,
    /// Projectile velocity in its local frame after this frame's tick.
    pub local_velocity: Vec3,
    /// Scaled seconds the projectile was advanced by.
    pub scaled_dt: f32,
}

/// Build the time scale a controller expects: starting at normal speed, capped at normal.
pub fn time_scale_for(config: &TimeConfig) -> TimeScale<RampPurpose> {
    TimeScale::new(
        config.normal_time_scale,
        config.normal_time_scale,
        config.base_fixed_step,
    )
}

pub struct BulletTimeController<P: Presentation> {
    time: TimeConfig,
    features: Features,
    limit_policy: LimitPolicy,
    boss_win_delay: f32,
    steer_turn_rate: f32,
    projectile: Projectile,
    classifier: CollisionClassifier,
    time_scale: TimeScale<RampPurpose>,
    timers: Timers<Delayed>,
    presentation: P,
    phase: FlightPhase,
    pause: Option<PauseSnapshot>,
    aim_open: bool,
    aim: Vec3,
    win_pending: bool,
}

impl<P: Presentation> BulletTimeController<P> {
    pub fn new(
        config: &GameConfig,
        projectile: Projectile,
        mut time_scale: TimeScale<RampPurpose>,
        presentation: P,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        time_scale.set_scale(config.time.normal_time_scale);
        Ok(Self {
            time: config.time,
            features: config.features,
            limit_policy: config.limit_policy,
            boss_win_delay: config.boss_win_delay,
            steer_turn_rate: config.projectile.steer_turn_rate,
            classifier: CollisionClassifier::new(&config.features, &config.projectile),
            aim: projectile.forward(),
            projectile,
            time_scale,
            timers: Timers::new(),
            presentation,
            phase: FlightPhase::Idle,
            pause: None,
            aim_open: false,
            win_pending: false,
        })
    }

    /// Run one frame of `real_dt` unscaled seconds.
    ///
    /// Order: pause toggle, start, aim, confirm, ramp and timer progress, projectile tick,
    /// then at most one newly entered contact.
    pub fn update<S: SceneQuery + ?Sized>(
        &mut self,
        real_dt: f32,
        input: &FrameInput,
        scene: &S,
    ) -> FrameReport {
        let mut report = FrameReport::default();
        let real_dt = real_dt.max(0.0);

        if input.pause_pressed {
            self.toggle_pause();
        }
        if self.phase == FlightPhase::Paused || self.phase.is_terminal() {
            return report;
        }

        if input.start_pressed {
            self.start();
        }
        if self.aim_open {
            self.aim = input.aim;
        }
        if input.confirm_pressed {
            self.confirm();
        }
        if self.phase == FlightPhase::Idle {
            return report;
        }

        if let Some(purpose) = self.time_scale.advance(real_dt) {
            self.on_ramp_complete(purpose);
            report.ramp_completed = Some(purpose);
        }
        for action in self.timers.advance(real_dt) {
            match action {
                Delayed::Win => self.win(),
            }
        }
        if self.phase.is_terminal() {
            return report;
        }

        let dt = real_dt * self.time_scale.current();
        report.scaled_dt = dt;
        if self.features.has_steering_input
            && !self.aim_open
            && self.projectile.speed_mode() == SpeedMode::Normal
        {
            self.projectile.steer(input.aim, self.steer_turn_rate * dt);
        }

        let tick = self.projectile.tick(dt, 1.0);
        report.local_velocity = tick.local_velocity;
        if let Some(reason) = tick.ended {
            report.ended = Some(reason);
            self.on_flight_limit(reason);
            return report;
        }

        if self.projectile.is_fired() && !self.win_pending {
            let overlaps =
                scene.contacts(self.projectile.position(), self.projectile.collider_radius());
            let entered = self.projectile.entered_contacts(overlaps);
            for contact in &entered {
                if let Some(outcome) = self.projectile.on_contact(contact, &self.classifier, scene) {
                    self.on_contact_outcome(outcome);
                    report.contact = Some(outcome);
                    break;
                }
            }
        }
        report
    }

    /// Start signal: activate and fire the projectile, then ramp down at the normal pace.
    pub fn start(&mut self) {
        if self.phase != FlightPhase::Idle {
            return;
        }
        self.projectile.activate();
        if !self.projectile.fire() {
            log::warn!("start ignored: projectile could not fire");
            return;
        }
        self.presentation.on_fired();
        self.aim = self.projectile.forward();
        self.time_scale.ramp_to(
            self.time.bullet_time_scale,
            self.time.normal_ramp_step,
            self.time.normal_ramp_interval,
            RampPurpose::EnterBulletTime,
        );
        self.phase = FlightPhase::RampingDown { quick: false };
    }

    /// Confirm signal: leave bullet time along the current aim.
    pub fn confirm(&mut self) {
        if self.phase != FlightPhase::BulletTime {
            return;
        }
        self.aim_open = false;
        self.projectile.set_speed_mode(SpeedMode::Normal);
        self.projectile.reaim(self.aim);
        self.presentation.on_bullet_time_exited();
        self.time_scale.ramp_to(
            self.time.normal_time_scale,
            self.time.normal_ramp_step,
            self.time.normal_ramp_interval,
            RampPurpose::ExitBulletTime,
        );
        self.phase = FlightPhase::RampingUp;
    }

    pub fn toggle_pause(&mut self) {
        if self.phase == FlightPhase::Paused {
            self.resume();
        } else {
            self.pause();
        }
    }

    /// Stop time, remembering the phase, speed mode, aim gate and ramp in flight.
    pub fn pause(&mut self) {
        if self.phase == FlightPhase::Paused || self.phase.is_terminal() {
            return;
        }
        self.pause = Some(PauseSnapshot {
            phase: self.phase,
            scale: self.time_scale.suspend(),
            speed_mode: self.projectile.speed_mode(),
            aim_open: self.aim_open,
        });
        self.aim_open = false;
        self.phase = FlightPhase::Paused;
        self.presentation.on_paused();
    }

    /// Resume exactly where [`Self::pause`] left off.
    pub fn resume(&mut self) {
        if self.phase != FlightPhase::Paused {
            return;
        }
        let Some(snapshot) = self.pause.take() else {
            return;
        };
        self.time_scale.restore(snapshot.scale);
        self.projectile.set_speed_mode(snapshot.speed_mode);
        self.aim_open = snapshot.aim_open;
        self.phase = snapshot.phase;
        self.presentation.on_resumed();
    }

    /// Enemy hit: blood at `point`, then the quick ramp into bullet time.
    pub fn on_enemy_hit(&mut self, point: Vec3) {
        if !self.reacts_to_flight_events() {
            return;
        }
        self.presentation.on_enemy_hit(point);
        self.quick_ramp_down();
    }

    /// Successful ricochet: same response as an enemy hit.
    pub fn on_ricochet_succeeded(&mut self, remaining: u32) {
        if !self.reacts_to_flight_events() {
            return;
        }
        self.presentation.on_ricochet(remaining);
        self.quick_ramp_down();
    }

    pub fn on_ricochet_failed(&mut self) {
        if !self.reacts_to_flight_events() {
            return;
        }
        self.game_over(GameOverReason::NoRicochetsLeft);
    }

    /// Boss hit: the win follows after a real-time delay. Only the first hit counts.
    pub fn on_boss_hit(&mut self) {
        if !self.reacts_to_flight_events() {
            return;
        }
        self.win_pending = true;
        self.timers.schedule(self.boss_win_delay, Delayed::Win);
        log::info!("Boss hit, win in {:.1}s", self.boss_win_delay);
    }

    /// The projectile ran out of distance or flight time.
    pub fn on_flight_limit(&mut self, reason: EndReason) {
        if self.phase.is_terminal() {
            return;
        }
        self.projectile.end(reason);
        self.presentation.on_bullet_ended(reason);
        if self.win_pending {
            return;
        }
        match self.limit_policy {
            LimitPolicy::GameOver => self.game_over(GameOverReason::FlightLimit(reason)),
            LimitPolicy::SoftEnd => {
                self.time_scale.set_scale(self.time.normal_time_scale);
                self.timers.clear();
                self.pause = None;
                self.aim_open = false;
                self.projectile.set_speed_mode(SpeedMode::Normal);
                self.phase = FlightPhase::Idle;
                log::info!("Bullet spent; waiting for a new start");
            }
        }
    }

    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    pub fn projectile(&self) -> &Projectile {
        &self.projectile
    }

    pub fn projectile_mut(&mut self) -> &mut Projectile {
        &mut self.projectile
    }

    pub fn time_scale(&self) -> &TimeScale<RampPurpose> {
        &self.time_scale
    }

    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    pub fn presentation_mut(&mut self) -> &mut P {
        &mut self.presentation
    }

    pub fn is_aim_open(&self) -> bool {
        self.aim_open
    }

    /// The aim the projectile will take on confirm.
    pub fn aim(&self) -> Vec3 {
        self.aim
    }

    pub fn is_win_pending(&self) -> bool {
        self.win_pending
    }

    /// Phase saved by the current pause, if paused.
    pub fn paused_phase(&self) -> Option<FlightPhase> {
        self.pause.as_ref().map(|snapshot| snapshot.phase)
    }

    fn reacts_to_flight_events(&self) -> bool {
        self.phase.is_flying() && !self.win_pending
    }

    fn on_contact_outcome(&mut self, outcome: ContactOutcome) {
        if outcome.normal_source() == Some(NormalSource::Fallback) {
            self.presentation.on_normal_fallback(self.projectile.position());
        }
        match outcome {
            ContactOutcome::EnemyHit { point, .. } => self.on_enemy_hit(point),
            ContactOutcome::BossHit { .. } => self.on_boss_hit(),
            ContactOutcome::RicochetSucceeded { remaining, .. } => {
                self.on_ricochet_succeeded(remaining)
            }
            ContactOutcome::RicochetFailed { .. } => self.on_ricochet_failed(),
        }
    }

    /// Replace whatever ramp is running with the fast one into bullet time.
    fn quick_ramp_down(&mut self) {
        self.time_scale.ramp_to(
            self.time.bullet_time_scale,
            self.time.quick_ramp_step,
            self.time.quick_ramp_interval,
            RampPurpose::EnterBulletTime,
        );
        self.phase = FlightPhase::RampingDown { quick: true };
    }

    fn on_ramp_complete(&mut self, purpose: RampPurpose) {
        match purpose {
            RampPurpose::EnterBulletTime => {
                let entering = self.projectile.speed_mode() != SpeedMode::BulletTime;
                self.projectile.set_speed_mode(SpeedMode::BulletTime);
                self.aim_open = true;
                self.phase = FlightPhase::BulletTime;
                if entering {
                    self.aim = self.projectile.forward();
                    self.presentation.on_bullet_time_entered();
                }
            }
            RampPurpose::ExitBulletTime => {
                self.phase = FlightPhase::FlyingNormal;
            }
        }
    }

    fn game_over(&mut self, reason: GameOverReason) {
        if self.phase.is_terminal() {
            return;
        }
        self.finish_run();
        self.phase = FlightPhase::GameOver(reason);
        self.presentation.on_game_over(reason);
    }

    fn win(&mut self) {
        if self.phase.is_terminal() {
            return;
        }
        self.finish_run();
        self.phase = FlightPhase::GameWin;
        self.presentation.on_game_win();
    }

    /// Cancel ramps, timers and waits, and force the bullet down.
    fn finish_run(&mut self) {
        self.time_scale.set_scale(self.time.normal_time_scale);
        self.timers.clear();
        self.pause = None;
        self.aim_open = false;
        self.win_pending = false;
        self.projectile.set_speed_mode(SpeedMode::Normal);
        if self.projectile.end(EndReason::RunOver) {
            self.presentation.on_bullet_ended(EndReason::RunOver);
        }
    }
}
