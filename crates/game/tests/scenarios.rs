//! End-to-end flight scenarios against a scripted plane scene and the rapier-backed demo range.

use engine_core::Transform;
use game::bullet_time::{time_scale_for, BulletTimeController};
use game::config::{Features, GameConfig, LimitPolicy};
use game::events::{EndReason, EventLog, GameOverReason, Notice};
use game::hooks::TrailRecorder;
use game::level::Level;
use game::projectile::{ContactOutcome, Projectile};
use game::state::{FlightPhase, SpeedMode};
use game::Session;
use glam::Vec3;
use input::{FrameInput, Signal};
use physics::{
    ColliderHandle, CollisionGroup, Contact, ContactCategory, Group, RaycastHit, SceneQuery,
};

const DT: f32 = 1.0 / 60.0;

/// An infinite one-sided plane; anything within the projectile radius of its front counts
/// as touching it.
struct Plane {
    point: Vec3,
    normal: Vec3,
    category: ContactCategory,
    handle: ColliderHandle,
}

#[derive(Default)]
struct PlaneScene {
    planes: Vec<Plane>,
}

impl PlaneScene {
    fn with(mut self, z: f32, facing: f32, category: ContactCategory) -> Self {
        let handle = ColliderHandle::from_raw_parts(self.planes.len() as u32, 0);
        self.planes.push(Plane {
            point: Vec3::new(0.0, 0.0, z),
            normal: Vec3::new(0.0, 0.0, facing),
            category,
            handle,
        });
        self
    }
}

fn membership(category: ContactCategory) -> Group {
    match category {
        ContactCategory::Environment => CollisionGroup::Environment.bits(),
        ContactCategory::Enemy => CollisionGroup::Enemy.bits(),
        ContactCategory::Boss => CollisionGroup::Enemy.bits() | CollisionGroup::Boss.bits(),
        ContactCategory::Other => Group::NONE,
    }
}

impl SceneQuery for PlaneScene {
    fn raycast_first_hit(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: Group,
    ) -> Option<RaycastHit> {
        let direction = direction.try_normalize()?;
        self.planes
            .iter()
            .filter(|plane| membership(plane.category).intersects(mask))
            .filter_map(|plane| {
                let denom = direction.dot(plane.normal);
                if denom >= 0.0 {
                    return None;
                }
                let distance = (plane.point - origin).dot(plane.normal) / denom;
                (0.0..=max_distance).contains(&distance).then(|| RaycastHit {
                    collider: plane.handle,
                    distance,
                    point: origin + direction * distance,
                    normal: plane.normal,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn contacts(&self, center: Vec3, radius: f32) -> Vec<Contact> {
        self.planes
            .iter()
            .filter_map(|plane| {
                let height = (center - plane.point).dot(plane.normal);
                (height <= radius).then(|| Contact {
                    collider: plane.handle,
                    category: plane.category,
                    point: center - plane.normal * height,
                })
            })
            .collect()
    }
}

fn controller(config: &GameConfig) -> BulletTimeController<EventLog> {
    let projectile =
        Projectile::new(&config.projectile, config.features, Transform::default()).unwrap();
    BulletTimeController::new(config, projectile, time_scale_for(&config.time), EventLog::new())
        .unwrap()
}

/// Input that confirms straight ahead whenever the aim gate is open.
fn autopilot(c: &BulletTimeController<EventLog>) -> FrameInput {
    if c.is_aim_open() {
        FrameInput::aiming(c.projectile().forward()).with(Signal::Confirm)
    } else {
        FrameInput::default()
    }
}

/// Fly with the autopilot until `done` holds or `frames` run out.
fn fly(
    c: &mut BulletTimeController<EventLog>,
    scene: &PlaneScene,
    frames: usize,
    mut done: impl FnMut(&BulletTimeController<EventLog>) -> bool,
) {
    for _ in 0..frames {
        if done(c) {
            return;
        }
        let input = autopilot(c);
        c.update(DT, &input, scene);
    }
}

fn count(c: &BulletTimeController<EventLog>, matches: impl Fn(&Notice) -> bool) -> usize {
    c.presentation().count(matches)
}

#[test]
fn scenario_a_one_ricochet_then_game_over() {
    let config = GameConfig::default();
    let scene = PlaneScene::default()
        .with(-30.0, 1.0, ContactCategory::Environment)
        .with(30.0, -1.0, ContactCategory::Environment);
    let mut c = controller(&config);
    c.update(DT, &FrameInput::default().with(Signal::Start), &scene);

    let mut heading_after_bounce = None;
    for _ in 0..5000 {
        if c.phase().is_terminal() {
            break;
        }
        let input = autopilot(&c);
        let report = c.update(DT, &input, &scene);
        if let Some(ContactOutcome::RicochetSucceeded { remaining, .. }) = report.contact {
            assert_eq!(remaining, 0);
            heading_after_bounce = Some(c.projectile().forward());
        }
    }

    let heading = heading_after_bounce.expect("first wall bounces");
    assert!((heading - Vec3::Z).length() < 0.05, "heading {heading:?}");
    assert_eq!(c.projectile().ricochet_budget(), 0);
    assert_eq!(c.phase(), FlightPhase::GameOver(GameOverReason::NoRicochetsLeft));
    assert_eq!(count(&c, |n| matches!(n, Notice::Ricochet(0))), 1);
    assert_eq!(count(&c, |n| matches!(n, Notice::GameOver(_))), 1);
    assert!(!c.projectile().is_fired());
}

#[test]
fn grazing_a_wall_spends_one_ricochet() {
    let mut config = GameConfig::default();
    config.projectile.gravity = 0.0;
    config.projectile.ricochet_budget = 3;
    let scene = PlaneScene::default().with(-3.0, 1.0, ContactCategory::Environment);
    let spawn = Transform::facing(Vec3::new(0.0, 1.0, -2.6), Vec3::new(1.0, 0.0, -0.18));
    let projectile = Projectile::new(&config.projectile, config.features, spawn).unwrap();
    let mut c =
        BulletTimeController::new(&config, projectile, time_scale_for(&config.time), EventLog::new())
            .unwrap();
    c.start();
    fly(&mut c, &scene, 2000, |c| c.phase().is_terminal());

    assert_eq!(count(&c, |n| matches!(n, Notice::Ricochet(_))), 1);
    assert_eq!(c.projectile().ricochet_budget(), 2);
    assert_ne!(c.phase(), FlightPhase::GameOver(GameOverReason::NoRicochetsLeft));
}

#[test]
fn scenario_b_distance_limit_ends_the_run_by_default() {
    let config = GameConfig::default();
    let scene = PlaneScene::default();
    let mut c = controller(&config);
    c.start();
    fly(&mut c, &scene, 5000, |c| c.phase().is_terminal());

    assert_eq!(
        c.phase(),
        FlightPhase::GameOver(GameOverReason::FlightLimit(EndReason::DistanceLimitReached))
    );
    assert!(c.projectile().distance_traveled() >= 150.0);
    assert_eq!(
        count(&c, |n| *n == Notice::BulletEnded(EndReason::DistanceLimitReached)),
        1
    );
}

#[test]
fn scenario_b_soft_end_reports_no_game_over() {
    let mut config = GameConfig::default();
    config.limit_policy = LimitPolicy::SoftEnd;
    let scene = PlaneScene::default();
    let mut c = controller(&config);
    c.start();
    fly(&mut c, &scene, 5000, |c| c.phase() == FlightPhase::Idle);

    assert_eq!(c.phase(), FlightPhase::Idle);
    assert!(!c.projectile().is_fired());
    assert_eq!(count(&c, |n| matches!(n, Notice::GameOver(_))), 0);
    assert_eq!(
        c.presentation().last(),
        Some(&Notice::BulletEnded(EndReason::DistanceLimitReached))
    );
}

#[test]
fn scenario_c_boss_win_fires_once() {
    let config = GameConfig::default();
    let scene = PlaneScene::default()
        .with(-30.0, 1.0, ContactCategory::Boss)
        .with(-30.5, 1.0, ContactCategory::Environment)
        .with(-31.0, 1.0, ContactCategory::Enemy);
    let mut c = controller(&config);
    c.start();
    fly(&mut c, &scene, 5000, |c| c.is_win_pending());
    assert!(c.is_win_pending());

    c.on_boss_hit();
    fly(&mut c, &scene, 5000, |c| c.phase().is_terminal());

    assert_eq!(c.phase(), FlightPhase::GameWin);
    assert_eq!(count(&c, |n| *n == Notice::GameWin), 1);
    assert_eq!(count(&c, |n| matches!(n, Notice::Ricochet(_) | Notice::EnemyHit(_))), 0);
    assert_eq!(c.projectile().ricochet_budget(), 1);

    c.update(5.0, &FrameInput::default(), &scene);
    assert_eq!(count(&c, |n| *n == Notice::GameWin), 1);
}

#[test]
fn scenario_d_latest_ramp_wins() {
    let config = GameConfig::default();
    let scene = PlaneScene::default();
    let mut c = controller(&config);
    c.start();
    c.update(0.01, &FrameInput::default(), &scene);
    c.on_enemy_hit(Vec3::ZERO);

    let ramp = c.time_scale().ramp().expect("quick ramp in flight");
    assert_eq!(ramp.step(), config.time.quick_ramp_step);
    assert_eq!(ramp.interval(), config.time.quick_ramp_interval);

    // 0.6 to 0.1 in steps of 0.1 every 0.02s: five steps.
    let mut elapsed = 0.0;
    while c.phase() != FlightPhase::BulletTime {
        c.update(0.01, &FrameInput::default(), &scene);
        elapsed += 0.01;
        assert!(elapsed < 0.2, "quick ramp too slow");
    }
    assert!((c.time_scale().current() - config.time.bullet_time_scale).abs() < 1e-5);
    assert_eq!(count(&c, |n| *n == Notice::BulletTimeEntered), 1);
}

#[test]
fn pause_in_bullet_time_resumes_bullet_time() {
    let config = GameConfig::default();
    let scene = PlaneScene::default();
    let mut c = controller(&config);
    c.start();
    for _ in 0..200 {
        if c.phase() == FlightPhase::BulletTime {
            break;
        }
        c.update(DT, &FrameInput::default(), &scene);
    }
    assert_eq!(c.phase(), FlightPhase::BulletTime);

    c.update(DT, &FrameInput::default().with(Signal::Pause), &scene);
    assert_eq!(c.paused_phase(), Some(FlightPhase::BulletTime));
    assert!(!c.is_aim_open());

    c.update(DT, &FrameInput::default().with(Signal::Pause), &scene);
    assert_eq!(c.phase(), FlightPhase::BulletTime);
    assert!(c.is_aim_open());
    assert_eq!(c.projectile().speed_mode(), SpeedMode::BulletTime);
    assert!((c.time_scale().current() - config.time.bullet_time_scale).abs() < 1e-5);
}

#[test]
fn without_ricochet_any_wall_is_fatal() {
    let mut config = GameConfig::default();
    config.features = Features {
        has_ricochet: false,
        ..Default::default()
    };
    let scene = PlaneScene::default().with(-30.0, 1.0, ContactCategory::Environment);
    let mut c = controller(&config);
    c.start();
    fly(&mut c, &scene, 5000, |c| c.phase().is_terminal());

    assert_eq!(c.phase(), FlightPhase::GameOver(GameOverReason::NoRicochetsLeft));
    assert_eq!(c.projectile().ricochet_budget(), 1);
}

#[test]
fn without_boss_lane_boss_is_an_enemy() {
    let mut config = GameConfig::default();
    config.features.has_boss_lane = false;
    let scene = PlaneScene::default().with(-30.0, 1.0, ContactCategory::Boss);
    let mut c = controller(&config);
    c.start();
    fly(&mut c, &scene, 5000, |c| {
        c.presentation().count(|n| matches!(n, Notice::EnemyHit(_))) > 0
    });

    assert!(!c.is_win_pending());
    assert_eq!(c.phase(), FlightPhase::RampingDown { quick: true });
}

#[test]
fn steering_turns_toward_aim_in_normal_flight() {
    let mut config = GameConfig::default();
    config.features.has_steering_input = true;
    let scene = PlaneScene::default();
    let mut c = controller(&config);
    c.start();
    for _ in 0..10 {
        c.update(DT, &FrameInput::aiming(Vec3::X), &scene);
    }
    assert!(c.projectile().forward().x > 0.0);

    let mut fixed = controller(&GameConfig::default());
    fixed.start();
    for _ in 0..10 {
        fixed.update(DT, &FrameInput::aiming(Vec3::X), &scene);
    }
    assert!(fixed.projectile().forward().x.abs() < 1e-6);
}

#[test]
fn trail_hook_sees_flight() {
    let config = GameConfig::default();
    let scene = PlaneScene::default();
    let mut c = controller(&config);
    let recorder = TrailRecorder::new(8);
    let trail = recorder.trail();
    c.projectile_mut().add_hook(Box::new(recorder));

    c.update(DT, &FrameInput::default(), &scene);
    assert!(trail.is_empty());

    c.start();
    for _ in 0..20 {
        c.update(DT, &FrameInput::default(), &scene);
    }
    assert_eq!(trail.len(), 8);
    assert_eq!(trail.latest(), Some(c.projectile().position()));
}

#[test]
fn demo_range_is_winnable() {
    let mut session = Session::new(&GameConfig::default(), Level::demo(), EventLog::new()).unwrap();
    session.input_mut().press(Signal::Start);

    let mut dwell = 0.0;
    for _ in 0..60 * 120 {
        if session.outcome().is_some() {
            break;
        }
        if session.controller().is_aim_open() {
            let from = session.controller().projectile().position();
            let ricochets = session.controller().projectile().ricochet_budget();
            let level = session.level();
            let target = level.nearest_enemy(from).or_else(|| {
                level.living_boss().map(|boss| match level.walls().first() {
                    Some(wall) if ricochets > 0 => wall.mirror(boss),
                    _ => boss,
                })
            });
            dwell += DT;
            if let Some(target) = target {
                session.input_mut().set_aim(target - from);
            }
            if dwell >= 0.25 {
                session.input_mut().press(Signal::Confirm);
                dwell = 0.0;
            }
        } else {
            dwell = 0.0;
        }
        session.step(DT);
    }

    assert_eq!(session.outcome(), Some(FlightPhase::GameWin));
    assert_eq!(session.score(), 2);
    let log = session.controller().presentation();
    assert_eq!(log.count(|n| matches!(n, Notice::Ricochet(0))), 1);
    assert_eq!(log.count(|n| matches!(n, Notice::NormalFallback(_))), 0);
}
