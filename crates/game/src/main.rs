//! Ricochet - headless bullet-time demo.
//!
//! Loads `config.ron` (or the path given as the first argument), builds the demo range and
//! plays it with a scripted pilot at a fixed 60 Hz until the run ends.

use std::path::PathBuf;

use anyhow::{Context, Result};
use game::config::config_path;
use game::events::{EventLog, LogPresentation, Notice};
use game::hooks::TrailRecorder;
use game::level::Level;
use game::{FlightPhase, GameConfig, Session};
use input::Signal;

const FRAME_DT: f32 = 1.0 / 60.0;
const MAX_FRAMES: u64 = 60 * 120;
/// Real seconds the pilot lingers in bullet time before confirming.
const AIM_DWELL: f32 = 0.25;

type DemoSession = Session<(LogPresentation, EventLog)>;

/// Scripted player: aims at the nearest enemy, then at the boss (banking off a wall while a
/// ricochet is left) and confirms after a short dwell.
#[derive(Default)]
struct Pilot {
    dwell: f32,
}

impl Pilot {
    fn drive(&mut self, session: &mut DemoSession) {
        let controller = session.controller();
        if !controller.is_aim_open() {
            self.dwell = 0.0;
            return;
        }

        let from = controller.projectile().position();
        let ricochets = controller.projectile().ricochet_budget();
        let level = session.level();
        let target = level.nearest_enemy(from).or_else(|| {
            level.living_boss().map(|boss| match level.walls().first() {
                Some(wall) if ricochets > 0 => wall.mirror(boss),
                _ => boss,
            })
        });

        self.dwell += FRAME_DT;
        let input = session.input_mut();
        if let Some(target) = target {
            input.set_aim(target - from);
        }
        if self.dwell >= AIM_DWELL {
            input.press(Signal::Confirm);
            self.dwell = 0.0;
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(config_path);
    let config = GameConfig::load_from(&path)
        .with_context(|| format!("loading config from {}", path.display()))?;

    println!("╔════════════════════════════════════════════╗");
    println!("║                 RICOCHET                   ║");
    println!("╠════════════════════════════════════════════╣");
    println!("║  Scripted run: two enemies, one bank shot, ║");
    println!("║  one boss. Set RUST_LOG=debug for detail.  ║");
    println!("╚════════════════════════════════════════════╝");

    let mut session = Session::new(&config, Level::demo(), (LogPresentation, EventLog::new()))
        .context("building session")?;
    let recorder = TrailRecorder::new(240);
    let trail = recorder.trail();
    session
        .controller_mut()
        .projectile_mut()
        .add_hook(Box::new(recorder));

    let mut pilot = Pilot::default();
    session.input_mut().press(Signal::Start);
    while session.outcome().is_none() && session.time().frame_count() < MAX_FRAMES {
        pilot.drive(&mut session);
        session.step(FRAME_DT);
        if session.controller().phase() == FlightPhase::Idle {
            session.input_mut().press(Signal::Start);
        }
    }

    let events = &session.controller().presentation().1;
    let outcome = match session.outcome() {
        Some(FlightPhase::GameWin) => "win".to_string(),
        Some(FlightPhase::GameOver(reason)) => format!("game over ({reason})"),
        _ => "unfinished".to_string(),
    };
    log::info!(
        "Run finished: {} | score {} | ricochets {} ({} left) | frames {} | {:.1}s real, {:.1}s scaled",
        outcome,
        session.score(),
        events.count(|n| matches!(n, Notice::Ricochet(_))),
        session.controller().projectile().ricochet_budget(),
        session.time().frame_count(),
        session.time().elapsed_seconds(),
        session.time().scaled_elapsed_seconds(),
    );
    if let Some(last) = trail.latest() {
        log::info!("Last bullet position {:.2?} ({} trail points)", last, trail.len());
    }
    if events.count(|n| matches!(n, Notice::NormalFallback(_))) > 0 {
        log::warn!("Some ricochets used the fallback normal");
    }
    Ok(())
}
