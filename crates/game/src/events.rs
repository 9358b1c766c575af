//! One-way notifications from the core to presentation collaborators (audio, FX, camera, UI).
//!
//! The core never waits on these; every method returns nothing and defaults to a no-op.

use std::fmt;

use glam::Vec3;

/// Why a bullet stopped flying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    FlightTimeExceeded,
    DistanceLimitReached,
    /// Forced by the run ending (game over or win).
    RunOver,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FlightTimeExceeded => f.write_str("Flight time exceeded"),
            Self::DistanceLimitReached => f.write_str("Distance limit reached"),
            Self::RunOver => f.write_str("Run over"),
        }
    }
}

/// Why a run was lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverReason {
    NoRicochetsLeft,
    /// The bullet ran out of distance or time under [`crate::config::LimitPolicy::GameOver`].
    FlightLimit(EndReason),
}

impl fmt::Display for GameOverReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRicochetsLeft => f.write_str("No ricochets left!"),
            Self::FlightLimit(reason) => write!(f, "{reason}"),
        }
    }
}

/// Presentation sink. Implementors react to flight events; none of the calls may block.
#[allow(unused_variables)]
pub trait Presentation {
    fn on_fired(&mut self) {}
    fn on_enemy_hit(&mut self, point: Vec3) {}
    fn on_ricochet(&mut self, remaining: u32) {}
    fn on_bullet_time_entered(&mut self) {}
    fn on_bullet_time_exited(&mut self) {}
    fn on_game_over(&mut self, reason: GameOverReason) {}
    fn on_game_win(&mut self) {}
    fn on_bullet_ended(&mut self, reason: EndReason) {}
    /// A ricochet normal could not be probed and the up vector was used instead.
    fn on_normal_fallback(&mut self, point: Vec3) {}
    fn on_paused(&mut self) {}
    fn on_resumed(&mut self) {}
}

/// Sink that ignores everything.
impl Presentation for () {}

/// Fan a notification out to two sinks, first `A` then `B`.
impl<A: Presentation, B: Presentation> Presentation for (A, B) {
    fn on_fired(&mut self) {
        self.0.on_fired();
        self.1.on_fired();
    }
    fn on_enemy_hit(&mut self, point: Vec3) {
        self.0.on_enemy_hit(point);
        self.1.on_enemy_hit(point);
    }
    fn on_ricochet(&mut self, remaining: u32) {
        self.0.on_ricochet(remaining);
        self.1.on_ricochet(remaining);
    }
    fn on_bullet_time_entered(&mut self) {
        self.0.on_bullet_time_entered();
        self.1.on_bullet_time_entered();
    }
    fn on_bullet_time_exited(&mut self) {
        self.0.on_bullet_time_exited();
        self.1.on_bullet_time_exited();
    }
    fn on_game_over(&mut self, reason: GameOverReason) {
        self.0.on_game_over(reason);
        self.1.on_game_over(reason);
    }
    fn on_game_win(&mut self) {
        self.0.on_game_win();
        self.1.on_game_win();
    }
    fn on_bullet_ended(&mut self, reason: EndReason) {
        self.0.on_bullet_ended(reason);
        self.1.on_bullet_ended(reason);
    }
    fn on_normal_fallback(&mut self, point: Vec3) {
        self.0.on_normal_fallback(point);
        self.1.on_normal_fallback(point);
    }
    fn on_paused(&mut self) {
        self.0.on_paused();
        self.1.on_paused();
    }
    fn on_resumed(&mut self) {
        self.0.on_resumed();
        self.1.on_resumed();
    }
}

/// Logs every notification.
#[derive(Debug, Default)]
pub struct LogPresentation;

impl Presentation for LogPresentation {
    fn on_fired(&mut self) {
        log::info!("Bullet fired");
    }
    fn on_enemy_hit(&mut self, point: Vec3) {
        log::info!("Enemy hit at {:.2?}", point);
    }
    fn on_ricochet(&mut self, remaining: u32) {
        log::info!("Ricochet! Count left: {}", remaining);
    }
    fn on_bullet_time_entered(&mut self) {
        log::info!("Bullet time");
    }
    fn on_bullet_time_exited(&mut self) {
        log::info!("Back to normal speed");
    }
    fn on_game_over(&mut self, reason: GameOverReason) {
        log::info!("Game over: {}", reason);
    }
    fn on_game_win(&mut self) {
        log::info!("Boss down. You win!");
    }
    fn on_bullet_ended(&mut self, reason: EndReason) {
        log::info!("Bullet ended: {}", reason);
    }
    fn on_normal_fallback(&mut self, point: Vec3) {
        log::warn!("No surface found near {:.2?}; ricochet used the up vector", point);
    }
    fn on_paused(&mut self) {
        log::info!("Paused");
    }
    fn on_resumed(&mut self) {
        log::info!("Resumed");
    }
}

/// A recorded notification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Notice {
    Fired,
    EnemyHit(Vec3),
    Ricochet(u32),
    BulletTimeEntered,
    BulletTimeExited,
    GameOver(GameOverReason),
    GameWin,
    BulletEnded(EndReason),
    NormalFallback(Vec3),
    Paused,
    Resumed,
}

/// Records notifications in arrival order.
#[derive(Debug, Default)]
pub struct EventLog {
    pub notices: Vec<Notice>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, matches: impl Fn(&Notice) -> bool) -> usize {
        self.notices.iter().filter(|n| matches(n)).count()
    }

    pub fn last(&self) -> Option<&Notice> {
        self.notices.last()
    }

    pub fn clear(&mut self) {
        self.notices.clear();
    }
}

impl Presentation for EventLog {
    fn on_fired(&mut self) {
        self.notices.push(Notice::Fired);
    }
    fn on_enemy_hit(&mut self, point: Vec3) {
        self.notices.push(Notice::EnemyHit(point));
    }
    fn on_ricochet(&mut self, remaining: u32) {
        self.notices.push(Notice::Ricochet(remaining));
    }
    fn on_bullet_time_entered(&mut self) {
        self.notices.push(Notice::BulletTimeEntered);
    }
    fn on_bullet_time_exited(&mut self) {
        self.notices.push(Notice::BulletTimeExited);
    }
    fn on_game_over(&mut self, reason: GameOverReason) {
        self.notices.push(Notice::GameOver(reason));
    }
    fn on_game_win(&mut self) {
        self.notices.push(Notice::GameWin);
    }
    fn on_bullet_ended(&mut self, reason: EndReason) {
        self.notices.push(Notice::BulletEnded(reason));
    }
    fn on_normal_fallback(&mut self, point: Vec3) {
        self.notices.push(Notice::NormalFallback(point));
    }
    fn on_paused(&mut self) {
        self.notices.push(Notice::Paused);
    }
    fn on_resumed(&mut self) {
        self.notices.push(Notice::Resumed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_read_like_the_hud() {
        assert_eq!(GameOverReason::NoRicochetsLeft.to_string(), "No ricochets left!");
        assert_eq!(
            GameOverReason::FlightLimit(EndReason::DistanceLimitReached).to_string(),
            "Distance limit reached"
        );
    }

    #[test]
    fn pair_fans_out_in_order() {
        let mut pair = (EventLog::new(), EventLog::new());
        pair.on_ricochet(2);
        pair.on_game_win();
        assert_eq!(pair.0.notices, vec![Notice::Ricochet(2), Notice::GameWin]);
        assert_eq!(pair.0.notices, pair.1.notices);
    }

    #[test]
    fn event_log_counts() {
        let mut log = EventLog::new();
        log.on_fired();
        log.on_enemy_hit(Vec3::ZERO);
        log.on_enemy_hit(Vec3::ONE);
        assert_eq!(log.count(|n| matches!(n, Notice::EnemyHit(_))), 2);
        assert_eq!(log.last(), Some(&Notice::EnemyHit(Vec3::ONE)));
    }
}
