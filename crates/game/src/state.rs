//! Flight state types: controller phases, projectile speed mode and the pause snapshot.

use engine_core::ScaleSnapshot;

use crate::events::GameOverReason;

// ── Phases ─────────────────────────────────────────────────────────────────

/// Controller phase. `GameOver` and `GameWin` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightPhase {
    /// Waiting for the start signal.
    Idle,
    /// Flying at normal time scale.
    FlyingNormal,
    /// Ramping the time scale down toward bullet time.
    /// `quick` is set for the fast ramp that follows an in-flight hit.
    RampingDown { quick: bool },
    /// At bullet-time scale with the aim gate open.
    BulletTime,
    /// Ramping back up to normal after the aim was confirmed.
    RampingUp,
    /// Time stopped; the phase to resume is in the pause snapshot.
    Paused,
    GameOver(GameOverReason),
    GameWin,
}

impl FlightPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver(_) | Self::GameWin)
    }

    /// The projectile is in the air and the controller reacts to its events.
    pub fn is_flying(self) -> bool {
        matches!(
            self,
            Self::FlyingNormal | Self::RampingDown { .. } | Self::BulletTime | Self::RampingUp
        )
    }
}

/// Projectile speed regime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpeedMode {
    #[default]
    Normal,
    BulletTime,
}

/// What a time-scale ramp does when it reaches its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RampPurpose {
    EnterBulletTime,
    ExitBulletTime,
}

/// Everything needed to resume exactly where the pause left off.
#[derive(Debug, Clone)]
pub struct PauseSnapshot {
    pub phase: FlightPhase,
    pub scale: ScaleSnapshot<RampPurpose>,
    pub speed_mode: SpeedMode,
    pub aim_open: bool,
}
