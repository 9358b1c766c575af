//! Game configuration. Loaded from `config.ron` at startup and immutable during a flight.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or validating configuration. All of them are fatal to startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not access config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config syntax: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("could not serialize config: {0}")]
    Serialize(#[from] ron::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

fn require_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("must be positive, got {value}")))
    }
}

fn require_non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("must not be negative, got {value}")))
    }
}

/// Projectile flight parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Forward speed outside bullet time (units/s).
    pub normal_speed: f32,
    /// Forward speed while in bullet time (units/s).
    pub bullet_time_speed: f32,
    /// Downward acceleration (units/s²).
    pub gravity: f32,
    /// Suspend gravity while in bullet time.
    pub reduce_gravity_in_bullet_time: bool,
    /// Distance budget since the last fire, enemy hit or ricochet. 0 disables the limit.
    pub max_distance: f32,
    /// Flight time budget since fire (scaled seconds). 0 disables the limit.
    pub max_flight_seconds: f32,
    /// Ricochets allowed per run. Signed so that negative values are caught by validation.
    pub ricochet_budget: i32,
    /// Radius of the projectile's collision volume.
    pub collider_radius: f32,
    /// Max turn rate toward the aim direction when steering is enabled (rad/s).
    pub steer_turn_rate: f32,
    /// Extra length added to the retrospective normal probe.
    pub probe_epsilon: f32,
    /// Offset along the surface normal applied when snapping to a ricochet point.
    pub surface_offset: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            normal_speed: 40.0,
            bullet_time_speed: 2.0,
            gravity: 0.4,
            reduce_gravity_in_bullet_time: true,
            max_distance: 150.0,
            max_flight_seconds: 20.0,
            ricochet_budget: 1,
            collider_radius: 0.15,
            steer_turn_rate: 3.0,
            probe_epsilon: 0.2,
            surface_offset: 0.01,
        }
    }
}

impl ProjectileConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("projectile.normal_speed", self.normal_speed)?;
        require_positive("projectile.bullet_time_speed", self.bullet_time_speed)?;
        require_non_negative("projectile.gravity", self.gravity)?;
        require_non_negative("projectile.max_distance", self.max_distance)?;
        require_non_negative("projectile.max_flight_seconds", self.max_flight_seconds)?;
        if self.ricochet_budget < 0 {
            return Err(invalid(
                "projectile.ricochet_budget",
                format!("must not be negative, got {}", self.ricochet_budget),
            ));
        }
        require_positive("projectile.collider_radius", self.collider_radius)?;
        require_non_negative("projectile.steer_turn_rate", self.steer_turn_rate)?;
        require_non_negative("projectile.probe_epsilon", self.probe_epsilon)?;
        require_non_negative("projectile.surface_offset", self.surface_offset)?;
        Ok(())
    }
}

/// Time-scale levels and ramp pacing. Steps are in scale units, intervals in real seconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    pub normal_time_scale: f32,
    pub bullet_time_scale: f32,
    /// Ramp used once, right after the first fire.
    pub normal_ramp_step: f32,
    pub normal_ramp_interval: f32,
    /// Ramp used after every in-flight hit.
    pub quick_ramp_step: f32,
    pub quick_ramp_interval: f32,
    /// Fixed step at scale 1.0.
    pub base_fixed_step: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            normal_time_scale: 0.6,
            bullet_time_scale: 0.1,
            normal_ramp_step: 0.05,
            normal_ramp_interval: 0.05,
            quick_ramp_step: 0.1,
            quick_ramp_interval: 0.02,
            base_fixed_step: 0.02,
        }
    }
}

impl TimeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("time.normal_time_scale", self.normal_time_scale)?;
        require_positive("time.bullet_time_scale", self.bullet_time_scale)?;
        if self.bullet_time_scale > self.normal_time_scale {
            return Err(invalid(
                "time.bullet_time_scale",
                format!(
                    "must not exceed normal_time_scale ({} > {})",
                    self.bullet_time_scale, self.normal_time_scale
                ),
            ));
        }
        require_positive("time.normal_ramp_step", self.normal_ramp_step)?;
        require_positive("time.normal_ramp_interval", self.normal_ramp_interval)?;
        require_positive("time.quick_ramp_step", self.quick_ramp_step)?;
        require_positive("time.quick_ramp_interval", self.quick_ramp_interval)?;
        require_positive("time.base_fixed_step", self.base_fixed_step)?;
        Ok(())
    }
}

/// Gameplay variants of the single projectile/controller pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    /// Environment contacts may ricochet. When off, any environment contact ends the run.
    pub has_ricochet: bool,
    /// The projectile turns toward the aim direction during normal flight.
    pub has_steering_input: bool,
    /// Boss contacts win the run. When off, bosses count as plain enemies.
    pub has_boss_lane: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            has_ricochet: true,
            has_steering_input: false,
            has_boss_lane: true,
        }
    }
}

/// What happens when the projectile runs out of distance or flight time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitPolicy {
    /// End the bullet and the run.
    #[default]
    GameOver,
    /// End the bullet only; the controller returns to idle and waits for a new start.
    SoftEnd,
}

/// Complete game configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub projectile: ProjectileConfig,
    #[serde(default)]
    pub time: TimeConfig,
    #[serde(default)]
    pub features: Features,
    #[serde(default)]
    pub limit_policy: LimitPolicy,
    /// Real seconds between a boss hit and the win.
    #[serde(default = "default_boss_win_delay")]
    pub boss_win_delay: f32,
}

fn default_boss_win_delay() -> f32 {
    1.0
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            projectile: ProjectileConfig::default(),
            time: TimeConfig::default(),
            features: Features::default(),
            limit_policy: LimitPolicy::default(),
            boss_win_delay: default_boss_win_delay(),
        }
    }
}

impl GameConfig {
    /// Reject any misconfiguration. Values are never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.projectile.validate()?;
        self.time.validate()?;
        require_non_negative("boss_win_delay", self.boss_win_delay)
    }

    /// Parse and validate a RON document.
    pub fn from_ron(data: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from `path`. A missing file yields the defaults; anything else that goes
    /// wrong is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(data) => Self::from_ron(&data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config at {:?}, using defaults", path);
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Write this config to `path` as pretty RON.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let s = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        std::fs::write(path, s).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// `config.ron` in the current directory.
pub fn config_path() -> PathBuf {
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("config.ron")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        GameConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_document_fills_defaults() {
        let config = GameConfig::from_ron(
            "(projectile: (ricochet_budget: 3), limit_policy: SoftEnd, features: (has_steering_input: true))",
        )
        .unwrap();
        assert_eq!(config.projectile.ricochet_budget, 3);
        assert_eq!(config.projectile.normal_speed, 40.0);
        assert_eq!(config.limit_policy, LimitPolicy::SoftEnd);
        assert!(config.features.has_steering_input);
        assert!(config.features.has_ricochet);
        assert_eq!(config.boss_win_delay, 1.0);
    }

    #[test]
    fn negative_ricochet_budget_rejected() {
        let err = GameConfig::from_ron("(projectile: (ricochet_budget: -1))").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "projectile.ricochet_budget", .. }
        ));
    }

    #[test]
    fn zero_speed_rejected() {
        let mut config = GameConfig::default();
        config.projectile.bullet_time_speed = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "projectile.bullet_time_speed", .. })
        ));
    }

    #[test]
    fn bullet_scale_above_normal_rejected() {
        let mut config = GameConfig::default();
        config.time.bullet_time_scale = 0.9;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "time.bullet_time_scale", .. })
        ));
    }

    #[test]
    fn nan_is_not_clamped() {
        let mut config = GameConfig::default();
        config.time.quick_ramp_step = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn syntax_error_is_parse_error() {
        assert!(matches!(
            GameConfig::from_ron("(projectile: "),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("ricochet-config-that-does-not-exist.ron");
        let config = GameConfig::load_from(&path).unwrap();
        assert_eq!(config.projectile.ricochet_budget, 1);
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join(format!("ricochet-config-{}.ron", std::process::id()));
        let mut config = GameConfig::default();
        config.boss_win_delay = 2.5;
        config.save_to(&path).unwrap();
        let loaded = GameConfig::load_from(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded.boss_win_delay, 2.5);
    }
}
