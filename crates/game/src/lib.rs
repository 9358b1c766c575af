//! Ricochet: a bullet-time projectile simulation.
//!
//! The player fires a single bullet down a level. Hits on enemies and ricochets off walls drop
//! the world into bullet time, where the bullet can be re-aimed before time ramps back up.
//! Hitting the boss wins the run; running out of ricochets, distance or flight time loses it.

pub mod bullet_time;
pub mod classifier;
pub mod config;
pub mod events;
pub mod hooks;
pub mod level;
pub mod projectile;
pub mod session;
pub mod state;

pub use bullet_time::{BulletTimeController, FrameReport};
pub use config::{ConfigError, GameConfig};
pub use events::{EndReason, GameOverReason, Presentation};
pub use projectile::Projectile;
pub use session::Session;
pub use state::FlightPhase;
