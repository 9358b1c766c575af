//! Core engine types and utilities.
//!
//! This crate provides the foundational types used across all engine systems:
//! - Transform and spatial components
//! - Frame time and the global time scale with real-time ramps
//! - A real-time timer queue for delayed actions
//! - Common component types for ECS

pub mod components;
pub mod schedule;
pub mod time;
pub mod transform;

pub use components::*;
pub use schedule::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Quat, Vec3};
pub use hecs::{Entity, World};
