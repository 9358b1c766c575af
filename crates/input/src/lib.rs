//! Input collaborator: an aim direction plus discrete edge signals.
//!
//! Device handling lives outside the core; hosts translate their key/mouse/gamepad events
//! into [`Signal`] presses and aim updates, then take one [`FrameInput`] per frame.

use glam::Vec3;
use std::collections::HashSet;

/// Discrete edge signals the core reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// Start the run (fire the bullet).
    Start,
    /// Confirm the aim and leave bullet time.
    Confirm,
    /// Toggle pause.
    Pause,
}

/// Input for one simulation frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInput {
    /// Unit aim direction.
    pub aim: Vec3,
    pub start_pressed: bool,
    pub confirm_pressed: bool,
    pub pause_pressed: bool,
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            aim: -Vec3::Z,
            start_pressed: false,
            confirm_pressed: false,
            pause_pressed: false,
        }
    }
}

impl FrameInput {
    /// Frame input with only an aim direction.
    pub fn aiming(aim: Vec3) -> Self {
        Self {
            aim: aim.try_normalize().unwrap_or(-Vec3::Z),
            ..Default::default()
        }
    }

    pub fn with(mut self, signal: Signal) -> Self {
        match signal {
            Signal::Start => self.start_pressed = true,
            Signal::Confirm => self.confirm_pressed = true,
            Signal::Pause => self.pause_pressed = true,
        }
        self
    }
}

/// Manages input state between frames.
#[derive(Debug)]
pub struct InputState {
    /// Signals pressed since the last frame.
    pressed: HashSet<Signal>,
    /// Current aim direction (unit length).
    aim: Vec3,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            pressed: HashSet::new(),
            aim: -Vec3::Z,
        }
    }
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a signal edge.
    pub fn press(&mut self, signal: Signal) {
        self.pressed.insert(signal);
    }

    /// Update the aim direction. Zero-length directions are ignored.
    pub fn set_aim(&mut self, direction: Vec3) {
        if let Some(aim) = direction.try_normalize() {
            self.aim = aim;
        } else {
            log::warn!("ignoring zero-length aim direction");
        }
    }

    pub fn aim(&self) -> Vec3 {
        self.aim
    }

    /// Check if a signal was pressed since the last frame.
    pub fn is_pressed(&self, signal: Signal) -> bool {
        self.pressed.contains(&signal)
    }

    /// Take this frame's input and clear the edges. Call once per frame.
    pub fn begin_frame(&mut self) -> FrameInput {
        let frame = FrameInput {
            aim: self.aim,
            start_pressed: self.is_pressed(Signal::Start),
            confirm_pressed: self.is_pressed(Signal::Confirm),
            pause_pressed: self.is_pressed(Signal::Pause),
        };
        self.pressed.clear();
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_clear_after_frame() {
        let mut input = InputState::new();
        input.press(Signal::Confirm);
        let frame = input.begin_frame();
        assert!(frame.confirm_pressed);
        assert!(!frame.start_pressed);
        assert!(!input.begin_frame().confirm_pressed);
    }

    #[test]
    fn aim_is_normalized_and_persistent() {
        let mut input = InputState::new();
        input.set_aim(Vec3::new(0.0, 3.0, 4.0));
        input.set_aim(Vec3::ZERO);
        let frame = input.begin_frame();
        assert!((frame.aim - Vec3::new(0.0, 0.6, 0.8)).length() < 1e-6);
        assert_eq!(input.begin_frame().aim, frame.aim);
    }

    #[test]
    fn frame_input_builder() {
        let frame = FrameInput::aiming(Vec3::X).with(Signal::Start).with(Signal::Pause);
        assert!(frame.start_pressed && frame.pause_pressed && !frame.confirm_pressed);
        assert_eq!(frame.aim, Vec3::X);
    }
}
