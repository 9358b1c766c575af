//! Time management for the game loop: the frame clock and the global time scale.
//!
//! Two clocks exist side by side. *Real* time is what the host loop measures between
//! frames; *scaled* time is real time multiplied by the global [`TimeScale`]. Gameplay
//! integrates with scaled time, while ramps of the scale itself are paced in real time so
//! that slow motion never slows down the ramp producing it.

use std::time::Duration;

/// Tracks per-frame real and scaled deltas.
#[derive(Debug, Default)]
pub struct Time {
    /// Real duration of the last frame.
    delta: Duration,
    /// Scaled duration of the last frame.
    scaled_delta: Duration,
    /// Total real time since start.
    elapsed: Duration,
    /// Total scaled time since start.
    scaled_elapsed: Duration,
    /// Frame count since start.
    frame_count: u64,
}

impl Time {
    /// Create a new time manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock by one frame of `real_dt` seconds under the given scale.
    pub fn advance(&mut self, real_dt: f32, scale: f32) {
        self.delta = seconds(real_dt);
        self.scaled_delta = seconds(real_dt * scale);
        self.elapsed += self.delta;
        self.scaled_elapsed += self.scaled_delta;
        self.frame_count += 1;
    }

    /// Get the real delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get the scaled delta time in seconds.
    pub fn scaled_delta_seconds(&self) -> f32 {
        self.scaled_delta.as_secs_f32()
    }

    /// Get total real elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Get total scaled elapsed time in seconds.
    pub fn scaled_elapsed_seconds(&self) -> f32 {
        self.scaled_elapsed.as_secs_f32()
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

fn seconds(secs: f32) -> Duration {
    Duration::try_from_secs_f32(secs.max(0.0)).unwrap_or_default()
}

/// A linear, real-time-paced ramp of the time scale toward `target`.
///
/// `tag` is handed back to the owner when the ramp completes and acts as its continuation.
#[derive(Debug, Clone, PartialEq)]
pub struct Ramp<T> {
    target: f32,
    step: f32,
    interval: f32,
    /// Real time accumulated toward the next step.
    waited: f32,
    tag: T,
}

impl<T> Ramp<T> {
    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    pub fn tag(&self) -> &T {
        &self.tag
    }

    /// One step from `value` toward the target, clamped so it never overshoots.
    fn next_value(&self, value: f32) -> f32 {
        if self.step <= 0.0 {
            return self.target;
        }
        if value < self.target {
            (value + self.step).min(self.target)
        } else {
            (value - self.step).max(self.target)
        }
    }
}

/// Saved scale and ramp while time is stopped.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleSnapshot<T> {
    scale: f32,
    ramp: Option<Ramp<T>>,
}

impl<T> ScaleSnapshot<T> {
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn ramp(&self) -> Option<&Ramp<T>> {
        self.ramp.as_ref()
    }
}

/// The single global simulation-speed multiplier.
///
/// At most one [`Ramp`] is in flight; starting a ramp or setting the scale directly
/// supersedes whatever ramp was running.
#[derive(Debug, Clone)]
pub struct TimeScale<T> {
    current: f32,
    max: f32,
    base_fixed_step: f32,
    fixed_step: f32,
    ramp: Option<Ramp<T>>,
}

impl<T> TimeScale<T> {
    /// Create a service at `initial`, legal in `[0, max]`.
    pub fn new(initial: f32, max: f32, base_fixed_step: f32) -> Self {
        let mut scale = Self {
            current: 0.0,
            max: max.max(0.0),
            base_fixed_step,
            fixed_step: 0.0,
            ramp: None,
        };
        scale.apply(initial);
        scale
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    /// Fixed integration step for the current scale (`base_fixed_step * scale`).
    pub fn fixed_step(&self) -> f32 {
        self.fixed_step
    }

    pub fn ramp(&self) -> Option<&Ramp<T>> {
        self.ramp.as_ref()
    }

    pub fn is_ramping(&self) -> bool {
        self.ramp.is_some()
    }

    /// Set the scale immediately. Cancels any ramp in flight.
    pub fn set_scale(&mut self, value: f32) {
        self.ramp = None;
        self.apply(value);
    }

    /// Start ramping toward `target` by `step` every `interval` seconds of real time.
    /// Any ramp already in flight is dropped without completing.
    pub fn ramp_to(&mut self, target: f32, step: f32, interval: f32, tag: T) {
        self.ramp = Some(Ramp {
            target: target.clamp(0.0, self.max),
            step: step.abs(),
            interval: interval.max(0.0),
            waited: 0.0,
            tag,
        });
    }

    /// Drop the ramp in flight, returning its tag.
    pub fn cancel_ramp(&mut self) -> Option<T> {
        self.ramp.take().map(|ramp| ramp.tag)
    }

    /// Advance the in-flight ramp by `real_dt` seconds of real time.
    ///
    /// Returns the ramp's tag once the target is reached; the ramp is then cleared.
    pub fn advance(&mut self, real_dt: f32) -> Option<T> {
        let (value, reached) = {
            let ramp = self.ramp.as_mut()?;
            ramp.waited += real_dt.max(0.0);
            let mut value = self.current;
            let mut reached = value == ramp.target;
            while !reached && ramp.waited >= ramp.interval {
                ramp.waited -= ramp.interval;
                value = ramp.next_value(value);
                reached = value == ramp.target;
            }
            (value, reached)
        };
        self.apply(value);
        if reached {
            if let Some(ramp) = &self.ramp {
                log::debug!("time scale ramp reached {:.3}", ramp.target);
            }
            self.cancel_ramp()
        } else {
            None
        }
    }

    /// Stop time: remember the scale and ramp, then set the scale to zero.
    pub fn suspend(&mut self) -> ScaleSnapshot<T> {
        let snapshot = ScaleSnapshot {
            scale: self.current,
            ramp: self.ramp.take(),
        };
        self.apply(0.0);
        snapshot
    }

    /// Restore a snapshot taken by [`TimeScale::suspend`], including ramp progress.
    pub fn restore(&mut self, snapshot: ScaleSnapshot<T>) {
        self.apply(snapshot.scale);
        self.ramp = snapshot.ramp;
    }

    fn apply(&mut self, value: f32) {
        self.current = if value.is_nan() { 0.0 } else { value.clamp(0.0, self.max) };
        self.fixed_step = self.base_fixed_step * self.current;
    }
}
