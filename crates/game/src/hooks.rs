//! Pre/post tick observers attached to the projectile.
//!
//! Call order per tick: every pre-tick hook in registration order, then integration,
//! then every post-tick hook in registration order. All calls are synchronous.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use engine_core::Transform;
use glam::Vec3;

/// Observer of projectile ticks. Both methods default to no-ops.
#[allow(unused_variables)]
pub trait TickHook {
    /// Runs before integration; may adjust the pose (aim coupling).
    fn pre_tick(&mut self, transform: &mut Transform) {}
    /// Runs after integration with the velocity in the projectile's local frame.
    /// The velocity is zero while the projectile is not flying.
    fn post_tick(&mut self, transform: &Transform, local_velocity: Vec3) {}
}

/// Handle returned by [`TickHooks::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookId(u32);

/// Ordered hook registry.
#[derive(Default)]
pub struct TickHooks {
    hooks: Vec<(HookId, Box<dyn TickHook>)>,
    next_id: u32,
}

impl TickHooks {
    pub fn register(&mut self, hook: Box<dyn TickHook>) -> HookId {
        let id = HookId(self.next_id);
        self.next_id += 1;
        self.hooks.push((id, hook));
        id
    }

    pub fn unregister(&mut self, id: HookId) -> Option<Box<dyn TickHook>> {
        let index = self.hooks.iter().position(|(hook_id, _)| *hook_id == id)?;
        Some(self.hooks.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub(crate) fn run_pre(&mut self, transform: &mut Transform) {
        for (_, hook) in &mut self.hooks {
            hook.pre_tick(transform);
        }
    }

    pub(crate) fn run_post(&mut self, transform: &Transform, local_velocity: Vec3) {
        for (_, hook) in &mut self.hooks {
            hook.post_tick(transform, local_velocity);
        }
    }
}

/// Shared view of recorded projectile positions, newest first.
#[derive(Debug, Clone, Default)]
pub struct Trail(Rc<RefCell<VecDeque<Vec3>>>);

impl Trail {
    pub fn points(&self) -> Vec<Vec3> {
        self.0.borrow().iter().copied().collect()
    }

    pub fn latest(&self) -> Option<Vec3> {
        self.0.borrow().front().copied()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }
}

/// Post-tick hook keeping the last `capacity` positions of a moving projectile.
pub struct TrailRecorder {
    trail: Trail,
    capacity: usize,
}

impl TrailRecorder {
    pub fn new(capacity: usize) -> Self {
        Self {
            trail: Trail::default(),
            capacity,
        }
    }

    /// A handle that keeps reading the trail after the recorder is registered.
    pub fn trail(&self) -> Trail {
        self.trail.clone()
    }
}

impl TickHook for TrailRecorder {
    fn post_tick(&mut self, transform: &Transform, local_velocity: Vec3) {
        if local_velocity == Vec3::ZERO {
            return;
        }
        let mut points = self.trail.0.borrow_mut();
        points.push_front(transform.position);
        points.truncate(self.capacity);
    }
}
