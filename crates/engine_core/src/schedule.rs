//! Real-time timer queue for delayed actions.
//!
//! Timers are advanced explicitly by the owner's frame loop; nothing runs on its own.

#[derive(Debug, Clone)]
struct Pending<T> {
    seq: u64,
    due: f32,
    action: T,
}

/// A queue of actions that become due after a delay.
#[derive(Debug, Clone)]
pub struct Timers<T> {
    now: f32,
    next_seq: u64,
    pending: Vec<Pending<T>>,
}

impl<T> Default for Timers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Timers<T> {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            next_seq: 0,
            pending: Vec::new(),
        }
    }

    /// Schedule `action` to become due `delay` seconds from now.
    pub fn schedule(&mut self, delay: f32, action: T) {
        self.pending.push(Pending {
            seq: self.next_seq,
            due: self.now + delay.max(0.0),
            action,
        });
        self.next_seq += 1;
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Advance the queue clock and return every action that became due,
    /// ordered by due time and then by scheduling order.
    pub fn advance(&mut self, dt: f32) -> Vec<T> {
        self.now += dt.max(0.0);
        let now = self.now;
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = pending;
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|p| p.action).collect()
    }
}
