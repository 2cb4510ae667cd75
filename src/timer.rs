use std::time::{Duration, Instant};

/// A single cancellable deadline owned by a session.
///
/// Nothing runs in the background: the owner polls [`Timer::fire`] from its
/// tick handler, so a dropped session can never be touched by a stale timer.
#[derive(Debug, Clone)]
pub struct Timer {
    delay: Duration,
    due: Option<Instant>,
}

impl Timer {
    pub fn new(delay: Duration) -> Self {
        Self { delay, due: None }
    }

    /// Arms the timer unless it is already pending. Returns whether it was armed.
    pub fn schedule(&mut self, now: Instant) -> bool {
        if self.due.is_some() {
            return false;
        }
        self.due = Some(now + self.delay);
        true
    }

    /// Arms the timer, replacing any pending deadline.
    pub fn reschedule(&mut self, now: Instant) {
        self.due = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    /// Returns true exactly once, on the first poll at or after the deadline.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}
