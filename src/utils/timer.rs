//! Cancellable delayed tasks
//!
//! The trimmer runs on the host's event loop, so delayed work is modelled as a
//! deadline that the host advances through `tick(now)` rather than a detached
//! timer. Dropping a task cancels it.

use std::time::{Duration, Instant};

/// A single pending action that becomes due at a fixed instant
#[derive(Debug)]
pub struct DelayedTask<T> {
    due: Instant,
    action: T,
}

impl<T> DelayedTask<T> {
    /// Schedule `action` to run `delay` after `now`
    pub fn schedule(now: Instant, delay: Duration, action: T) -> Self {
        Self {
            due: now + delay,
            action,
        }
    }

    /// When the task becomes due
    pub fn due(&self) -> Instant {
        self.due
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.due
    }

    /// Consume the task, yielding its action
    pub fn into_action(self) -> T {
        self.action
    }
}

/// Take the task out of `slot` if it is due at `now`.
pub fn take_due<T>(slot: &mut Option<DelayedTask<T>>, now: Instant) -> Option<T> {
    if slot.as_ref().is_some_and(|task| task.is_due(now)) {
        slot.take().map(DelayedTask::into_action)
    } else {
        None
    }
}
