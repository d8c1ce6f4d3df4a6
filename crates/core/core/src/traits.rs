//! Core traits for MultiAuth.
//!
//! Time is injected through these traits rather than read from ambient
//! globals, so anything that expires can be driven by a simulated clock in
//! tests (see [`crate::sim::ManualTime`]).

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// A one-shot callback handed to a [`Scheduler`].
pub type ScheduledTask = Box<dyn FnOnce() + Send + 'static>;

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Opaque handle to a task scheduled with [`Scheduler::schedule_once`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Wraps a scheduler-assigned id.
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the scheduler-assigned id.
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// One-shot delayed execution.
///
/// Implementations must never invoke a task while holding a lock that
/// `schedule_once` or `cancel` also takes, since tasks commonly schedule or
/// cancel other timers.
pub trait Scheduler: Send + Sync {
    /// Runs `task` once after `delay` has elapsed.
    fn schedule_once(&self, delay: Duration, task: ScheduledTask) -> TimerHandle;

    /// Cancels a pending task. Unknown or already-fired handles are ignored.
    fn cancel(&self, handle: TimerHandle);

    /// Number of tasks scheduled but neither fired nor cancelled.
    fn pending(&self) -> usize;
}
