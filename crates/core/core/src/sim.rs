//! Simulated time for deterministic tests.
//!
//! `ManualTime` is both a [`Clock`] and a [`Scheduler`]. Time only moves
//! when [`ManualTime::advance`] is called, and every task that falls due
//! during the advance runs synchronously, in due order, on the caller's
//! thread.
//!
//! ```rust
//! use multiauth_core::sim::ManualTime;
//! use multiauth_core::Scheduler;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::time::Duration;
//!
//! let time = ManualTime::new();
//! let fired = Arc::new(AtomicBool::new(false));
//! let flag = fired.clone();
//! time.schedule_once(Duration::from_millis(10), Box::new(move || flag.store(true, Ordering::SeqCst)));
//!
//! time.advance_ms(9);
//! assert!(!fired.load(Ordering::SeqCst));
//! time.advance_ms(1);
//! assert!(fired.load(Ordering::SeqCst));
//! ```

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::traits::{Clock, ScheduledTask, Scheduler, TimerHandle};

/// Fixed starting instant used by [`ManualTime::new`] (2023-11-14T22:13:20Z).
pub const DEFAULT_START_MS: i64 = 1_700_000_000_000;

/// Controllable clock and scheduler.
pub struct ManualTime {
    state: Mutex<ManualState>,
}

struct ManualState {
    now: DateTime<Utc>,
    next_id: u64,
    /// Keyed by (due, id) so equal due times fire in scheduling order.
    queue: BTreeMap<(DateTime<Utc>, u64), ScheduledTask>,
    due_by_id: HashMap<u64, DateTime<Utc>>,
}

impl ManualTime {
    /// Creates simulated time starting at [`DEFAULT_START_MS`].
    pub fn new() -> Self {
        let start = DateTime::from_timestamp_millis(DEFAULT_START_MS).unwrap_or(DateTime::UNIX_EPOCH);
        Self::starting_at(start)
    }

    /// Creates simulated time starting at `start`.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self {
            state: Mutex::new(ManualState {
                now: start,
                next_id: 1,
                queue: BTreeMap::new(),
                due_by_id: HashMap::new(),
            }),
        }
    }

    /// Moves time forward by `by`, running every task that falls due.
    ///
    /// Each task observes `now()` equal to its own due time. Negative
    /// deltas are treated as zero.
    pub fn advance(&self, by: TimeDelta) {
        let by = by.max(TimeDelta::zero());
        let target = {
            let state = self.state.lock();
            saturating_add(state.now, by)
        };

        loop {
            let task = {
                let mut state = self.state.lock();
                let due_key = state
                    .queue
                    .first_key_value()
                    .map(|(key, _)| *key)
                    .filter(|(due, _)| *due <= target);

                match due_key {
                    Some(key) => {
                        let (due, id) = key;
                        state.due_by_id.remove(&id);
                        if due > state.now {
                            state.now = due;
                        }
                        state.queue.remove(&key)
                    }
                    None => {
                        state.now = target;
                        None
                    }
                }
            };

            match task {
                Some(task) => task(),
                None => break,
            }
        }
    }

    /// Moves time forward by `ms` milliseconds.
    pub fn advance_ms(&self, ms: i64) {
        self.advance(TimeDelta::milliseconds(ms));
    }

    /// Returns the due times of all pending tasks, soonest first.
    pub fn pending_due_times(&self) -> Vec<DateTime<Utc>> {
        self.state.lock().queue.keys().map(|(due, _)| *due).collect()
    }
}

impl Default for ManualTime {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualTime {
    fn now(&self) -> DateTime<Utc> {
        self.state.lock().now
    }
}

impl Scheduler for ManualTime {
    fn schedule_once(&self, delay: Duration, task: ScheduledTask) -> TimerHandle {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;

        let delay = TimeDelta::from_std(delay).unwrap_or(TimeDelta::MAX);
        let due = saturating_add(state.now, delay);
        state.queue.insert((due, id), task);
        state.due_by_id.insert(id, due);

        TimerHandle::from_raw(id)
    }

    fn cancel(&self, handle: TimerHandle) {
        let mut state = self.state.lock();
        let id = handle.as_raw();
        if let Some(due) = state.due_by_id.remove(&id) {
            state.queue.remove(&(due, id));
        }
    }

    fn pending(&self) -> usize {
        self.state.lock().queue.len()
    }
}

impl std::fmt::Debug for ManualTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ManualTime")
            .field("now", &state.now)
            .field("pending", &state.queue.len())
            .finish()
    }
}

fn saturating_add(at: DateTime<Utc>, by: TimeDelta) -> DateTime<Utc> {
    at.checked_add_signed(by).unwrap_or(DateTime::<Utc>::MAX_UTC)
}
