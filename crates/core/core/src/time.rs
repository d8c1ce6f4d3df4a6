//! Wall-clock implementations of [`Clock`] and [`Scheduler`].

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;

use crate::error::{MultiAuthError, MultiAuthResult};
use crate::traits::{Clock, ScheduledTask, Scheduler, TimerHandle};

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Scheduler that runs each task on its own tokio timer.
///
/// Cancelling aborts the sleeping task. A task whose timer has already
/// elapsed but which has not yet started running is also suppressed, since
/// the task only fires if it can still claim its own pending slot.
pub struct TokioScheduler {
    runtime: Handle,
    next_id: AtomicU64,
    pending: Arc<Mutex<HashMap<TimerHandle, AbortHandle>>>,
}

impl TokioScheduler {
    /// Creates a scheduler that spawns onto the given runtime.
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            next_id: AtomicU64::new(1),
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Creates a scheduler on the runtime of the calling context.
    pub fn try_current() -> MultiAuthResult<Self> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| MultiAuthError::runtime(e.to_string()))
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_once(&self, delay: Duration, task: ScheduledTask) -> TimerHandle {
        let handle = TimerHandle::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));
        let pending = Arc::clone(&self.pending);

        // Held across the spawn so the task cannot look itself up before it
        // has been registered.
        let mut guard = self.pending.lock();
        let join = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let claimed = pending.lock().remove(&handle).is_some();
            if claimed {
                task();
            }
        });
        guard.insert(handle, join.abort_handle());

        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some(abort) = self.pending.lock().remove(&handle) {
            abort.abort();
        }
    }

    fn pending(&self) -> usize {
        self.pending.lock().len()
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, abort) in self.pending.lock().drain() {
            abort.abort();
        }
    }
}

impl std::fmt::Debug for TokioScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokioScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}
