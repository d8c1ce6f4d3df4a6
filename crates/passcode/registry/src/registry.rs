//! The passcode registry.

use chrono::{DateTime, TimeDelta, Utc};
use multiauth_core::{
    Clock, MultiAuthResult, PasscodeId, Scheduler, SystemClock, TimerHandle, TokioScheduler,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

/// A live passcode and its scheduled eviction.
#[derive(Debug, Clone)]
pub struct PasscodeEntry {
    identifier: PasscodeId,
    expires_at: DateTime<Utc>,
    eviction: TimerHandle,
    generation: u64,
}

impl PasscodeEntry {
    /// The canonical identifier.
    pub fn identifier(&self) -> &PasscodeId {
        &self.identifier
    }

    /// Instant after which the passcode is no longer valid.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Handle of the eviction scheduled for this entry.
    pub fn eviction(&self) -> TimerHandle {
        self.eviction
    }

    /// Checks validity against `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Time left before expiry, never negative.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> TimeDelta {
        (self.expires_at - now).max(TimeDelta::zero())
    }
}

/// Snapshot of an entry as returned by [`PasscodeRegistry::list_active`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePasscode {
    /// The canonical identifier.
    pub identifier: PasscodeId,
    /// Milliseconds until expiry, zero once expired but not yet evicted.
    pub remaining_ms: i64,
}

#[derive(Default)]
struct RegistryState {
    entries: HashMap<PasscodeId, PasscodeEntry>,
    next_generation: u64,
}

/// In-memory registry of time-bounded passcodes.
///
/// Every passcode carries exactly one pending eviction. Renewing or
/// overwriting a passcode cancels the previous eviction, and an eviction
/// only ever removes the entry generation that scheduled it, so a renewed
/// passcode cannot be deleted by a timer left over from before the renewal.
///
/// Validity is always recomputed from the clock; a late eviction never
/// makes an expired passcode look valid.
///
/// # Example
///
/// ```rust
/// use chrono::TimeDelta;
/// use multiauth_core::sim::ManualTime;
/// use multiauth_passcode::PasscodeRegistry;
/// use std::sync::Arc;
///
/// let time = Arc::new(ManualTime::new());
/// let registry = PasscodeRegistry::new(time.clone(), time.clone());
///
/// assert!(!registry.create_or_renew("1234", TimeDelta::milliseconds(1000)));
/// assert!(registry.is_valid("1234"));
///
/// time.advance_ms(1000);
/// assert!(!registry.is_valid("1234"));
/// assert!(registry.list_active().is_empty());
/// ```
pub struct PasscodeRegistry {
    clock: Arc<dyn Clock>,
    scheduler: Arc<dyn Scheduler>,
    state: Arc<Mutex<RegistryState>>,
}

impl PasscodeRegistry {
    /// Creates an empty registry driven by the given clock and scheduler.
    pub fn new(clock: Arc<dyn Clock>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            clock,
            scheduler,
            state: Arc::new(Mutex::new(RegistryState::default())),
        }
    }

    /// Creates a registry on wall-clock time and the current tokio runtime.
    pub fn system() -> MultiAuthResult<Self> {
        let scheduler = TokioScheduler::try_current()?;
        Ok(Self::new(Arc::new(SystemClock), Arc::new(scheduler)))
    }

    /// Issues `code` for `duration`, or resets its expiry if it is still valid.
    ///
    /// Returns `true` when a valid passcode was renewed and `false` when a new
    /// one was created (including when an expired, not yet evicted entry is
    /// overwritten). The new expiry is `now + duration` in both cases; it is
    /// never stacked on the previous expiry. A zero or negative `duration`
    /// yields a passcode that is already expired.
    pub fn create_or_renew(&self, code: impl Into<PasscodeId>, duration: TimeDelta) -> bool {
        let identifier = code.into();
        let now = self.clock.now();
        let expires_at = now
            .checked_add_signed(duration)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let delay = duration.to_std().unwrap_or(Duration::ZERO);

        let mut state = self.state.lock();

        let renewed = match state.entries.get(&identifier) {
            Some(previous) => {
                self.scheduler.cancel(previous.eviction);
                previous.is_valid_at(now)
            }
            None => false,
        };

        let generation = state.next_generation;
        state.next_generation += 1;

        let eviction = self.schedule_eviction(identifier.clone(), generation, delay);
        state.entries.insert(
            identifier.clone(),
            PasscodeEntry {
                identifier,
                expires_at,
                eviction,
                generation,
            },
        );
        drop(state);

        if renewed {
            tracing::debug!(generation, %expires_at, %eviction, "Passcode renewed");
        } else {
            tracing::debug!(generation, %expires_at, %eviction, "Passcode created");
        }

        renewed
    }

    /// Returns true if `code` is present and has not yet expired.
    pub fn is_valid(&self, code: impl Into<PasscodeId>) -> bool {
        let identifier = code.into();
        let now = self.clock.now();
        self.state
            .lock()
            .entries
            .get(&identifier)
            .is_some_and(|entry| entry.is_valid_at(now))
    }

    /// Returns a snapshot of every stored passcode and its remaining time.
    ///
    /// Entries that have expired but whose eviction has not run yet are
    /// reported with zero remaining. No ordering is guaranteed.
    pub fn list_active(&self) -> Vec<ActivePasscode> {
        let now = self.clock.now();
        self.state
            .lock()
            .entries
            .values()
            .map(|entry| ActivePasscode {
                identifier: entry.identifier.clone(),
                remaining_ms: entry.remaining_at(now).num_milliseconds(),
            })
            .collect()
    }

    /// Returns a copy of the stored entry for `code`, expired or not.
    pub fn get(&self, code: impl Into<PasscodeId>) -> Option<PasscodeEntry> {
        let identifier = code.into();
        self.state.lock().entries.get(&identifier).cloned()
    }

    /// Number of stored entries, including expired ones awaiting eviction.
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.state.lock().entries.is_empty()
    }

    fn schedule_eviction(&self, identifier: PasscodeId, generation: u64, delay: Duration) -> TimerHandle {
        let state: Weak<Mutex<RegistryState>> = Arc::downgrade(&self.state);
        self.scheduler.schedule_once(
            delay,
            Box::new(move || {
                let Some(state) = state.upgrade() else {
                    return;
                };
                let mut guard = state.lock();
                let is_current = guard
                    .entries
                    .get(&identifier)
                    .is_some_and(|entry| entry.generation == generation);
                if is_current {
                    guard.entries.remove(&identifier);
                    tracing::debug!(generation, "Passcode evicted");
                } else {
                    tracing::debug!(generation, "Stale passcode eviction ignored");
                }
            }),
        )
    }
}

impl Drop for PasscodeRegistry {
    fn drop(&mut self) {
        let state = self.state.lock();
        for entry in state.entries.values() {
            self.scheduler.cancel(entry.eviction);
        }
    }
}

impl std::fmt::Debug for PasscodeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasscodeRegistry")
            .field("entries", &self.len())
            .finish()
    }
}
