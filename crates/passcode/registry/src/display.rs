//! Helpers for presenting active passcodes.

use crate::registry::ActivePasscode;

/// Orders passcodes so the one expiring soonest comes first.
pub fn soonest_first(mut passcodes: Vec<ActivePasscode>) -> Vec<ActivePasscode> {
    passcodes.sort_by_key(|p| p.remaining_ms);
    passcodes
}

/// Whole seconds left, rounded up (1 ms left shows as 1s).
pub fn remaining_seconds(remaining_ms: i64) -> i64 {
    let ms = remaining_ms.max(0);
    ms / 1000 + i64::from(ms % 1000 > 0)
}
