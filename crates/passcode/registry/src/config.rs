//! Passcode configuration.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Default passcode lifetime: five minutes.
pub const DEFAULT_PASSCODE_DURATION_MS: i64 = 5 * 60 * 1000;

/// Settings for issuing passcodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasscodeConfig {
    /// Lifetime given to passcodes when the caller does not pick one.
    pub default_duration_ms: i64,
    /// Whether entered codes must consist of ASCII digits only.
    pub numeric_only: bool,
    /// Maximum accepted code length, in characters.
    pub max_length: usize,
}

impl Default for PasscodeConfig {
    fn default() -> Self {
        Self {
            default_duration_ms: DEFAULT_PASSCODE_DURATION_MS,
            numeric_only: true,
            max_length: 32,
        }
    }
}

impl PasscodeConfig {
    /// Creates a config with the given default lifetime.
    pub fn new(default_duration_ms: i64) -> Self {
        Self {
            default_duration_ms,
            ..Default::default()
        }
    }

    /// Allows any characters in entered codes.
    pub fn allow_any_characters(mut self) -> Self {
        self.numeric_only = false;
        self
    }

    /// Sets the maximum accepted code length.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// The default lifetime as a duration.
    pub fn default_duration(&self) -> TimeDelta {
        TimeDelta::milliseconds(self.default_duration_ms)
    }
}
