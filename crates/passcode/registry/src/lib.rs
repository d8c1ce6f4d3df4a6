//! # MultiAuth Passcodes
//!
//! A time-bounded registry of one-time passcodes. This crate provides:
//! - Issuing and renewing passcodes with a fixed lifetime
//! - Validity checks recomputed from the clock on every call
//! - Eviction timers that can never remove a renewed passcode
//! - Snapshots of active passcodes for display
//! - Validation of user-entered codes

mod config;
pub mod display;
pub mod input;
mod registry;

pub use config::{DEFAULT_PASSCODE_DURATION_MS, PasscodeConfig};
pub use input::{CheckOutcome, InputError, IssueOutcome, validate_code, validate_lookup};
pub use registry::{ActivePasscode, PasscodeEntry, PasscodeRegistry};
