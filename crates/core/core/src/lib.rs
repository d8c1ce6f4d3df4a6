//! # MultiAuth Core
//!
//! This crate provides the foundational types and traits for MultiAuth.
//! It defines the canonical passcode identifier, the error type shared by
//! the workspace, and the clock and scheduler abstractions that every
//! time-bounded component is built on.

pub mod error;
pub mod sim;
pub mod time;
pub mod traits;
pub mod types;

// Re-export commonly used items at the crate root
pub use error::{MultiAuthError, MultiAuthResult};
pub use time::{SystemClock, TokioScheduler};
pub use traits::{Clock, ScheduledTask, Scheduler, TimerHandle};
pub use types::PasscodeId;
