//! Core data types for MultiAuth.
//!
//! This module defines `PasscodeId`, the canonical key under which a
//! passcode is stored.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Canonical identifier of a passcode.
///
/// Integers are rendered in decimal, so a code built from `1234` and one
/// built from `"1234"` refer to the same passcode. No trimming or
/// validation happens here; callers that accept user input validate it
/// first.
///
/// # Example
///
/// ```rust
/// use multiauth_core::PasscodeId;
///
/// assert_eq!(PasscodeId::from(1234u32), PasscodeId::from("1234"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasscodeId(String);

impl PasscodeId {
    /// Creates an identifier from its textual form.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PasscodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PasscodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PasscodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PasscodeId {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

impl From<String> for PasscodeId {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl From<&String> for PasscodeId {
    fn from(code: &String) -> Self {
        Self(code.clone())
    }
}

impl From<&PasscodeId> for PasscodeId {
    fn from(id: &PasscodeId) -> Self {
        id.clone()
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for PasscodeId {
                fn from(code: $ty) -> Self {
                    Self(code.to_string())
                }
            }
        )*
    };
}

impl_from_integer!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);
