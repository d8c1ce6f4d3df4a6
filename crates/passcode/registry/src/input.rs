//! Validation of user-entered codes and user-facing outcome messages.
//!
//! The registry accepts any identifier. These checks belong to whoever
//! collects codes from people, and run before the registry is called.

use multiauth_core::{MultiAuthError, PasscodeId};

use crate::config::PasscodeConfig;

/// Reasons an entered code is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// Nothing was entered when issuing a passcode.
    #[error("Enter a numeric passcode.")]
    MissingCode,

    /// Nothing was entered when checking a passcode.
    #[error("Enter a passcode to check.")]
    MissingLookup,

    /// The code contains something other than ASCII digits.
    #[error("Passcode must be numeric.")]
    NotNumeric,

    /// The code exceeds the configured length.
    #[error("Passcode must be at most {max} characters.")]
    TooLong { max: usize },
}

impl InputError {
    /// Returns an error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            InputError::MissingCode | InputError::MissingLookup => "EMPTY_CODE",
            InputError::NotNumeric => "NON_NUMERIC_CODE",
            InputError::TooLong { .. } => "CODE_TOO_LONG",
        }
    }
}

impl From<InputError> for MultiAuthError {
    fn from(err: InputError) -> Self {
        MultiAuthError::invalid_input("code", err.to_string())
    }
}

/// Validates a code entered for issuing.
///
/// Surrounding whitespace is trimmed. The code must be non-empty, within
/// `max_length`, and numeric when `numeric_only` is set.
pub fn validate_code(raw: &str, config: &PasscodeConfig) -> Result<PasscodeId, InputError> {
    let code = raw.trim();
    if code.is_empty() {
        return Err(InputError::MissingCode);
    }
    if config.numeric_only && !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InputError::NotNumeric);
    }
    check_length(code, config)?;
    Ok(PasscodeId::from(code))
}

/// Validates a code entered for checking.
///
/// Only emptiness and length are enforced; a malformed code is simply
/// reported as invalid by the registry.
pub fn validate_lookup(raw: &str, config: &PasscodeConfig) -> Result<PasscodeId, InputError> {
    let code = raw.trim();
    if code.is_empty() {
        return Err(InputError::MissingLookup);
    }
    check_length(code, config)?;
    Ok(PasscodeId::from(code))
}

fn check_length(code: &str, config: &PasscodeConfig) -> Result<(), InputError> {
    if code.chars().count() > config.max_length {
        return Err(InputError::TooLong {
            max: config.max_length,
        });
    }
    Ok(())
}

/// What issuing a passcode did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueOutcome {
    /// A new passcode was stored.
    Created,
    /// A still-valid passcode had its expiry reset.
    Renewed,
}

impl IssueOutcome {
    /// Maps the registry's return value.
    pub fn from_renewed(renewed: bool) -> Self {
        if renewed { Self::Renewed } else { Self::Created }
    }

    /// Returns true for [`IssueOutcome::Renewed`].
    pub fn is_renewed(&self) -> bool {
        matches!(self, Self::Renewed)
    }

    /// User-facing message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Created => "New passcode created.",
            Self::Renewed => "Passcode existed and expiry reset.",
        }
    }
}

/// Result of checking a passcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The passcode exists and has not expired.
    Valid,
    /// The passcode is unknown or expired.
    Invalid,
}

impl CheckOutcome {
    /// Maps the registry's return value.
    pub fn from_valid(valid: bool) -> Self {
        if valid { Self::Valid } else { Self::Invalid }
    }

    /// Returns true for [`CheckOutcome::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// User-facing message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Valid => "Valid (not expired)",
            Self::Invalid => "Invalid or expired",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_code_trims() {
        let config = PasscodeConfig::default();
        let id = validate_code("  123456 \n", &config).unwrap();
        assert_eq!(id.as_str(), "123456");
    }

    #[test]
    fn test_validate_code_rejections() {
        let config = PasscodeConfig::default();
        assert_eq!(validate_code("   ", &config), Err(InputError::MissingCode));
        assert_eq!(validate_code("12a4", &config), Err(InputError::NotNumeric));
        assert_eq!(validate_code("-12", &config), Err(InputError::NotNumeric));
        assert_eq!(
            validate_code(&"1".repeat(33), &config),
            Err(InputError::TooLong { max: 32 })
        );
    }

    #[test]
    fn test_validate_code_any_characters() {
        let config = PasscodeConfig::default().allow_any_characters();
        assert!(validate_code("abc-123", &config).is_ok());
    }

    #[test]
    fn test_validate_lookup_allows_non_numeric() {
        let config = PasscodeConfig::default();
        assert_eq!(validate_lookup("abc", &config).unwrap().as_str(), "abc");
        assert_eq!(validate_lookup("", &config), Err(InputError::MissingLookup));
    }

    #[test]
    fn test_error_codes_and_messages() {
        assert_eq!(InputError::MissingCode.error_code(), "EMPTY_CODE");
        assert_eq!(InputError::NotNumeric.to_string(), "Passcode must be numeric.");
        assert_eq!(InputError::TooLong { max: 4 }.error_code(), "CODE_TOO_LONG");
    }

    #[test]
    fn test_into_multiauth_error() {
        let err: MultiAuthError = InputError::NotNumeric.into();
        assert!(err.is_user_error());
        assert_eq!(err.status_code(), 422);
    }

    #[test]
    fn test_outcomes() {
        assert_eq!(IssueOutcome::from_renewed(true), IssueOutcome::Renewed);
        assert!(!IssueOutcome::from_renewed(false).is_renewed());
        assert_eq!(CheckOutcome::from_valid(false).message(), "Invalid or expired");
        assert!(CheckOutcome::from_valid(true).is_valid());
    }
}
