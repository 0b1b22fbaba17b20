//! Input validation for registration and login.
//!
//! Pure, synchronous shape checks with no I/O. Coordinators run these before
//! touching the credential authority or the profile store, so malformed input
//! never costs a network call.

use thiserror::Error;

use crate::constants::{MIN_PASSWORD_LENGTH, MIN_USERNAME_LENGTH};

/// Errors produced by input validation.
///
/// Every variant is recoverable by the caller correcting their input.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    /// Username shorter than the accepted minimum.
    #[error("Username must be at least {minimum} characters (got {length})")]
    UsernameTooShort { length: usize, minimum: usize },

    /// Username contains characters outside `[A-Za-z0-9_-]`.
    #[error("Username may only contain letters, numbers, hyphens and underscores")]
    UsernameInvalidFormat,

    /// Password shorter than the accepted minimum.
    #[error("Password must be at least {minimum} characters")]
    PasswordTooShort { minimum: usize },

    /// Email does not look like an address.
    #[error("Email address is not valid")]
    EmailInvalidFormat,
}

// Conversion from ValidationError to the main Error type
impl From<ValidationError> for crate::Error {
    fn from(err: ValidationError) -> Self {
        crate::Error::Validation(err)
    }
}

impl ValidationError {
    /// Check if this error is about the username field.
    pub fn is_username_error(&self) -> bool {
        matches!(
            self,
            ValidationError::UsernameTooShort { .. } | ValidationError::UsernameInvalidFormat
        )
    }
}

/// Validate a username for registration.
///
/// Usernames must be at least [`MIN_USERNAME_LENGTH`] characters and match
/// `^[A-Za-z0-9_-]+$`. Case is accepted here; storage and comparison always
/// use the lower-cased form.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.chars().count() < MIN_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooShort {
            length: username.chars().count(),
            minimum: MIN_USERNAME_LENGTH,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ValidationError::UsernameInvalidFormat);
    }

    Ok(())
}

/// Validate a password for registration.
///
/// Only the length floor is enforced; strength policy is the credential
/// authority's concern.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort {
            minimum: MIN_PASSWORD_LENGTH,
        });
    }

    Ok(())
}

/// Validate an email address supplied at registration.
///
/// A simple syntactic check: exactly one `@`, a non-empty local part, and a
/// domain containing at least one interior dot. Deliverability is the
/// credential authority's problem.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let mut parts = email.split('@');

    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ValidationError::EmailInvalidFormat);
    };

    if local.is_empty() || domain.is_empty() {
        return Err(ValidationError::EmailInvalidFormat);
    }

    let dotted = domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.');
    if !dotted || email.chars().any(char::is_whitespace) {
        return Err(ValidationError::EmailInvalidFormat);
    }

    Ok(())
}
