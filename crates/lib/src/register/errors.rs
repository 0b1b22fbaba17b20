//! Error types for registration.

use thiserror::Error;

use crate::{authority::AuthorityError, validation::ValidationError};

/// Errors that can occur during registration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegisterError {
    /// Input failed shape validation; no I/O was performed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The username is already claimed (case-insensitively).
    #[error("Username already in use: {username}")]
    UsernameTaken { username: String },

    /// An account already exists for this email.
    #[error("Email already registered: {email}")]
    EmailTaken { email: String },

    /// The authority or profile store failed; detail is logged server-side
    /// and never forwarded to clients.
    #[error(transparent)]
    Authority(AuthorityError),
}

impl RegisterError {
    /// Check if this error is recoverable by the caller correcting input.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            RegisterError::Validation(_)
                | RegisterError::UsernameTaken { .. }
                | RegisterError::EmailTaken { .. }
        )
    }

    /// Check if this error indicates a uniqueness conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            RegisterError::UsernameTaken { .. } | RegisterError::EmailTaken { .. }
        )
    }
}

// Conversion from RegisterError to the main Error type
impl From<RegisterError> for crate::Error {
    fn from(err: RegisterError) -> Self {
        crate::Error::Register(err)
    }
}
