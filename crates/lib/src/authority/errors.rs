//! Error types for the credential authority seam.

use thiserror::Error;

/// Errors that can occur in credential authority operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthorityError {
    /// The email/password pair did not verify.
    ///
    /// Deliberately covers both "unknown email" and "wrong password"; callers
    /// must not be able to tell them apart.
    #[error("Credentials rejected")]
    InvalidCredentials,

    /// The account exists but its email has not been verified yet.
    #[error("Email address not verified")]
    EmailNotVerified,

    /// Account creation lost the atomic username claim.
    ///
    /// Raised by the store-level uniqueness constraint, making this the
    /// authoritative "username taken" signal.
    #[error("Username already claimed: {username}")]
    UsernameConflict { username: String },

    /// An account with this primary email already exists.
    #[error("Email already registered: {email}")]
    EmailConflict { email: String },

    /// No account with this id exists.
    #[error("Account not found: {account_id}")]
    AccountNotFound { account_id: String },

    /// The presented session is unknown, revoked, or expired.
    #[error("Invalid session: {reason}")]
    InvalidSession { reason: String },

    /// The authority could not be reached or timed out.
    #[error("Credential authority unavailable: {reason}")]
    Unavailable { reason: String },

    /// The authority failed internally.
    #[error("Credential authority error: {reason}")]
    Internal { reason: String },
}

impl AuthorityError {
    /// Check if this error is a credential rejection (including the
    /// verification gate).
    pub fn is_credential_rejection(&self) -> bool {
        matches!(
            self,
            AuthorityError::InvalidCredentials | AuthorityError::EmailNotVerified
        )
    }

    /// Check if this error indicates a conflict with existing state.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            AuthorityError::UsernameConflict { .. } | AuthorityError::EmailConflict { .. }
        )
    }

    /// Check if this error indicates the authority itself failed.
    pub fn is_authority_failure(&self) -> bool {
        matches!(
            self,
            AuthorityError::Unavailable { .. } | AuthorityError::Internal { .. }
        )
    }
}

// Conversion from AuthorityError to the main Error type
impl From<AuthorityError> for crate::Error {
    fn from(err: AuthorityError) -> Self {
        crate::Error::Authority(err)
    }
}
