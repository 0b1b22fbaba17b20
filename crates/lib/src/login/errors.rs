//! Error types for login.

use thiserror::Error;

use crate::{authority::AuthorityError, constants::INVALID_CREDENTIALS_MESSAGE};

/// Errors that can occur during login.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoginError {
    /// The identifier/password pair was rejected.
    ///
    /// One variant, one message, whether the identifier was unknown, the
    /// password wrong, or a field empty.
    #[error("{INVALID_CREDENTIALS_MESSAGE}")]
    InvalidCredentials,

    /// The account exists but its email is not verified yet.
    ///
    /// The one rejection deliberately kept distinct from
    /// [`LoginError::InvalidCredentials`].
    #[error("Email not verified. Check your inbox for the verification message")]
    EmailNotVerified,

    /// The authority or profile store failed; detail is logged server-side
    /// and never forwarded to clients.
    #[error(transparent)]
    Authority(AuthorityError),
}

impl LoginError {
    /// Check if this error is a credential rejection.
    pub fn is_credential_rejection(&self) -> bool {
        matches!(
            self,
            LoginError::InvalidCredentials | LoginError::EmailNotVerified
        )
    }
}

// Conversion from LoginError to the main Error type
impl From<LoginError> for crate::Error {
    fn from(err: LoginError) -> Self {
        crate::Error::Login(err)
    }
}
