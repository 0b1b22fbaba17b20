//! Error types for the client.

use thiserror::Error;

use crate::authority::AuthorityError;

/// Errors that can occur in client operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// The service answered with an error status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The service could not be reached.
    #[error("Failed to reach service: {0}")]
    Transport(#[from] reqwest::Error),

    /// Adopting or invalidating the session at the authority failed.
    #[error(transparent)]
    Authority(AuthorityError),
}

impl ClientError {
    /// Check if the service rejected the request with this status.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this error indicates a credential rejection.
    pub fn is_credential_rejection(&self) -> bool {
        matches!(
            self,
            ClientError::Rejected {
                status: 401 | 403,
                ..
            }
        )
    }
}

// Conversion from ClientError to the main Error type
impl From<ClientError> for crate::Error {
    fn from(err: ClientError) -> Self {
        crate::Error::Client(err)
    }
}
