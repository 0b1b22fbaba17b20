//! Error types for the profile store.

use thiserror::Error;

/// Errors that can occur in profile store operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileError {
    /// The username is already claimed by another profile.
    #[error("Username already exists: {username}")]
    UsernameExists { username: String },

    /// The store could not be reached or failed internally.
    #[error("Profile store unavailable: {reason}")]
    Unavailable { reason: String },
}

impl ProfileError {
    /// Check if this error indicates a username conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ProfileError::UsernameExists { .. })
    }
}

// Conversion from ProfileError to the main Error type
impl From<ProfileError> for crate::Error {
    fn from(err: ProfileError) -> Self {
        crate::Error::Profile(err)
    }
}
