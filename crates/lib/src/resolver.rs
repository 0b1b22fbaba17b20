//! Identifier resolution for login.
//!
//! A login identifier is either an email or a username. The resolver maps it
//! to the canonical email the credential authority authenticates against:
//! emails pass through untouched (the authority rejects unknown ones itself),
//! usernames go through the profile store.

use std::sync::Arc;

use thiserror::Error;

use crate::{constants::placeholder_email, profile::ProfileStore};

/// Errors produced during identifier resolution.
///
/// `UnknownUsername` never reaches a client: the authentication coordinator
/// folds it into the generic credential failure so callers cannot probe for
/// account existence.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResolverError {
    /// No profile exists for this username.
    #[error("No profile for username: {username}")]
    UnknownUsername { username: String },

    /// The profile store failed.
    #[error(transparent)]
    Profile(#[from] crate::profile::ProfileError),
}

impl ResolverError {
    /// Check if this error indicates the identifier did not resolve.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolverError::UnknownUsername { .. })
    }
}

// Conversion from ResolverError to the main Error type
impl From<ResolverError> for crate::Error {
    fn from(err: ResolverError) -> Self {
        crate::Error::Resolver(err)
    }
}

/// The canonical email a login identifier resolved to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedIdentifier {
    pub email: String,
}

/// Maps raw login identifiers to canonical emails.
pub struct IdentifierResolver {
    profiles: Arc<dyn ProfileStore>,
}

impl IdentifierResolver {
    /// Create a resolver over a profile store.
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        Self { profiles }
    }

    /// Resolve an identifier to the email to authenticate with.
    ///
    /// The identifier is trimmed and lower-cased first. Anything containing
    /// an `@` is treated as an email and returned unchanged, with no store
    /// lookup and no existence check. Anything else is a username: its
    /// profile supplies the stored email, or, when the stored email is empty,
    /// the synthesized placeholder address.
    pub async fn resolve(&self, identifier: &str) -> Result<ResolvedIdentifier, ResolverError> {
        let identifier = identifier.trim().to_lowercase();

        if identifier.contains('@') {
            return Ok(ResolvedIdentifier { email: identifier });
        }

        let profile = self
            .profiles
            .get_by_username(&identifier)
            .await?
            .ok_or_else(|| ResolverError::UnknownUsername {
                username: identifier.clone(),
            })?;

        let email = match profile.email {
            Some(email) if !email.is_empty() => email,
            _ => placeholder_email(&identifier),
        };

        Ok(ResolvedIdentifier { email })
    }
}
