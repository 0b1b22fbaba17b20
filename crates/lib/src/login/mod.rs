//! Login coordination.
//!
//! Resolves the supplied identifier (username or email) to a canonical email,
//! verifies the credential pair with the authority, and shapes the response.
//! Everything that could reveal whether an identifier exists collapses into
//! one generic credential failure.

use std::sync::Arc;

use crate::{
    authority::{Account, AuthorityError, CredentialAuthority, Session},
    profile::ProfileStore,
    resolver::{IdentifierResolver, ResolverError},
};

pub mod errors;

pub use errors::LoginError;

/// A successful login.
#[derive(Clone, Debug)]
pub struct Login {
    /// The authenticated account.
    pub account: Account,

    /// Display username.
    ///
    /// Taken from the profile; falls back to the normalized identifier when
    /// the profile has not materialized yet.
    pub username: String,

    /// The session exactly as the authority issued it.
    pub session: Session,
}

/// Coordinates login.
///
/// Stateless, one authority round-trip per call, no internal retries.
pub struct Authenticator {
    authority: Arc<dyn CredentialAuthority>,
    resolver: IdentifierResolver,
    profiles: Arc<dyn ProfileStore>,
}

impl Authenticator {
    /// Create an authenticator over the authority and profile store seams.
    pub fn new(authority: Arc<dyn CredentialAuthority>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self {
            authority,
            resolver: IdentifierResolver::new(profiles.clone()),
            profiles,
        }
    }

    /// Authenticate an identifier/password pair.
    ///
    /// Unknown identifier and wrong password return the same
    /// [`LoginError::InvalidCredentials`]; the single deliberate exception is
    /// [`LoginError::EmailNotVerified`] for accounts still waiting on email
    /// verification.
    pub async fn authenticate(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<Login, LoginError> {
        if identifier.trim().is_empty() || password.is_empty() {
            return Err(LoginError::InvalidCredentials);
        }

        let resolved = match self.resolver.resolve(identifier).await {
            Ok(resolved) => resolved,
            // Enumeration resistance: an unknown username reads exactly like
            // a wrong password.
            Err(ResolverError::UnknownUsername { .. }) => {
                return Err(LoginError::InvalidCredentials);
            }
            Err(ResolverError::Profile(err)) => {
                return Err(LoginError::Authority(AuthorityError::Unavailable {
                    reason: err.to_string(),
                }));
            }
        };

        let authenticated = self
            .authority
            .verify_password(&resolved.email, password)
            .await
            .map_err(|err| match err {
                AuthorityError::InvalidCredentials => LoginError::InvalidCredentials,
                AuthorityError::EmailNotVerified => LoginError::EmailNotVerified,
                other => LoginError::Authority(other),
            })?;

        let username = match self.profiles.get_by_id(&authenticated.account.id).await {
            Ok(Some(profile)) => profile.username,
            Ok(None) => identifier.trim().to_lowercase(),
            Err(err) => {
                tracing::warn!(
                    account_id = %authenticated.account.id,
                    "profile lookup failed after login: {err}"
                );
                identifier.trim().to_lowercase()
            }
        };

        tracing::debug!(account_id = %authenticated.account.id, %username, "login succeeded");

        Ok(Login {
            account: authenticated.account,
            username,
            session: authenticated.session,
        })
    }
}
