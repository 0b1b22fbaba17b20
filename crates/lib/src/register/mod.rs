//! Registration coordination.
//!
//! Orchestrates the two registration modes against the credential authority:
//! Option A (username + password, synthesized placeholder email, auto-login)
//! and Option B (username + real email + password, verification required, no
//! session until verified).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    authority::{
        Account, AccountMetadata, AuthOption, AuthorityError, CredentialAuthority, NewAccount,
        Session,
    },
    constants::placeholder_email,
    profile::ProfileStore,
    validation,
};

pub mod errors;

pub use errors::RegisterError;

/// Human-facing confirmation for Option A registrations.
const REGISTERED_MESSAGE: &str = "Account created successfully.";

/// Human-facing confirmation for Option B registrations.
const VERIFY_EMAIL_MESSAGE: &str =
    "Account created successfully. Please verify your email before signing in.";

/// Registration input.
///
/// The presence of `email` selects the mode: absent means Option A
/// (placeholder address, pre-verified), present means Option B (verification
/// required before first login).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password: String,
}

/// A successful registration.
#[derive(Clone, Debug)]
pub struct Registration {
    /// The created account as the authority reported it.
    pub account: Account,

    /// Human-facing outcome message.
    pub message: &'static str,

    /// Immediately usable session, Option A only.
    ///
    /// Option B issues no session: login must wait for email verification.
    pub session: Option<Session>,
}

/// Coordinates account registration.
///
/// Stateless; any number of registrations may run concurrently. The only
/// cross-request hazard, two registrations racing one username, is settled by
/// the profile store's atomic claim inside
/// [`CredentialAuthority::create_account`].
pub struct Registrar {
    authority: Arc<dyn CredentialAuthority>,
    profiles: Arc<dyn ProfileStore>,
}

impl Registrar {
    /// Create a registrar over the authority and profile store seams.
    pub fn new(authority: Arc<dyn CredentialAuthority>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self {
            authority,
            profiles,
        }
    }

    /// Register an account.
    ///
    /// Validation failures short-circuit before any I/O. The username
    /// pre-check is a fast-path UX hint only; the authoritative uniqueness
    /// signal is the authority's store-level claim conflict. No internal
    /// retries: every failure is terminal for this call.
    pub async fn register(&self, request: RegisterRequest) -> Result<Registration, RegisterError> {
        let RegisterRequest {
            username,
            email,
            password,
        } = request;

        let username = username.trim();
        validation::validate_username(username)?;
        validation::validate_password(&password)?;
        if let Some(email) = &email {
            validation::validate_email(email.trim())?;
        }

        let username = username.to_lowercase();
        let auth_option = match email {
            Some(_) => AuthOption::B,
            None => AuthOption::A,
        };

        // Fast path: reject an obviously taken username before touching the
        // authority. Losing a race here is fine, create_account settles it.
        let existing = self
            .profiles
            .get_by_username(&username)
            .await
            .map_err(|err| {
                RegisterError::Authority(AuthorityError::Unavailable {
                    reason: err.to_string(),
                })
            })?;
        if existing.is_some() {
            return Err(RegisterError::UsernameTaken { username });
        }

        let email = match email {
            Some(email) => email.trim().to_lowercase(),
            None => placeholder_email(&username),
        };

        let metadata = AccountMetadata {
            username: username.clone(),
            auth_option,
            // Option A has no deliverable address, so it is born verified;
            // Option B must verify before first login.
            email_verified: matches!(auth_option, AuthOption::A),
        };

        let account = self
            .authority
            .create_account(NewAccount {
                email,
                password,
                metadata,
            })
            .await
            .map_err(|err| match err {
                AuthorityError::UsernameConflict { username } => {
                    RegisterError::UsernameTaken { username }
                }
                AuthorityError::EmailConflict { email } => RegisterError::EmailTaken { email },
                other => RegisterError::Authority(other),
            })?;

        let (message, session) = match auth_option {
            AuthOption::A => {
                // Auto-login: no verification gate stands between an Option A
                // account and its first session.
                let session = self
                    .authority
                    .issue_session(&account.id)
                    .await
                    .map_err(RegisterError::Authority)?;
                (REGISTERED_MESSAGE, Some(session))
            }
            AuthOption::B => (VERIFY_EMAIL_MESSAGE, None),
        };

        tracing::info!(
            account_id = %account.id,
            username = %username,
            option = ?auth_option,
            "registration completed"
        );

        Ok(Registration {
            account,
            message,
            session,
        })
    }
}
