//! In-memory credential authority.
//!
//! The development and test backend. Owns everything the real authority
//! would: Argon2id password hashing, opaque token minting, the session table,
//! the process-local session slot, and the session-change broadcast. It also
//! stands in for the database trigger that materializes a profile whenever an
//! account is created, which is where the atomic username claim happens.

use std::{collections::HashMap, sync::Arc};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core},
};
use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::Utc;
use rand::RngCore;
use tokio::sync::{RwLock, broadcast};
use uuid::Uuid;

use super::{
    Account, AuthenticatedSession, AuthorityError, CredentialAuthority, NewAccount, Session,
    SessionEvent,
};
use crate::{
    constants::SESSION_TTL_SECS,
    profile::{Profile, ProfileError, ProfileStore},
};

/// Number of random bytes in an access or refresh token.
const TOKEN_BYTES: usize = 32;

/// Capacity of the session-change broadcast channel.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// An account together with its credential, private to the authority.
struct StoredAccount {
    account: Account,
    password_hash: String,
}

/// Server-side record of an issued session, keyed by access token.
struct SessionRecord {
    account_id: String,
    expires_at: i64,
}

/// In-memory implementation of [`CredentialAuthority`].
pub struct InMemoryAuthority {
    /// Accounts keyed by id.
    accounts: RwLock<HashMap<String, StoredAccount>>,

    /// Issued, unrevoked sessions keyed by access token.
    sessions: RwLock<HashMap<String, SessionRecord>>,

    /// Local session storage (single live client per process).
    current: RwLock<Option<AuthenticatedSession>>,

    /// Session-change notification channel.
    events: broadcast::Sender<SessionEvent>,

    /// Trigger target: profiles materialize here on account creation.
    profiles: Arc<dyn ProfileStore>,
}

impl InMemoryAuthority {
    /// Create a new authority backed by the given profile store.
    pub fn new(profiles: Arc<dyn ProfileStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            accounts: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
            current: RwLock::new(None),
            events,
            profiles,
        }
    }

    /// Mark an account's email as verified.
    ///
    /// The verification mechanism itself (mail delivery, confirmation links)
    /// lives outside this system; this is its observable effect, used by
    /// operators and tests.
    pub async fn confirm_email(&self, account_id: &str) -> Result<(), AuthorityError> {
        let mut accounts = self.accounts.write().await;
        let stored = accounts
            .get_mut(account_id)
            .ok_or_else(|| AuthorityError::AccountNotFound {
                account_id: account_id.to_string(),
            })?;
        stored.account.metadata.email_verified = true;
        Ok(())
    }

    /// Number of live session-change subscribers (for debugging).
    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    /// Mint and record a session for an account id.
    async fn mint_session(&self, account_id: &str) -> Session {
        let session = Session {
            access_token: new_token(),
            refresh_token: new_token(),
            expires_at: Utc::now().timestamp() + SESSION_TTL_SECS,
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(
            session.access_token.clone(),
            SessionRecord {
                account_id: account_id.to_string(),
                expires_at: session.expires_at,
            },
        );

        session
    }
}

#[async_trait::async_trait]
impl CredentialAuthority for InMemoryAuthority {
    async fn create_account(&self, new_account: NewAccount) -> Result<Account, AuthorityError> {
        let NewAccount {
            email,
            password,
            metadata,
        } = new_account;
        let email = email.to_lowercase();
        let password_hash = hash_password(&password)?;

        // Hold the account write lock across the profile claim so concurrent
        // registrations serialize on one constraint.
        let mut accounts = self.accounts.write().await;

        let account = Account {
            id: Uuid::new_v4().to_string(),
            primary_email: email,
            metadata,
            created_at: Utc::now().timestamp(),
        };

        // Trigger side effect: the profile (and with it the username claim)
        // must exist before the account becomes visible. The claim comes
        // first, it is the authoritative uniqueness signal.
        let profile = Profile {
            id: account.id.clone(),
            username: account.metadata.username.clone(),
            email: Some(account.primary_email.clone()),
            auth_option: account.metadata.auth_option,
        };
        self.profiles.insert(profile).await.map_err(|err| match err {
            ProfileError::UsernameExists { username } => {
                AuthorityError::UsernameConflict { username }
            }
            ProfileError::Unavailable { reason } => AuthorityError::Unavailable { reason },
        })?;

        if accounts
            .values()
            .any(|stored| stored.account.primary_email == account.primary_email)
        {
            // The account never existed, so the claim must not survive.
            let _ = self.profiles.remove(&account.id).await;
            return Err(AuthorityError::EmailConflict {
                email: account.primary_email,
            });
        }

        accounts.insert(
            account.id.clone(),
            StoredAccount {
                account: account.clone(),
                password_hash,
            },
        );

        tracing::debug!(account_id = %account.id, username = %account.metadata.username, "account created");
        Ok(account)
    }

    async fn verify_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedSession, AuthorityError> {
        let email = email.to_lowercase();

        let account = {
            let accounts = self.accounts.read().await;
            let stored = accounts
                .values()
                .find(|stored| stored.account.primary_email == email)
                .ok_or(AuthorityError::InvalidCredentials)?;

            verify_password_hash(password, &stored.password_hash)?;

            if !stored.account.metadata.email_verified {
                return Err(AuthorityError::EmailNotVerified);
            }

            stored.account.clone()
        };

        let session = self.mint_session(&account.id).await;
        Ok(AuthenticatedSession { account, session })
    }

    async fn issue_session(&self, account_id: &str) -> Result<Session, AuthorityError> {
        {
            let accounts = self.accounts.read().await;
            if !accounts.contains_key(account_id) {
                return Err(AuthorityError::AccountNotFound {
                    account_id: account_id.to_string(),
                });
            }
        }

        Ok(self.mint_session(account_id).await)
    }

    async fn current_session(&self) -> Result<Option<AuthenticatedSession>, AuthorityError> {
        let mut current = self.current.write().await;
        let now = Utc::now().timestamp();

        if let Some(auth) = &*current
            && auth.session.is_expired_at(now)
        {
            *current = None;
        }

        Ok(current.clone())
    }

    fn subscribe_session_changes(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    async fn adopt_session(&self, session: Session) -> Result<(), AuthorityError> {
        let now = Utc::now().timestamp();

        let account_id = {
            let sessions = self.sessions.read().await;
            let record = sessions.get(&session.access_token).ok_or_else(|| {
                AuthorityError::InvalidSession {
                    reason: "unknown access token".to_string(),
                }
            })?;

            if record.expires_at <= now || session.is_expired_at(now) {
                return Err(AuthorityError::InvalidSession {
                    reason: "session expired".to_string(),
                });
            }

            record.account_id.clone()
        };

        let account = {
            let accounts = self.accounts.read().await;
            accounts
                .get(&account_id)
                .map(|stored| stored.account.clone())
                .ok_or(AuthorityError::AccountNotFound { account_id })?
        };

        let authenticated = AuthenticatedSession { account, session };
        *self.current.write().await = Some(authenticated.clone());

        // No receivers is fine; the event is simply unobserved.
        let _ = self.events.send(SessionEvent::SignedIn(authenticated));
        Ok(())
    }

    async fn invalidate_session(&self) -> Result<(), AuthorityError> {
        let previous = self.current.write().await.take();

        if let Some(auth) = previous {
            let mut sessions = self.sessions.write().await;
            sessions.remove(&auth.session.access_token);
        }

        let _ = self.events.send(SessionEvent::SignedOut);
        Ok(())
    }
}

/// Hash a password using Argon2id (PHC string format).
fn hash_password(password: &str) -> Result<String, AuthorityError> {
    let salt = SaltString::generate(&mut rand_core::OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthorityError::Internal {
            reason: format!("Password hashing failed: {e}"),
        })
}

/// Verify a password against a stored PHC hash.
///
/// Every failure mode collapses into [`AuthorityError::InvalidCredentials`].
fn verify_password_hash(password: &str, password_hash: &str) -> Result<(), AuthorityError> {
    let parsed_hash =
        PasswordHash::new(password_hash).map_err(|_| AuthorityError::InvalidCredentials)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthorityError::InvalidCredentials)
}

/// Generate an opaque URL-safe token.
fn new_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}
