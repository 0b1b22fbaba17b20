//! Credential authority abstraction.
//!
//! The credential authority is the trusted external system of record for
//! passwords, tokens, and the canonical (id ↔ primary-email) mapping. The
//! core never stores credentials itself; it calls operations on this seam and
//! interprets the responses.
//!
//! [`InMemoryAuthority`] is the development and test backend. It owns Argon2id
//! password hashing and token minting, and plays the role of the database
//! trigger that materializes profiles when accounts are created.

use async_trait::async_trait;
use tokio::sync::broadcast;

pub mod errors;
pub mod in_memory;
pub mod types;

pub use errors::AuthorityError;
pub use in_memory::InMemoryAuthority;
pub use types::{
    Account, AccountMetadata, AuthOption, AuthenticatedSession, NewAccount, Session, SessionEvent,
};

/// Operations the core consumes from the credential authority.
///
/// The first three are the service-side surface used by the coordinators; the
/// rest manage the process-local session slot the client-side synchronizer
/// observes. Network-layer timeouts must surface as
/// [`AuthorityError::Unavailable`], never as a silent hang.
#[async_trait]
pub trait CredentialAuthority: Send + Sync {
    /// Create an account.
    ///
    /// Atomically claims the username through the profile store (the
    /// "database trigger" side effect); a lost claim surfaces as
    /// [`AuthorityError::UsernameConflict`].
    async fn create_account(&self, new_account: NewAccount) -> Result<Account, AuthorityError>;

    /// Verify an email/password pair and, on success, issue a session.
    ///
    /// Unknown email and wrong password are indistinguishable
    /// ([`AuthorityError::InvalidCredentials`]); an unverified account is the
    /// one distinct rejection ([`AuthorityError::EmailNotVerified`]).
    async fn verify_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthenticatedSession, AuthorityError>;

    /// Mint a session for an account without a password check.
    ///
    /// Used for Option A auto-login at registration, where the caller has
    /// just created the account.
    async fn issue_session(&self, account_id: &str) -> Result<Session, AuthorityError>;

    /// Return the session currently installed in local session storage.
    async fn current_session(&self) -> Result<Option<AuthenticatedSession>, AuthorityError>;

    /// Subscribe to session-change notifications.
    ///
    /// Events arrive strictly in the order the authority emits them. The
    /// subscription ends when the receiver is dropped.
    fn subscribe_session_changes(&self) -> broadcast::Receiver<SessionEvent>;

    /// Install an issued session into local session storage.
    ///
    /// Coordinator responses are not pushed through the notification stream,
    /// so callers adopt them explicitly; adoption itself is then broadcast.
    async fn adopt_session(&self, session: Session) -> Result<(), AuthorityError>;

    /// Revoke and clear the locally installed session.
    async fn invalidate_session(&self) -> Result<(), AuthorityError>;
}
