//! Core data types for the credential authority seam.

use serde::{Deserialize, Serialize};

/// Which registration path created an account.
///
/// Option A is username-only (synthesized placeholder email, pre-verified);
/// Option B carries a real email and a mandatory verification step.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum AuthOption {
    A,
    B,
}

/// Account metadata recorded by the authority at creation time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountMetadata {
    /// Lower-cased username chosen at registration.
    pub username: String,

    /// Registration path.
    pub auth_option: AuthOption,

    /// Whether the primary email has been verified.
    ///
    /// Option A accounts are created with this set (there is no deliverable
    /// address to verify); Option B accounts start unverified and cannot log
    /// in until verification completes.
    pub email_verified: bool,
}

/// An account as the authority reports it.
///
/// The password hash never leaves the authority; this is the externally
/// visible shape.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    /// Opaque account identifier, immutable once created.
    pub id: String,

    /// Canonical email the authority authenticates against.
    pub primary_email: String,

    /// Registration metadata.
    pub metadata: AccountMetadata,

    /// Account creation timestamp (Unix seconds).
    pub created_at: i64,
}

/// Input to [`CredentialAuthority::create_account`](super::CredentialAuthority::create_account).
#[derive(Clone, Debug)]
pub struct NewAccount {
    /// Canonical email for the account, already lower-cased by the caller.
    pub email: String,

    /// Plaintext password; the authority hashes it and discards it.
    pub password: String,

    /// Registration metadata.
    pub metadata: AccountMetadata,
}

/// An issued session, opaque to everything but the authority.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token for authenticated calls.
    pub access_token: String,

    /// Token used to obtain a replacement session.
    pub refresh_token: String,

    /// Expiry timestamp (Unix seconds).
    pub expires_at: i64,
}

impl Session {
    /// Check whether this session has expired as of `now` (Unix seconds).
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

/// A session together with the account it authenticates.
///
/// What password verification and the current-session query return; mirrors
/// the authority embedding the account in its session payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthenticatedSession {
    pub account: Account,
    pub session: Session,
}

/// Session-change notification pushed by the authority.
///
/// Covers sign-in, external sign-out, and token refresh (a refresh arrives as
/// a fresh `SignedIn` for the same account).
#[derive(Clone, Debug)]
pub enum SessionEvent {
    /// A session became active.
    SignedIn(AuthenticatedSession),
    /// The active session ended.
    SignedOut,
}
