//! Profile store abstraction.
//!
//! Profiles are the username directory: one record per account, keyed both by
//! account id and by lower-cased username. The store is an external
//! collaborator in production; [`InMemoryProfiles`] is the development and
//! test backend.
//!
//! Profiles materialize as a side effect of account creation on the authority
//! side, so readers must tolerate a short window where an account exists but
//! its profile does not.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::authority::AuthOption;

pub mod errors;
pub mod in_memory;

pub use errors::ProfileError;
pub use in_memory::InMemoryProfiles;

/// Directory record for one account.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    /// Account id this profile belongs to (one-to-one).
    pub id: String,

    /// Lower-cased username, globally unique.
    pub username: String,

    /// Primary email, if the account has one worth displaying.
    ///
    /// May be absent for username-only accounts; resolution falls back to the
    /// synthesized placeholder address.
    pub email: Option<String>,

    /// Which registration path created the account.
    pub auth_option: AuthOption,
}

/// Durable store of [`Profile`] records.
///
/// The store owns the username-uniqueness invariant: [`ProfileStore::insert`]
/// is an atomic insert-if-absent on the lower-cased username, and its conflict
/// error is the authoritative "username taken" signal. Lookups that race a
/// concurrent insert may see either state; the insert itself never loses the
/// race silently.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Look up a profile by lower-cased username.
    async fn get_by_username(&self, username: &str) -> Result<Option<Profile>, ProfileError>;

    /// Look up a profile by account id.
    async fn get_by_id(&self, account_id: &str) -> Result<Option<Profile>, ProfileError>;

    /// Insert a profile, claiming its username atomically.
    ///
    /// Fails with [`ProfileError::UsernameExists`] when the username is
    /// already claimed, leaving the store unchanged.
    async fn insert(&self, profile: Profile) -> Result<(), ProfileError>;

    /// Remove a profile by account id, releasing its username.
    ///
    /// Used by the authority to roll back when account creation fails after
    /// the username claim. Removing an absent profile is a no-op.
    async fn remove(&self, account_id: &str) -> Result<(), ProfileError>;
}
