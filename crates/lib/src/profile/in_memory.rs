//! In-memory profile store.
//!
//! The default backend for development and tests. All records live in a
//! single map guarded by an async `RwLock`; the write lock makes
//! [`ProfileStore::insert`] the atomic insert-if-absent primitive the
//! username-uniqueness invariant relies on.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Profile, ProfileError, ProfileStore};

/// In-memory implementation of [`ProfileStore`].
#[derive(Default)]
pub struct InMemoryProfiles {
    /// Profiles keyed by lower-cased username.
    by_username: RwLock<HashMap<String, Profile>>,
}

impl InMemoryProfiles {
    /// Create a new empty profile store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored profiles.
    pub async fn len(&self) -> usize {
        self.by_username.read().await.len()
    }

    /// Check whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.by_username.read().await.is_empty()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfiles {
    async fn get_by_username(&self, username: &str) -> Result<Option<Profile>, ProfileError> {
        let profiles = self.by_username.read().await;
        Ok(profiles.get(username).cloned())
    }

    async fn get_by_id(&self, account_id: &str) -> Result<Option<Profile>, ProfileError> {
        let profiles = self.by_username.read().await;
        Ok(profiles.values().find(|p| p.id == account_id).cloned())
    }

    async fn insert(&self, profile: Profile) -> Result<(), ProfileError> {
        let mut profiles = self.by_username.write().await;

        // Check and insert under one write lock: this is the uniqueness
        // constraint, not a pre-check.
        if profiles.contains_key(&profile.username) {
            return Err(ProfileError::UsernameExists {
                username: profile.username,
            });
        }

        profiles.insert(profile.username.clone(), profile);
        Ok(())
    }

    async fn remove(&self, account_id: &str) -> Result<(), ProfileError> {
        let mut profiles = self.by_username.write().await;
        profiles.retain(|_, p| p.id != account_id);
        Ok(())
    }
}
