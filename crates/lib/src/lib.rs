//!
//! Gatehouse: identifier resolution and session issuance in front of an
//! external credential authority.
//!
//! ## Core Concepts
//!
//! The library is built around a small set of components:
//!
//! * **Validation (`validation`)**: pure shape checks for usernames, passwords and emails; no I/O.
//! * **Identifier Resolver (`resolver::IdentifierResolver`)**: maps a login identifier (username or email) to the canonical email to authenticate with.
//! * **Registrar (`register::Registrar`)**: orchestrates the two registration modes, Option A (username only, placeholder email, auto-login) and Option B (real email, verification required).
//! * **Authenticator (`login::Authenticator`)**: orchestrates login and folds anything enumeration-revealing into one generic credential failure.
//! * **Session Synchronizer (`client::SessionSync`)**: client-side reactive session state over a watch channel, fed by the authority's change stream.
//! * **Collaborator seams (`authority::CredentialAuthority`, `profile::ProfileStore`)**: the external credential authority and profile directory, with in-memory backends for development and tests.
//! * **Service (`service`)**: the axum HTTP boundary exposing registration and login.

pub mod authority;
pub mod client;
pub mod constants;
pub mod login;
pub mod profile;
pub mod register;
pub mod resolver;
pub mod service;
pub mod validation;

pub use authority::{CredentialAuthority, InMemoryAuthority};
pub use client::SessionSync;
pub use login::Authenticator;
pub use profile::{InMemoryProfiles, ProfileStore};
pub use register::Registrar;
pub use resolver::IdentifierResolver;

/// Result type used throughout the Gatehouse library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Gatehouse library.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Structured validation errors from the validation module
    #[error(transparent)]
    Validation(validation::ValidationError),

    /// Structured credential authority errors from the authority module
    #[error(transparent)]
    Authority(authority::AuthorityError),

    /// Structured profile store errors from the profile module
    #[error(transparent)]
    Profile(profile::ProfileError),

    /// Structured resolution errors from the resolver module
    #[error(transparent)]
    Resolver(resolver::ResolverError),

    /// Structured registration errors from the register module
    #[error(transparent)]
    Register(register::RegisterError),

    /// Structured login errors from the login module
    #[error(transparent)]
    Login(login::LoginError),

    /// Structured client errors from the client module
    #[error(transparent)]
    Client(client::ClientError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::Authority(_) => "authority",
            Error::Profile(_) => "profile",
            Error::Resolver(_) => "resolver",
            Error::Register(_) => "register",
            Error::Login(_) => "login",
            Error::Client(_) => "client",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Resolver(err) => err.is_not_found(),
            Error::Authority(err) => {
                matches!(err, authority::AuthorityError::AccountNotFound { .. })
            }
            _ => false,
        }
    }

    /// Check if this error indicates a conflict (already exists).
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Authority(err) => err.is_conflict(),
            Error::Profile(err) => err.is_conflict(),
            Error::Register(err) => err.is_conflict(),
            _ => false,
        }
    }

    /// Check if this error is a credential rejection.
    pub fn is_authentication_error(&self) -> bool {
        match self {
            Error::Authority(err) => err.is_credential_rejection(),
            Error::Login(err) => err.is_credential_rejection(),
            Error::Client(err) => err.is_credential_rejection(),
            _ => false,
        }
    }

    /// Check if this error is recoverable by the caller correcting input.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Validation(_) => true,
            Error::Register(register::RegisterError::Validation(_)) => true,
            _ => false,
        }
    }
}
