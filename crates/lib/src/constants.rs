//! Constants used throughout the Gatehouse library.
//!
//! This module provides central definitions for the registration and login
//! invariants, especially the reserved placeholder domain used for
//! username-only accounts.

/// Reserved domain for synthesized placeholder emails.
///
/// Accounts registered without a real address (Option A) get
/// `<username>@PLACEHOLDER_EMAIL_DOMAIN` as their primary email. The `.invalid`
/// TLD is reserved (RFC 2606), so these addresses are structurally
/// non-deliverable and are never treated as verifiable.
pub const PLACEHOLDER_EMAIL_DOMAIN: &str = "gatehouse.invalid";

/// Minimum username length accepted at registration.
pub const MIN_USERNAME_LENGTH: usize = 3;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Lifetime of an issued session, in seconds.
pub const SESSION_TTL_SECS: i64 = 3600;

/// The single externally-visible message for any credential failure.
///
/// Unknown identifier and wrong password must be indistinguishable to the
/// caller, so every credential rejection carries exactly this text.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid identifier or password";

/// Synthesize the placeholder email for a username-only account.
///
/// The username is expected to already be lower-cased; the result is the
/// canonical primary email stored for Option A accounts.
pub fn placeholder_email(username: &str) -> String {
    format!("{username}@{PLACEHOLDER_EMAIL_DOMAIN}")
}
