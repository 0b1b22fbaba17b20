//! Tests for the registration coordinator.

use std::sync::{Arc, atomic::Ordering};

use gatehouse::{
    Registrar,
    authority::AuthOption,
    profile::ProfileStore,
    register::RegisterError,
    validation::ValidationError,
};

use crate::helpers::{InstrumentedAuthority, coordinators, option_a, option_b, test_backends};

#[tokio::test]
async fn validation_failures_never_reach_the_authority() {
    let (inner, profiles) = test_backends();
    let authority = Arc::new(InstrumentedAuthority::new(inner));
    let registrar = Registrar::new(authority.clone(), profiles);

    // Too short, bad characters, short password, malformed email.
    let cases = vec![
        option_a("ab", "abcdef"),
        option_a("has space", "abcdef"),
        option_a("validname", "abc"),
        option_b("validname", "not-an-email", "abcdef"),
    ];

    for request in cases {
        let err = registrar.register(request).await.unwrap_err();
        assert!(matches!(err, RegisterError::Validation(_)), "got {err:?}");
    }

    assert_eq!(authority.authority_calls(), 0);
}

#[tokio::test]
async fn validation_reports_the_offending_field() {
    let (authority, profiles) = test_backends();
    let (registrar, _) = coordinators(authority, profiles);

    let err = registrar.register(option_a("ab", "abcdef")).await.unwrap_err();
    assert!(matches!(
        err,
        RegisterError::Validation(ValidationError::UsernameTooShort { length: 2, minimum: 3 })
    ));

    let err = registrar
        .register(option_a("dot.name", "abcdef"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RegisterError::Validation(ValidationError::UsernameInvalidFormat)
    ));

    let err = registrar
        .register(option_a("validname", "short"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RegisterError::Validation(ValidationError::PasswordTooShort { minimum: 6 })
    ));
}

#[tokio::test]
async fn option_a_registers_with_placeholder_email_and_session() {
    let (authority, profiles) = test_backends();
    let (registrar, _) = coordinators(authority, profiles.clone());

    let registration = registrar.register(option_a("Zed", "abcdef")).await.unwrap();

    // Username is stored case-folded; the placeholder address derives from it.
    assert_eq!(registration.account.metadata.username, "zed");
    assert_eq!(registration.account.primary_email, "zed@gatehouse.invalid");
    assert_eq!(registration.account.metadata.auth_option, AuthOption::A);

    // Pre-verified: there is no deliverable address to confirm.
    assert!(registration.account.metadata.email_verified);

    // Auto-login: the session is usable in the same call.
    let session = registration.session.expect("Option A must issue a session");
    assert!(!session.access_token.is_empty());
}

#[tokio::test]
async fn option_b_registers_unverified_without_session() {
    let (authority, profiles) = test_backends();
    let (registrar, _) = coordinators(authority, profiles.clone());

    let registration = registrar
        .register(option_b("zed", "Z@Example.COM", "abcdef"))
        .await
        .unwrap();

    assert_eq!(registration.account.primary_email, "z@example.com");
    assert_eq!(registration.account.metadata.auth_option, AuthOption::B);
    assert!(!registration.account.metadata.email_verified);
    assert!(registration.session.is_none());
    assert!(registration.message.contains("verify"));

    // The profile materialized with the real address.
    let profile = profiles.get_by_username("zed").await.unwrap().unwrap();
    assert_eq!(profile.email.as_deref(), Some("z@example.com"));
}

#[tokio::test]
async fn duplicate_username_is_taken_case_insensitively() {
    let (authority, profiles) = test_backends();
    let (registrar, _) = coordinators(authority, profiles);

    registrar.register(option_a("alice", "abcdef")).await.unwrap();

    for username in ["alice", "Alice", "ALICE"] {
        let err = registrar
            .register(option_b(username, "other@example.com", "abcdef"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, RegisterError::UsernameTaken { .. }),
            "{username} got {err:?}"
        );
    }
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let (authority, profiles) = test_backends();
    let (registrar, _) = coordinators(authority, profiles);

    registrar
        .register(option_b("first", "shared@example.com", "abcdef"))
        .await
        .unwrap();

    let err = registrar
        .register(option_b("second", "shared@example.com", "abcdef"))
        .await
        .unwrap_err();
    assert!(matches!(err, RegisterError::EmailTaken { .. }));
}

#[tokio::test]
async fn concurrent_registrations_settle_on_one_winner() {
    let (authority, profiles) = test_backends();

    // Two registrars racing the same username: both pass the fast-path
    // pre-check, the store-level claim decides.
    let (registrar_a, _) = coordinators(authority.clone(), profiles.clone());
    let (registrar_b, _) = coordinators(authority, profiles);

    let (left, right) = tokio::join!(
        registrar_a.register(option_b("zed", "left@example.com", "abcdef")),
        registrar_b.register(option_b("zed", "right@example.com", "abcdef")),
    );

    let outcomes = [left, right];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(outcomes.iter().any(|r| matches!(
        r,
        Err(RegisterError::UsernameTaken { .. })
    )));
}

#[tokio::test]
async fn instrumented_double_counts_successful_creation() {
    let (inner, profiles) = test_backends();
    let authority = Arc::new(InstrumentedAuthority::new(inner));
    let registrar = Registrar::new(authority.clone(), profiles);

    registrar.register(option_a("bob", "abcdef")).await.unwrap();
    assert_eq!(authority.create_calls.load(Ordering::SeqCst), 1);
}
