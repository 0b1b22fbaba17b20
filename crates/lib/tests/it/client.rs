//! Tests for the client-side session synchronizer.

use std::{
    sync::{Arc, atomic::Ordering},
    time::Duration,
};

use gatehouse::{
    SessionSync,
    authority::CredentialAuthority,
    client::{ServiceClient, SessionState},
};

use crate::helpers::{InstrumentedAuthority, option_a, option_b, spawn_service, test_backends};

/// Wait until the watch channel reports a state matching the predicate.
async fn wait_for_state(
    sync: &SessionSync,
    predicate: impl FnMut(&SessionState) -> bool,
) -> SessionState {
    let mut rx = sync.subscribe();
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(predicate))
        .await
        .expect("timed out waiting for session state")
        .expect("state channel closed")
        .clone()
}

#[tokio::test]
async fn startup_with_no_session_resolves_to_anonymous() {
    let (authority, profiles) = test_backends();
    let base_url = spawn_service(authority.clone(), profiles.clone()).await;

    let sync = SessionSync::start(authority, profiles, ServiceClient::new(base_url))
        .await
        .unwrap();

    // Initializing must already be over by the time start() returns.
    assert_eq!(sync.state(), SessionState::Anonymous);
    assert!(!sync.state().is_loading());

    sync.shutdown().await;
}

#[tokio::test]
async fn option_a_registration_adopts_the_session() {
    let (authority, profiles) = test_backends();
    let base_url = spawn_service(authority.clone(), profiles.clone()).await;

    let sync = SessionSync::start(authority.clone(), profiles, ServiceClient::new(base_url))
        .await
        .unwrap();

    let response = sync.register(option_a("zed", "abcdef")).await.unwrap();
    assert!(response.session.is_some());

    let state = wait_for_state(&sync, |s| s.is_authenticated()).await;
    assert_eq!(
        state,
        SessionState::Authenticated {
            account_id: response.user.id.clone(),
            username: Some("zed".to_string()),
        }
    );

    // Adoption installed the session at the authority.
    let current = authority.current_session().await.unwrap().unwrap();
    assert_eq!(current.account.id, response.user.id);

    sync.shutdown().await;
}

#[tokio::test]
async fn option_b_registration_stays_anonymous() {
    let (authority, profiles) = test_backends();
    let base_url = spawn_service(authority.clone(), profiles.clone()).await;

    let sync = SessionSync::start(authority.clone(), profiles, ServiceClient::new(base_url))
        .await
        .unwrap();

    let response = sync
        .register(option_b("zed", "z@example.com", "abcdef"))
        .await
        .unwrap();

    // No session to adopt until the email is verified.
    assert!(response.session.is_none());
    assert_eq!(sync.state(), SessionState::Anonymous);
    assert!(authority.current_session().await.unwrap().is_none());

    sync.shutdown().await;
}

#[tokio::test]
async fn login_then_logout_round_trip() {
    let (authority, profiles) = test_backends();
    let base_url = spawn_service(authority.clone(), profiles.clone()).await;

    let sync = SessionSync::start(authority.clone(), profiles, ServiceClient::new(base_url))
        .await
        .unwrap();

    sync.register(option_a("erin", "abcdef")).await.unwrap();
    wait_for_state(&sync, |s| s.is_authenticated()).await;

    sync.logout().await;
    wait_for_state(&sync, |s| *s == SessionState::Anonymous).await;
    assert!(authority.current_session().await.unwrap().is_none());

    // Logging back in by username re-authenticates.
    sync.login("erin", "abcdef").await.unwrap();
    let state = wait_for_state(&sync, |s| s.is_authenticated()).await;
    assert!(matches!(
        state,
        SessionState::Authenticated { username: Some(name), .. } if name == "erin"
    ));

    sync.shutdown().await;
}

#[tokio::test]
async fn logout_goes_anonymous_even_when_invalidation_fails() {
    let (inner, profiles) = test_backends();
    let authority = Arc::new(InstrumentedAuthority::new(inner));
    let base_url = spawn_service(authority.clone(), profiles.clone()).await;

    let sync = SessionSync::start(
        authority.clone(),
        profiles,
        ServiceClient::new(base_url),
    )
    .await
    .unwrap();

    sync.register(option_a("frank", "abcdef")).await.unwrap();
    wait_for_state(&sync, |s| s.is_authenticated()).await;

    // The network dies; the screen must not keep a ghost session.
    authority.fail_invalidate.store(true, Ordering::SeqCst);
    sync.logout().await;

    wait_for_state(&sync, |s| *s == SessionState::Anonymous).await;

    sync.shutdown().await;
}

#[tokio::test]
async fn external_sign_out_is_observed() {
    let (authority, profiles) = test_backends();
    let base_url = spawn_service(authority.clone(), profiles.clone()).await;

    let sync = SessionSync::start(authority.clone(), profiles, ServiceClient::new(base_url))
        .await
        .unwrap();

    sync.register(option_a("gail", "abcdef")).await.unwrap();
    wait_for_state(&sync, |s| s.is_authenticated()).await;

    // Sign-out from another context arrives through the notification stream.
    authority.invalidate_session().await.unwrap();
    wait_for_state(&sync, |s| *s == SessionState::Anonymous).await;

    sync.shutdown().await;
}

#[tokio::test]
async fn startup_adopts_a_persisted_session() {
    let (authority, profiles) = test_backends();
    let base_url = spawn_service(authority.clone(), profiles.clone()).await;

    // A session installed before the synchronizer starts (e.g. persisted
    // from a previous run) must be picked up during initialization.
    let registrar = gatehouse::Registrar::new(authority.clone(), profiles.clone());
    let registration = registrar.register(option_a("hana", "abcdef")).await.unwrap();
    authority
        .adopt_session(registration.session.unwrap())
        .await
        .unwrap();

    let sync = SessionSync::start(authority, profiles, ServiceClient::new(base_url))
        .await
        .unwrap();

    let state = wait_for_state(&sync, |s| s.is_authenticated()).await;
    assert!(matches!(
        state,
        SessionState::Authenticated { username: Some(name), .. } if name == "hana"
    ));

    sync.shutdown().await;
}

#[tokio::test]
async fn shutdown_releases_the_subscription() {
    let (authority, profiles) = test_backends();
    let base_url = spawn_service(authority.clone(), profiles.clone()).await;

    assert_eq!(authority.subscriber_count(), 0);

    let sync = SessionSync::start(authority.clone(), profiles, ServiceClient::new(base_url))
        .await
        .unwrap();
    assert_eq!(authority.subscriber_count(), 1);

    sync.shutdown().await;
    assert_eq!(authority.subscriber_count(), 0);
}
