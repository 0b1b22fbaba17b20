//! Client-side session synchronizer.
//!
//! Keeps a reactive view of the authority's session state: a small state
//! machine (`Initializing` → `Anonymous` / `Authenticated`) fed by the
//! authority's session-change stream, exposed through a watch channel.
//!
//! Registration and login go over the network to the service endpoints; on
//! success the returned session is explicitly adopted into the authority's
//! local session storage, since coordinator responses are not pushed through
//! the notification stream.

use std::sync::Arc;

use tokio::{
    sync::{broadcast, oneshot, watch},
    task::JoinHandle,
};

use crate::{
    authority::{AuthenticatedSession, CredentialAuthority, SessionEvent},
    profile::ProfileStore,
    register::RegisterRequest,
    service::{LoginResponse, RegisterResponse},
};

pub mod errors;
pub mod http;

pub use errors::ClientError;
pub use http::ServiceClient;

/// Reactive session state observed by the UI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Startup: the persisted session has not been resolved yet.
    Initializing,
    /// No live session.
    Anonymous,
    /// A session is installed.
    Authenticated {
        account_id: String,
        /// Display username; absent while the profile has not materialized.
        username: Option<String>,
    },
}

impl SessionState {
    /// Check whether startup resolution is still pending.
    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Initializing)
    }

    /// Check whether a session is installed.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated { .. })
    }
}

/// Client-side session synchronizer.
///
/// One live instance per process. [`SessionSync::shutdown`] releases the
/// notification subscription deterministically; nothing is left running.
pub struct SessionSync {
    authority: Arc<dyn CredentialAuthority>,
    service: ServiceClient,
    state_tx: Arc<watch::Sender<SessionState>>,
    state_rx: watch::Receiver<SessionState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl SessionSync {
    /// Start the synchronizer.
    ///
    /// Subscribes to the authority's session-change stream, then resolves any
    /// currently persisted session and leaves `Initializing`. Subscribing
    /// first means a change racing startup is never missed, only re-derived.
    pub async fn start(
        authority: Arc<dyn CredentialAuthority>,
        profiles: Arc<dyn ProfileStore>,
        service: ServiceClient,
    ) -> crate::Result<Self> {
        let (state_tx, state_rx) = watch::channel(SessionState::Initializing);
        let state_tx = Arc::new(state_tx);

        let events = authority.subscribe_session_changes();

        let initial = authority.current_session().await?;
        let _ = state_tx.send(derive_state(&profiles, initial).await);

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run_event_loop(
            authority.clone(),
            profiles,
            state_tx.clone(),
            events,
            shutdown_rx,
        ));

        Ok(Self {
            authority,
            service,
            state_tx,
            state_rx,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state_rx.borrow().clone()
    }

    /// Subscribe to session state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_rx.clone()
    }

    /// Register an account through the service.
    ///
    /// When the response carries a session (Option A auto-login) it is
    /// adopted into the authority's local session storage, which in turn
    /// drives the state machine to `Authenticated`.
    pub async fn register(
        &self,
        request: RegisterRequest,
    ) -> Result<RegisterResponse, ClientError> {
        let response = self.service.register(&request).await?;

        if let Some(session) = response.session.clone() {
            self.authority
                .adopt_session(session)
                .await
                .map_err(ClientError::Authority)?;
        }

        Ok(response)
    }

    /// Log in through the service and adopt the issued session.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<LoginResponse, ClientError> {
        let response = self.service.login(identifier, password).await?;

        self.authority
            .adopt_session(response.session.clone())
            .await
            .map_err(ClientError::Authority)?;

        Ok(response)
    }

    /// Log out.
    ///
    /// The local state goes `Anonymous` no matter what the invalidation call
    /// returns; a dead network must not leave a ghost session on screen.
    pub async fn logout(&self) {
        if let Err(err) = self.authority.invalidate_session().await {
            tracing::warn!("session invalidation failed: {err}");
        }

        let _ = self.state_tx.send(SessionState::Anonymous);
    }

    /// Tear down the synchronizer, releasing the notification subscription.
    pub async fn shutdown(mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for SessionSync {
    fn drop(&mut self) {
        // Dropping without shutdown() still stops the event loop.
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
    }
}

/// Consume session-change events until shutdown or stream close.
async fn run_event_loop(
    authority: Arc<dyn CredentialAuthority>,
    profiles: Arc<dyn ProfileStore>,
    state_tx: Arc<watch::Sender<SessionState>>,
    mut events: broadcast::Receiver<SessionEvent>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = &mut shutdown_rx => {
                tracing::debug!("session synchronizer shutting down");
                break;
            }
            event = events.recv() => match event {
                Ok(SessionEvent::SignedIn(authenticated)) => {
                    let state = derive_state(&profiles, Some(authenticated)).await;
                    let _ = state_tx.send(state);
                }
                Ok(SessionEvent::SignedOut) => {
                    let _ = state_tx.send(SessionState::Anonymous);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Missed events are recovered by re-reading the source of
                    // truth rather than replaying.
                    tracing::warn!(skipped, "session events lagged, re-deriving state");
                    let current = authority.current_session().await.ok().flatten();
                    let state = derive_state(&profiles, current).await;
                    let _ = state_tx.send(state);
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::debug!("session event stream closed");
                    break;
                }
            }
        }
    }
}

/// Map a session (or its absence) to the observable state.
async fn derive_state(
    profiles: &Arc<dyn ProfileStore>,
    current: Option<AuthenticatedSession>,
) -> SessionState {
    match current {
        None => SessionState::Anonymous,
        Some(authenticated) => {
            let username = match profiles.get_by_id(&authenticated.account.id).await {
                Ok(Some(profile)) => Some(profile.username),
                Ok(None) => None,
                Err(err) => {
                    tracing::warn!(
                        account_id = %authenticated.account.id,
                        "profile lookup failed while deriving session state: {err}"
                    );
                    None
                }
            };

            SessionState::Authenticated {
                account_id: authenticated.account.id,
                username,
            }
        }
    }
}
