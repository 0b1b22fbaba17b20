//! Serve command - runs the Gatehouse identity service.

use std::sync::Arc;

use tokio::signal::unix::{SignalKind, signal};
use tracing_subscriber::EnvFilter;

use gatehouse::{
    InMemoryAuthority, InMemoryProfiles,
    authority::CredentialAuthority,
    profile::ProfileStore,
    service::{AppState, create_router},
};

use crate::cli::ServeArgs;

/// Run the Gatehouse server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("gatehouse=info".parse().unwrap()),
        )
        .init();

    // In-memory backends stand in for the external credential authority and
    // profile directory. State is ephemeral and lost on restart.
    let profiles: Arc<dyn ProfileStore> = Arc::new(InMemoryProfiles::new());
    let authority: Arc<dyn CredentialAuthority> =
        Arc::new(InMemoryAuthority::new(profiles.clone()));

    let state = AppState::new(authority, profiles);
    let app = create_router(state);

    // Bind server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    // Print startup message
    println!(
        "Gatehouse server starting on http://localhost:{}",
        local_addr.port()
    );
    println!();
    println!("Available endpoints:");
    println!("  POST /api/v0/register - Account registration (username-only or username+email)");
    println!("  POST /api/v0/login    - Login with username or email");
    println!("  GET  /health          - Health probe");
    println!();
    println!("Press Ctrl+C to shutdown");

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to set up SIGTERM handler");
            let mut sigint =
                signal(SignalKind::interrupt()).expect("failed to set up SIGINT handler");

            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
                _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
            }
        })
        .await?;

    println!("Server shut down");
    Ok(())
}
