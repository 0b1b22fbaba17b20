//! HTTP service boundary.
//!
//! Exposes the two coordinator operations as JSON endpoints plus a health
//! probe. Error taxonomy maps onto status codes here and nowhere else:
//! validation 400, username conflict 409, credential rejection 401,
//! verification gate 403, authority failure 500 with a generic body (detail
//! stays in the server log).
//!
//! A permissive CORS layer answers cross-origin pre-flight `OPTIONS` on every
//! route.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Json as ExtractJson, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::{
    authority::{CredentialAuthority, Session},
    login::{Authenticator, LoginError},
    profile::ProfileStore,
    register::{RegisterError, RegisterRequest, Registrar},
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    registrar: Arc<Registrar>,
    authenticator: Arc<Authenticator>,
}

impl AppState {
    /// Build the coordinators over the collaborator seams.
    pub fn new(authority: Arc<dyn CredentialAuthority>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self {
            registrar: Arc::new(Registrar::new(authority.clone(), profiles.clone())),
            authenticator: Arc::new(Authenticator::new(authority, profiles)),
        }
    }
}

/// Login request body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginBody {
    /// Username or email.
    pub identifier: String,
    pub password: String,
}

/// Account summary returned by registration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub id: String,
    pub username: String,
    pub email: String,
}

/// Body of a `201` registration response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user: RegisteredUser,
    pub message: String,
    /// Present for Option A only (auto-login).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
}

/// Account summary returned by login.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginUser {
    pub id: String,
    pub username: String,
}

/// Body of a `200` login response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: LoginUser,
    pub session: Session,
}

/// Body of every error response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body of the health endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Build the service router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v0/register", post(handle_register_request))
        .route("/api/v0/login", post(handle_login_request))
        .route("/health", get(handle_health_endpoint))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Handler for POST /api/v0/register.
async fn handle_register_request(
    State(state): State<AppState>,
    ExtractJson(request): ExtractJson<RegisterRequest>,
) -> Response {
    match state.registrar.register(request).await {
        Ok(registration) => {
            let body = RegisterResponse {
                user: RegisteredUser {
                    id: registration.account.id.clone(),
                    username: registration.account.metadata.username.clone(),
                    email: registration.account.primary_email.clone(),
                },
                message: registration.message.to_string(),
                session: registration.session,
            };
            (StatusCode::CREATED, Json(body)).into_response()
        }
        Err(err) => register_error_response(err),
    }
}

/// Handler for POST /api/v0/login.
async fn handle_login_request(
    State(state): State<AppState>,
    ExtractJson(body): ExtractJson<LoginBody>,
) -> Response {
    match state
        .authenticator
        .authenticate(&body.identifier, &body.password)
        .await
    {
        Ok(login) => {
            let body = LoginResponse {
                user: LoginUser {
                    id: login.account.id.clone(),
                    username: login.username,
                },
                session: login.session,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => login_error_response(err),
    }
}

/// Handler for GET /health.
async fn handle_health_endpoint() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn register_error_response(err: RegisterError) -> Response {
    let (status, message) = match &err {
        RegisterError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
        RegisterError::UsernameTaken { .. } => (StatusCode::CONFLICT, err.to_string()),
        RegisterError::EmailTaken { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        RegisterError::Authority(err) => {
            tracing::error!("registration failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    };

    error_response(status, message)
}

fn login_error_response(err: LoginError) -> Response {
    let (status, message) = match &err {
        LoginError::InvalidCredentials => (StatusCode::UNAUTHORIZED, err.to_string()),
        LoginError::EmailNotVerified => (StatusCode::FORBIDDEN, err.to_string()),
        LoginError::Authority(err) => {
            tracing::error!("login failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    };

    error_response(status, message)
}

fn error_response(status: StatusCode, error: String) -> Response {
    (status, Json(ErrorResponse { error })).into_response()
}
