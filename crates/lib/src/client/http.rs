//! HTTP client for the service endpoints.
//!
//! Thin reqwest wrapper over the two coordinator operations. Error bodies
//! are decoded into their message; an undecodable body falls back to a
//! generic message so a broken proxy cannot leak raw internals.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::ClientError;
use crate::{
    register::RegisterRequest,
    service::{ErrorResponse, LoginBody, LoginResponse, RegisterResponse},
};

/// Client for the service boundary.
#[derive(Clone)]
pub struct ServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl ServiceClient {
    /// Create a client for a service at `base_url` (e.g. `http://127.0.0.1:3000`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Call `POST /api/v0/register`.
    pub async fn register(
        &self,
        request: &RegisterRequest,
    ) -> Result<RegisterResponse, ClientError> {
        self.post_json("/api/v0/register", request).await
    }

    /// Call `POST /api/v0/login`.
    pub async fn login(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<LoginResponse, ClientError> {
        let body = LoginBody {
            identifier: identifier.to_string(),
            password: password.to_string(),
        };
        self.post_json("/api/v0/login", &body).await
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: serde::Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let response = self.http.post(&url).json(body).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        Err(ClientError::Rejected {
            status: status.as_u16(),
            message: error_message(status, response).await,
        })
    }
}

/// Extract the error message from a failed response.
async fn error_message(status: StatusCode, response: reqwest::Response) -> String {
    match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => format!("Request failed with status {status}"),
    }
}
