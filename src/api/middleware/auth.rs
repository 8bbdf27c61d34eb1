//! Bearer token authentication middleware.
//!
//! Extracts `Authorization: Bearer <token>`, asks the external
//! credential-check service to resolve it to a subject id, and injects
//! `Subject` into request extensions for downstream handlers. Token
//! issuance and storage live entirely in that external service.

use async_trait::async_trait;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use thiserror::Error;

use crate::api::error::ApiError;
use crate::api::types::AppState;

/// The authenticated caller, as resolved by the credential service.
#[derive(Debug, Clone)]
pub struct Subject {
    pub subject_id: String,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Token rejected")]
    InvalidToken,
    #[error("Credential service unreachable: {0}")]
    ServiceUnavailable(String),
}

/// Credential-check collaborator: verify an identity token, get back the
/// subject it belongs to.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Subject, AuthError>;
}

/// Production verifier: calls the credential service's `/api/auth/me`
/// with the caller's bearer token.
pub struct HttpIdentityVerifier {
    base_url: String,
    client: reqwest::Client,
}

impl HttpIdentityVerifier {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("reqwest client with static configuration builds");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }
}

#[derive(Deserialize)]
struct MeResponse {
    id: Option<serde_json::Value>,
    username: Option<String>,
}

#[async_trait]
impl IdentityVerifier for HttpIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<Subject, AuthError> {
        let url = format!("{}/api/auth/me", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::ServiceUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::InvalidToken);
        }

        let me: MeResponse = response
            .json()
            .await
            .map_err(|e| AuthError::ServiceUnavailable(format!("unreadable response: {e}")))?;

        let subject_id = me
            .id
            .map(|v| v.to_string().trim_matches('"').to_string())
            .or(me.username)
            .ok_or(AuthError::InvalidToken)?;

        Ok(Subject { subject_id })
    }
}

/// Verifier accepting one fixed token. For tests and local development.
pub struct StaticTokenVerifier {
    token: String,
    subject_id: String,
}

impl StaticTokenVerifier {
    pub fn new(token: &str, subject_id: &str) -> Self {
        Self {
            token: token.to_string(),
            subject_id: subject_id.to_string(),
        }
    }
}

#[async_trait]
impl IdentityVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Subject, AuthError> {
        if token == self.token {
            Ok(Subject {
                subject_id: self.subject_id.clone(),
            })
        } else {
            Err(AuthError::InvalidToken)
        }
    }
}

/// Require a valid bearer token on the request.
///
/// On success the resolved `Subject` is injected into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    match require_auth_inner(state, req, next).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn require_auth_inner(
    state: AppState,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    let subject = match state.verifier.verify(&token).await {
        Ok(subject) => subject,
        Err(AuthError::InvalidToken) => return Err(ApiError::Unauthorized),
        Err(AuthError::ServiceUnavailable(detail)) => {
            tracing::warn!(detail, "Credential service unreachable");
            return Err(ApiError::AuthServiceUnavailable);
        }
    };

    tracing::debug!(subject_id = %subject.subject_id, "Request authenticated");
    req.extensions_mut().insert(subject);

    Ok(next.run(req).await)
}
