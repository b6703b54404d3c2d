//! Login, logout and the session guard for admin routes.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use super::response::ApiError;
use super::AppState;
use crate::models::Identity;

/// The authenticated session, added to request extensions by [`require_session`].
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub token: String,
    pub identity: Identity,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: Identity,
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    match state
        .auth
        .verify_credentials(&request.username, &request.password)
        .await
    {
        Ok(identity) => {
            tracing::info!("Admin '{}' logged in", identity.name);
            let token = state.sessions.issue(identity.clone());
            Ok(Json(LoginResponse {
                token,
                user: identity,
            }))
        }
        Err(err) if err.is_auth_failure() => {
            tracing::warn!("Rejected login attempt");
            Err(ApiError::unauthorized(
                "invalid_credentials",
                "Invalid credentials.",
            ))
        }
        Err(err) => {
            tracing::error!("Login failed: {}", err);
            Err(ApiError::internal())
        }
    }
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> StatusCode {
    state.sessions.revoke(&session.token);
    tracing::info!("Admin '{}' logged out", session.identity.name);
    StatusCode::NO_CONTENT
}

pub async fn me(Extension(session): Extension<AuthSession>) -> Json<Identity> {
    Json(session.identity)
}

/// Rejects requests without a live bearer session.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(h) if h.starts_with("Bearer ") => h[7..].to_string(),
        Some(_) => {
            return ApiError::unauthorized(
                "invalid_auth",
                "Authorization header must use Bearer scheme",
            )
            .into_response();
        }
        None => {
            return ApiError::unauthorized("missing_auth", "Authorization header required")
                .into_response();
        }
    };

    match state.sessions.resolve(&token) {
        Some(identity) => {
            request
                .extensions_mut()
                .insert(AuthSession { token, identity });
            next.run(request).await
        }
        None => ApiError::unauthorized("invalid_session", "Session expired or unknown")
            .into_response(),
    }
}
