//! JSON response shapes shared by the handlers.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::db::{ReconcileReport, StoreError};

/// Error body for reads and authentication failures.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// A failed request, rendered as `{error, message}` with a matching status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(status: StatusCode, error: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                error,
                message: message.into(),
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn unauthorized(error: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, error, message)
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal",
            "Something went wrong. Please try again later.",
        )
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ApiError::not_found(format!("{} not found", what)),
            other => {
                tracing::error!("Read failed: {}", other);
                ApiError::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Outcome of a save, as the editing client expects it.
#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReconcileReport>,
}

/// Turns a repository result into the save response.
///
/// Failures are logged here with the underlying error. Only validation and
/// lookup failures echo details back to the client.
pub fn saved(what: &str, result: Result<ReconcileReport, StoreError>) -> Response {
    match result {
        Ok(report) => {
            tracing::info!(
                "Saved {}: {} updated, {} inserted, {} deleted, {} unchanged",
                what,
                report.updated.len(),
                report.inserted.len(),
                report.deleted.len(),
                report.unchanged.len()
            );
            let body = SaveResponse {
                success: true,
                message: format!("Saved {}.", what),
                code: None,
                report: Some(report),
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => {
            tracing::error!("Failed to save {}: {}", what, err);
            let (status, code, message) = match &err {
                StoreError::Validation(detail) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "validation_failed",
                    format!("Invalid {}: {}", what, detail),
                ),
                StoreError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    format!("Failed to save {}.", what),
                ),
            };
            let body = SaveResponse {
                success: false,
                message,
                code: Some(code),
                report: None,
            };
            (status, Json(body)).into_response()
        }
    }
}
