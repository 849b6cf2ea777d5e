//! Unified error handling
//!
//! Application error type and failure envelope:
//! - [`AppError`] - application error enum
//! - [`AppResponse`] - error response structure
//!
//! Success responses return their payload JSON directly; only failures
//! go through the `{code, message}` envelope, so clients can branch on
//! a stable code without unwrapping every response.
//!
//! # Error code scheme
//!
//! | Code | Meaning | HTTP |
//! |------|---------|------|
//! | E0001 | invalid request | 400 |
//! | E0002 | validation failed | 400 |
//! | E0003 | not found | 404 |
//! | E0004 | conflict | 409 |
//! | E0005 | target already complete | 400 |
//! | E0006 | department not eligible | 400 |
//! | E1001 | external service failure | 502 |
//! | E2001 | permission denied | 403 |
//! | E3001/2/3 | auth (missing / invalid / expired token) | 401 |
//! | E9001/E9002 | internal / database | 500 |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};

/// Error response envelope
///
/// ```json
/// {
///   "code": "E0003",
///   "message": "Resource not found: Employee EMP042"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// Stable machine-checkable code
    pub code: String,
    /// Human-readable message
    pub message: String,
    /// Optional structured detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Application error enum
///
/// Validation and business-rule errors terminate the request that
/// raised them. `ExternalService` is special-cased by the department
/// batch report (degraded to zeroed rows) but propagates unchanged for
/// single-employee flows.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Authentication errors (401) ==========
    #[error("Authentication required")]
    Unauthorized,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Permission denied: {0}")]
    Forbidden(String),

    // ========== Business logic errors (4xx) ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Target already complete: {0}")]
    AlreadyComplete(String),

    #[error("Department not eligible: {0}")]
    DepartmentNotEligible(String),

    #[error("Invalid request: {0}")]
    Invalid(String),

    // ========== External collaborators (502) ==========
    #[error("External service error: {0}")]
    ExternalService(String),

    // ========== System errors (5xx) ==========
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // Authentication errors (401)
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "E3001", "Please login first"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "E3002", "Invalid token"),
            AppError::TokenExpired => (StatusCode::UNAUTHORIZED, "E3003", "Token expired"),

            // Authorization errors (403)
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "E2001", msg.as_str()),

            // Not found (404)
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.as_str()),

            // Conflict (409)
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "E0004", msg.as_str()),

            // Validation (400)
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.as_str()),

            // Reason submitted for a day with no deficiency (400)
            AppError::AlreadyComplete(msg) => (StatusCode::BAD_REQUEST, "E0005", msg.as_str()),

            // No target policy for the department (400)
            AppError::DepartmentNotEligible(msg) => (StatusCode::BAD_REQUEST, "E0006", msg.as_str()),

            // Invalid request (400)
            AppError::Invalid(msg) => (StatusCode::BAD_REQUEST, "E0001", msg.as_str()),

            // External vendor failure (502)
            AppError::ExternalService(msg) => {
                warn!(target: "external", error = %msg, "External service error");
                (StatusCode::BAD_GATEWAY, "E1001", msg.as_str())
            }

            // Database errors (500)
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "E9002", "Database error")
            }

            // Internal errors (500)
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error",
                )
            }
        };

        let body = Json(AppResponse::<()> {
            code: code.to_string(),
            message: message.to_string(),
            data: None,
        });

        (status, body).into_response()
    }
}

// ========== Helper Constructors ==========

impl AppError {
    /// Unified credentials error, prevents email enumeration during login
    pub fn invalid_credentials() -> Self {
        Self::Invalid("Invalid email or password".to_string())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error is a vendor failure the batch report may
    /// degrade instead of propagating.
    pub fn is_external(&self) -> bool {
        matches!(self, AppError::ExternalService(_))
    }
}

/// Result alias used throughout handlers and services
pub type AppResult<T> = Result<T, AppError>;
