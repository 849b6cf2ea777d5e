//! Authentication Handlers
//!
//! Login and current-user lookup.

use std::time::Duration;

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::auth::{CurrentUser, verify_password};
use crate::core::ServerState;
use crate::db::repository::employee;
use crate::utils::{AppError, AppResult};

use shared::models::Employee;

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: Employee,
}

/// Login handler
///
/// Authenticates employee credentials and returns a JWT token.
/// The error message never reveals whether the email exists.
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let found = employee::find_by_email(&state.db.pool, &req.email).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    let emp = match found {
        Some(e) => {
            if !e.is_active() {
                return Err(AppError::Forbidden(
                    "Account has been disabled".to_string(),
                ));
            }

            if !verify_password(&req.password, &e.password_hash) {
                tracing::warn!(target: "security", email = %req.email, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }

            e
        }
        None => {
            tracing::warn!(target: "security", email = %req.email, "Login failed - unknown email");
            return Err(AppError::invalid_credentials());
        }
    };

    let token = state
        .jwt
        .generate_token(&emp.emp_id, &emp.name, &emp.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(
        emp_id = %emp.emp_id,
        role = %emp.role,
        "Employee logged in"
    );

    Ok(Json(LoginResponse { token, user: emp }))
}

/// Get the current employee's profile
pub async fn me(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Employee>> {
    let emp = employee::find_by_emp_id(&state.db.pool, &user.emp_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Employee {} not found", user.emp_id)))?;
    Ok(Json(emp))
}
