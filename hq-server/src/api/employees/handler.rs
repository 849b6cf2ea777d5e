//! Employee API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::hash_password;
use crate::core::ServerState;
use crate::db::repository::{RepoError, employee};
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_PASSWORD_LEN, MAX_SHORT_TEXT_LEN, validate_required_text,
};
use crate::utils::{AppError, AppResult};

use shared::models::{Employee, EmployeeCreate, EmployeeStatusUpdate, EmployeeUpdate};

/// Turn a unique-key violation into a clean conflict answer without
/// echoing the SQLite constraint text.
fn map_duplicate(err: RepoError) -> AppError {
    match err {
        RepoError::Duplicate(_) => AppError::conflict("Employee ID or email already in use"),
        other => other.into(),
    }
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 8 {
        return Err(AppError::validation(
            "password must be at least 8 characters",
        ));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password is too long (max {MAX_PASSWORD_LEN} characters)"
        )));
    }
    Ok(())
}

/// List all employees
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Employee>>> {
    let employees = employee::find_all(&state.db.pool).await?;
    Ok(Json(employees))
}

/// Get employee by business key
pub async fn get_by_emp_id(
    State(state): State<ServerState>,
    Path(emp_id): Path<String>,
) -> AppResult<Json<Employee>> {
    let emp = employee::find_by_emp_id(&state.db.pool, &emp_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Employee {} not found", emp_id)))?;
    Ok(Json(emp))
}

/// Create a new employee (admin)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<EmployeeCreate>,
) -> AppResult<Json<Employee>> {
    validate_required_text(&payload.emp_id, "empId", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.email, "email", MAX_EMAIL_LEN)?;
    validate_required_text(&payload.department, "department", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.alias_name, "aliasName", MAX_NAME_LEN)?;
    validate_password(&payload.password)?;
    if let Some(role) = payload.role.as_deref()
        && role != "admin"
        && role != "employee"
    {
        return Err(AppError::validation("role must be admin or employee"));
    }

    let password_hash = hash_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?;

    let emp = employee::create(&state.db.pool, &payload, &password_hash)
        .await
        .map_err(map_duplicate)?;

    tracing::info!(emp_id = %emp.emp_id, department = %emp.department, "Employee created");
    Ok(Json(emp))
}

/// Update an employee (admin)
pub async fn update(
    State(state): State<ServerState>,
    Path(emp_id): Path<String>,
    Json(payload): Json<EmployeeUpdate>,
) -> AppResult<Json<Employee>> {
    if let Some(role) = payload.role.as_deref()
        && role != "admin"
        && role != "employee"
    {
        return Err(AppError::validation("role must be admin or employee"));
    }

    let password_hash = match payload.password.as_deref() {
        Some(pw) => {
            validate_password(pw)?;
            Some(
                hash_password(pw)
                    .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?,
            )
        }
        None => None,
    };

    let emp = employee::update(
        &state.db.pool,
        &emp_id,
        &payload,
        password_hash.as_deref(),
    )
    .await
    .map_err(map_duplicate)?;

    tracing::info!(emp_id = %emp.emp_id, "Employee updated");
    Ok(Json(emp))
}

/// Flip an employee's lifecycle status (admin)
pub async fn set_status(
    State(state): State<ServerState>,
    Path(emp_id): Path<String>,
    Json(payload): Json<EmployeeStatusUpdate>,
) -> AppResult<Json<Employee>> {
    let emp = employee::set_status(&state.db.pool, &emp_id, payload.status).await?;
    tracing::info!(emp_id = %emp.emp_id, status = ?payload.status, "Employee status changed");
    Ok(Json(emp))
}
