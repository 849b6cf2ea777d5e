//! Leave Request API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::leave;
use crate::utils::time::parse_date;
use crate::utils::validation::{MAX_NOTE_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};

use shared::models::{LeaveApply, LeaveDecision, LeaveRequest, LeaveStatus};
use shared::util::now_millis;

/// Apply for leave
pub async fn apply(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<LeaveApply>,
) -> AppResult<Json<LeaveRequest>> {
    let from = parse_date(&payload.date_from)?;
    let to = parse_date(&payload.date_to)?;
    if from > to {
        return Err(AppError::validation("dateFrom must not be after dateTo"));
    }
    validate_required_text(&payload.reason, "reason", MAX_NOTE_LEN)?;

    let request = leave::create(&state.db.pool, &user.emp_id, &payload, now_millis()).await?;
    tracing::info!(
        emp_id = %user.emp_id,
        date_from = %request.date_from,
        date_to = %request.date_to,
        "Leave requested"
    );
    Ok(Json(request))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Non-admins are always scoped to themselves
    pub emp_id: Option<String>,
    pub status: Option<LeaveStatus>,
}

/// List leave requests, newest application first
pub async fn list(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<LeaveRequest>>> {
    let emp_filter = match query.emp_id.as_deref() {
        Some(emp_id) => {
            if !user.can_act_for(emp_id) {
                return Err(AppError::Forbidden(
                    "Cannot view another employee's leave requests".to_string(),
                ));
            }
            Some(emp_id.to_string())
        }
        None if user.is_admin() => None,
        None => Some(user.emp_id.clone()),
    };

    let rows = leave::find_filtered(&state.db.pool, emp_filter.as_deref(), query.status).await?;
    Ok(Json(rows))
}

/// Approve or reject a pending request (admin)
///
/// Decided requests are immutable; a second decision answers 409.
pub async fn decide(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<LeaveDecision>,
) -> AppResult<Json<LeaveRequest>> {
    let existing = leave::find_by_id(&state.db.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Leave request {} not found", id)))?;
    if existing.status != LeaveStatus::Pending {
        return Err(AppError::conflict("Leave request already decided"));
    }

    let status = if payload.approve {
        LeaveStatus::Approved
    } else {
        LeaveStatus::Rejected
    };

    // The UPDATE re-checks PENDING, so a concurrent decision loses here
    let request = leave::decide(&state.db.pool, id, status, &user.emp_id, now_millis())
        .await
        .map_err(|e| match e {
            crate::db::repository::RepoError::NotFound(_) => {
                AppError::conflict("Leave request already decided")
            }
            other => other.into(),
        })?;

    tracing::info!(
        leave_id = id,
        emp_id = %request.emp_id,
        status = ?request.status,
        decided_by = %user.emp_id,
        "Leave request decided"
    );
    Ok(Json(request))
}
