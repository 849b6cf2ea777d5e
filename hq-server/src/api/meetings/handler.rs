//! Meeting API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use chrono::Days;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::meeting;
use crate::utils::time::{business_date, day_end_millis, day_start_millis, parse_date};
use crate::utils::validation::{MAX_NAME_LEN, validate_optional_text, validate_required_text};
use crate::utils::{AppError, AppResult};

use shared::models::{Meeting, MeetingCreate};
use shared::util::now_millis;

/// Schedule a meeting (admin)
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<MeetingCreate>,
) -> AppResult<Json<Meeting>> {
    validate_required_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_optional_text(&payload.location, "location", MAX_NAME_LEN)?;
    if payload.attendees.is_empty() {
        return Err(AppError::validation("attendees cannot be empty"));
    }
    if payload.scheduled_at <= now_millis() {
        return Err(AppError::validation("scheduledAt must be in the future"));
    }

    let created = meeting::create(&state.db.pool, &payload, &user.emp_id, now_millis()).await?;
    tracing::info!(
        meeting_id = created.id,
        title = %created.title,
        organizer = %user.emp_id,
        attendees = created.attendee_ids().len(),
        "Meeting scheduled"
    );
    Ok(Json(created))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// YYYY-MM-DD; defaults to today
    pub from: Option<String>,
    /// YYYY-MM-DD; defaults to a week after `from`
    pub to: Option<String>,
}

/// List meetings in a date range, earliest first
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Vec<Meeting>>> {
    let tz = state.config.timezone;
    let from = match query.from.as_deref() {
        Some(s) => parse_date(s)?,
        None => business_date(now_millis(), tz),
    };
    let to = match query.to.as_deref() {
        Some(s) => parse_date(s)?,
        None => from.checked_add_days(Days::new(7)).unwrap_or(from),
    };
    if from > to {
        return Err(AppError::validation("from must not be after to"));
    }

    let meetings = meeting::find_in_range(
        &state.db.pool,
        day_start_millis(from, tz),
        day_end_millis(to, tz),
    )
    .await?;
    Ok(Json(meetings))
}

/// Cancel a meeting (admin)
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    meeting::delete(&state.db.pool, id).await?;
    tracing::info!(meeting_id = id, cancelled_by = %user.emp_id, "Meeting cancelled");
    Ok(Json(true))
}
