//! Attendance API Handlers
//!
//! Session open/close, history lookup and admin corrections. The
//! login/logout confirmations go out fire-and-forget so mail latency
//! never sits on the request path.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::attendance::ledger;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{attendance, employee};
use crate::utils::{AppError, AppResult, time};

use shared::models::{AttendanceRecord, AttendanceStatus, AttendanceStatusUpdate};
use shared::util::now_millis;

/// Open today's session for the authenticated employee
pub async fn login(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<AttendanceRecord>> {
    let now = now_millis();
    let tz = state.config.timezone;
    let record = ledger::open_session(&state.db.pool, tz, &user.emp_id, now).await?;

    tracing::info!(emp_id = %user.emp_id, date = %record.date, "Attendance login");

    if let Some(mailer) = state.mailer.clone() {
        let pool = state.db.pool.clone();
        let emp_id = user.emp_id.clone();
        let login_at = time::format_local_datetime(now, tz);
        tokio::spawn(async move {
            if let Ok(Some(emp)) = employee::find_by_emp_id(&pool, &emp_id).await {
                mailer.login_notice(&emp.email, &emp.name, &login_at).await;
            }
        });
    }

    Ok(Json(record))
}

/// Close today's session for the authenticated employee
pub async fn logout(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<AttendanceRecord>> {
    let now = now_millis();
    let tz = state.config.timezone;
    let record = ledger::close_session(&state.db.pool, tz, &user.emp_id, now).await?;

    tracing::info!(
        emp_id = %user.emp_id,
        date = %record.date,
        total_hours = record.total_hours,
        "Attendance logout"
    );

    if let Some(mailer) = state.mailer.clone() {
        let pool = state.db.pool.clone();
        let emp_id = user.emp_id.clone();
        let logout_at = time::format_local_datetime(now, tz);
        let hours = record.total_hours;
        tokio::spawn(async move {
            if let Ok(Some(emp)) = employee::find_by_emp_id(&pool, &emp_id).await {
                mailer
                    .logout_notice(&emp.email, &emp.name, &logout_at, hours)
                    .await;
            }
        });
    }

    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    /// Defaults to the authenticated employee
    pub emp_id: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

/// Attendance history, newest day first
pub async fn history(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<AttendanceRecord>>> {
    let target = query.emp_id.as_deref().unwrap_or(&user.emp_id);
    if !user.can_act_for(target) {
        return Err(AppError::Forbidden(
            "Cannot view another employee's attendance".to_string(),
        ));
    }

    let records = ledger::history(
        &state.db.pool,
        target,
        query.date_from.as_deref(),
        query.date_to.as_deref(),
    )
    .await?;
    Ok(Json(records))
}

/// Admin correction of a session status
pub async fn set_status(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<AttendanceStatusUpdate>,
) -> AppResult<Json<AttendanceRecord>> {
    // ACTIVE is only ever produced by a real login
    if payload.status == AttendanceStatus::Active {
        return Err(AppError::validation(
            "Cannot set a session back to ACTIVE",
        ));
    }

    let record = attendance::set_status(&state.db.pool, id, payload.status, now_millis()).await?;
    tracing::info!(
        record_id = id,
        status = ?payload.status,
        corrected_by = %user.emp_id,
        "Attendance status corrected"
    );
    Ok(Json(record))
}
