//! Target API Handlers
//!
//! Daily/monthly target evaluation endpoints and reason submission.
//! Evaluation is read-only over the ledger, business records and the
//! call-analytics vendor; nothing here caches results.

use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::employee;
use crate::targets::report::{self, DepartmentSummary, MonthlyProgress};
use crate::targets::{EmployeeTargetReport, evaluator};
use crate::utils::time::{business_date, parse_date, parse_month};
use crate::utils::{AppError, AppResult};

use shared::models::{TargetReason, TargetReasonSubmit};
use shared::util::now_millis;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentQuery {
    pub department: String,
    /// YYYY-MM-DD
    pub date: String,
    /// Narrow the report to one roster member
    pub emp_id: Option<String>,
}

/// Department rollup for one day (admin)
pub async fn department(
    State(state): State<ServerState>,
    Query(query): Query<DepartmentQuery>,
) -> AppResult<Json<DepartmentSummary>> {
    let date = parse_date(&query.date)?;
    let summary = report::department_report(
        &state.db.pool,
        state.talk_time.as_ref(),
        state.config.timezone,
        &query.department,
        date,
        query.emp_id.as_deref(),
    )
    .await?;
    Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeQuery {
    /// Defaults to the authenticated employee
    pub emp_id: Option<String>,
    /// YYYY-MM-DD
    pub date: String,
    /// Reject when the employee is not in this department
    pub department: Option<String>,
}

/// Single-employee evaluation for one day (self unless admin)
pub async fn employee(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<EmployeeQuery>,
) -> AppResult<Json<EmployeeTargetReport>> {
    let target = query.emp_id.as_deref().unwrap_or(&user.emp_id);
    if !user.can_act_for(target) {
        return Err(AppError::Forbidden(
            "Cannot view another employee's targets".to_string(),
        ));
    }

    let date = parse_date(&query.date)?;
    let report = report::employee_report(
        &state.db.pool,
        state.talk_time.as_ref(),
        state.config.timezone,
        target,
        date,
        query.department.as_deref(),
    )
    .await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyQuery {
    /// Defaults to the authenticated employee
    pub emp_id: Option<String>,
    /// YYYY-MM
    pub month: String,
}

/// Month-to-date progress (self unless admin)
pub async fn monthly(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<MonthlyQuery>,
) -> AppResult<Json<MonthlyProgress>> {
    let target = query.emp_id.as_deref().unwrap_or(&user.emp_id);
    if !user.can_act_for(target) {
        return Err(AppError::Forbidden(
            "Cannot view another employee's targets".to_string(),
        ));
    }

    let month = parse_month(&query.month)?;
    let today = business_date(now_millis(), state.config.timezone);
    let progress = report::monthly_progress(
        &state.db.pool,
        state.talk_time.as_ref(),
        state.config.timezone,
        target,
        month,
        today,
    )
    .await?;
    Ok(Json(progress))
}

/// Submit (or overwrite) the reason for an incomplete target day
///
/// The submitter is always the authenticated user; submitting on
/// behalf of someone else requires admin.
pub async fn submit_reason(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<TargetReasonSubmit>,
) -> AppResult<Json<TargetReason>> {
    let target = payload.emp_id.as_deref().unwrap_or(&user.emp_id);
    if !user.can_act_for(target) {
        return Err(AppError::Forbidden(
            "Cannot submit a reason for another employee".to_string(),
        ));
    }

    let date = parse_date(&payload.date)?;
    let emp = employee::find_by_emp_id(&state.db.pool, target)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Employee {} not found", target)))?;

    let saved = evaluator::submit_reason(
        &state.db.pool,
        state.talk_time.as_ref(),
        state.config.timezone,
        &emp,
        date,
        &payload.reason,
        &user.emp_id,
    )
    .await?;

    tracing::info!(
        emp_id = %emp.emp_id,
        date = %saved.date,
        submitted_by = %user.emp_id,
        "Target reason recorded"
    );

    if let Some(mailer) = state.mailer.clone() {
        let emp_name = emp.name.clone();
        let emp_id = emp.emp_id.clone();
        let date = saved.date.clone();
        let reason = saved.reason.clone();
        tokio::spawn(async move {
            mailer.reason_alert(&emp_name, &emp_id, &date, &reason).await;
        });
    }

    Ok(Json(saved))
}
