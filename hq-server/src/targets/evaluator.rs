//! Target evaluator
//!
//! Classifies one (employee, day) as complete or incomplete against
//! the department policy. Status is a pure function of the measured
//! inputs, recomputed on every request and never persisted; only the
//! free-text reason for an incomplete day is stored.

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::policy::{CountSource, TargetPolicy, policy_for};
use crate::db::repository::{business_record, target_reason};
use crate::services::call_analytics::TalkTimeSource;
use crate::utils::validation::{MAX_NOTE_LEN, MIN_REASON_LEN, validate_bounded_text};
use crate::utils::{AppError, AppResult, TimeWindow, time};
use shared::models::{Employee, TargetReason};

/// Placeholder attached to incomplete days nobody has explained yet.
pub const REASON_NOT_PROVIDED: &str = "Not provided yet";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetStatus {
    Complete,
    Incomplete,
}

/// Talk-time sub-target, in hours.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TalkTimeTarget {
    pub required: f64,
    pub current: f64,
    pub completed: bool,
    pub remaining: f64,
}

impl TalkTimeTarget {
    fn new(required: f64, current: f64) -> Self {
        Self {
            required,
            current,
            completed: current >= required,
            remaining: time::round2((required - current).max(0.0)),
        }
    }
}

/// Business-record sub-target.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountTarget {
    pub required: i64,
    pub current: i64,
    pub completed: bool,
    pub remaining: i64,
}

impl CountTarget {
    fn new(required: i64, current: i64) -> Self {
        Self {
            required,
            current,
            completed: current >= required,
            remaining: (required - current).max(0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetBreakdown {
    pub talk_time: TalkTimeTarget,
    pub count: CountTarget,
}

/// Evaluation result for one employee and one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeTargetReport {
    pub emp_id: String,
    pub name: String,
    pub department: String,
    pub date: String,
    pub status: TargetStatus,
    pub status_message: String,
    pub targets: TargetBreakdown,
    /// Present only on incomplete days
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Set when the vendor fetch failed and the row was zeroed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_error: Option<String>,
}

/// Pure classification of measured values against the policy.
pub fn build_report(
    employee: &Employee,
    policy: &TargetPolicy,
    date: &str,
    talk_time_minutes: f64,
    business_count: i64,
    stored_reason: Option<String>,
) -> EmployeeTargetReport {
    let talk = TalkTimeTarget::new(policy.min_talk_hours, time::round2(talk_time_minutes / 60.0));
    let count = CountTarget::new(policy.min_count, business_count);
    let status = if talk.completed && count.completed {
        TargetStatus::Complete
    } else {
        TargetStatus::Incomplete
    };
    let status_message = status_message(&talk, &count, policy.count_label);
    // a reason only ever rides on an incomplete day
    let reason = match status {
        TargetStatus::Complete => None,
        TargetStatus::Incomplete => {
            Some(stored_reason.unwrap_or_else(|| REASON_NOT_PROVIDED.to_string()))
        }
    };

    EmployeeTargetReport {
        emp_id: employee.emp_id.clone(),
        name: employee.name.clone(),
        department: employee.department.clone(),
        date: date.to_string(),
        status,
        status_message,
        targets: TargetBreakdown {
            talk_time: talk,
            count,
        },
        reason,
        external_error: None,
    }
}

/// Zeroed row for an employee whose vendor fetch failed. The batch
/// report keeps going; this row records that its numbers are missing
/// rather than measured.
pub fn degraded_report(
    employee: &Employee,
    policy: &TargetPolicy,
    date: &str,
    stored_reason: Option<String>,
) -> EmployeeTargetReport {
    let mut report = build_report(employee, policy, date, 0.0, 0, stored_reason);
    report.status_message = "External call data unavailable".to_string();
    report.external_error = Some("Call analytics request failed".to_string());
    report
}

/// Names only the failing sub-targets, with the shortfall for each.
fn status_message(talk: &TalkTimeTarget, count: &CountTarget, count_label: &str) -> String {
    if talk.completed && count.completed {
        return "Daily target met".to_string();
    }
    let mut shortfalls = Vec::new();
    if !talk.completed {
        shortfalls.push(format!("talk time short by {}h", talk.remaining));
    }
    if !count.completed {
        shortfalls.push(format!("{count_label} short by {}", count.remaining));
    }
    format!("Daily target incomplete: {}", shortfalls.join(", "))
}

/// Evaluate one employee for one day.
///
/// Vendor failures propagate as `ExternalService`: the department
/// batch catches them per row, single-employee callers see them as-is.
pub async fn evaluate_day(
    pool: &SqlitePool,
    talk_source: &dyn TalkTimeSource,
    tz: Tz,
    employee: &Employee,
    date: NaiveDate,
) -> AppResult<EmployeeTargetReport> {
    let policy = policy_for(&employee.department)
        .ok_or_else(|| not_eligible(&employee.department))?;

    let window = time::day_window(date, tz);
    let minutes = talk_source
        .talk_time_minutes(&employee.alias_name, window)
        .await?;
    let count = fetch_count(pool, policy.count_source, &employee.emp_id, window).await?;
    let stored = stored_reason(pool, &employee.emp_id, &date.to_string()).await?;

    Ok(build_report(
        employee,
        policy,
        &date.to_string(),
        minutes,
        count,
        stored,
    ))
}

pub(crate) async fn fetch_count(
    pool: &SqlitePool,
    source: CountSource,
    emp_id: &str,
    window: TimeWindow,
) -> AppResult<i64> {
    let n = match source {
        CountSource::TruckerOnboarding => {
            business_record::count_truckers_created_by(pool, emp_id, window.start_ms, window.end_ms)
                .await?
        }
        CountSource::DeliveryOrder => {
            business_record::count_delivery_orders_created_by(
                pool,
                emp_id,
                window.start_ms,
                window.end_ms,
            )
            .await?
        }
    };
    Ok(n)
}

pub(crate) async fn stored_reason(
    pool: &SqlitePool,
    emp_id: &str,
    date: &str,
) -> AppResult<Option<String>> {
    let row = target_reason::find_by_emp_and_date(pool, emp_id, date).await?;
    Ok(row.map(|r| r.reason))
}

fn not_eligible(department: &str) -> AppError {
    AppError::DepartmentNotEligible(format!("No target policy for department {department}"))
}

/// Store or overwrite the justification for an incomplete day.
///
/// The day's status is recomputed first: explaining a day that is
/// already complete is an error, not a no-op.
pub async fn submit_reason(
    pool: &SqlitePool,
    talk_source: &dyn TalkTimeSource,
    tz: Tz,
    employee: &Employee,
    date: NaiveDate,
    text: &str,
    submitted_by: &str,
) -> AppResult<TargetReason> {
    validate_bounded_text(text, "reason", MIN_REASON_LEN, MAX_NOTE_LEN)?;
    if policy_for(&employee.department).is_none() {
        return Err(not_eligible(&employee.department));
    }

    let report = evaluate_day(pool, talk_source, tz, employee, date).await?;
    if report.status == TargetStatus::Complete {
        return Err(AppError::AlreadyComplete(format!(
            "Target already complete for {date}"
        )));
    }

    let row = target_reason::upsert(
        pool,
        &employee.emp_id,
        &date.to_string(),
        text.trim(),
        submitted_by,
    )
    .await?;
    Ok(row)
}
