//! Reporting aggregator
//!
//! Rolls evaluator results up across a department for one day, and
//! across a month for one employee. Vendor fetches for a department
//! run concurrently; output rows always keep roster order.

use chrono::NaiveDate;
use chrono_tz::Tz;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::warn;

use super::evaluator::{self, EmployeeTargetReport, TargetStatus};
use super::policy::policy_for;
use crate::attendance::ledger;
use crate::db::repository::{attendance, employee};
use crate::services::call_analytics::TalkTimeSource;
use crate::utils::{AppError, AppResult, time};
use shared::models::Employee;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepartmentStatus {
    Complete,
    Incomplete,
    NoEmployees,
}

/// Department-wide rollup for one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSummary {
    pub department: String,
    pub date: String,
    pub department_status: DepartmentStatus,
    pub employee_count: usize,
    pub complete_count: usize,
    pub incomplete_count: usize,
    pub total_talk_time_hours: f64,
    pub average_talk_time_hours: f64,
    pub total_business_count: i64,
    /// One row per employee, in roster order
    pub employees: Vec<EmployeeTargetReport>,
}

impl DepartmentSummary {
    fn empty(department: &str, date: &str) -> Self {
        Self {
            department: department.to_string(),
            date: date.to_string(),
            department_status: DepartmentStatus::NoEmployees,
            employee_count: 0,
            complete_count: 0,
            incomplete_count: 0,
            total_talk_time_hours: 0.0,
            average_talk_time_hours: 0.0,
            total_business_count: 0,
            employees: Vec::new(),
        }
    }
}

/// One stored justification inside a monthly rollup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReason {
    pub date: String,
    pub reason: String,
}

/// Month-to-date rollup for one employee.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyProgress {
    pub emp_id: String,
    pub name: String,
    pub department: String,
    /// `YYYY-MM`
    pub month: String,
    pub days_evaluated: usize,
    pub complete_days: usize,
    pub incomplete_days: usize,
    /// Worked hours from closed ledger sessions in the month
    pub total_hours_worked: f64,
    /// Reasons actually submitted for incomplete days, oldest first
    pub reasons: Vec<DailyReason>,
}

/// Evaluate a whole department for one day, or a single member of it
/// when `emp_id` is given.
///
/// Batch mode degrades vendor failures per row so one employee's
/// outage cannot sink the report. With `emp_id` the caller asked about
/// exactly one person and gets the failure as-is.
pub async fn department_report(
    pool: &SqlitePool,
    talk_source: &dyn TalkTimeSource,
    tz: Tz,
    department: &str,
    date: NaiveDate,
    emp_id: Option<&str>,
) -> AppResult<DepartmentSummary> {
    if policy_for(department).is_none() {
        return Err(AppError::DepartmentNotEligible(format!(
            "No target policy for department {department}"
        )));
    }

    let date_str = date.to_string();
    let roster = employee::find_active_by_department(pool, department).await?;

    let selected: Vec<Employee> = match emp_id {
        Some(id) => {
            let member = roster.into_iter().find(|e| e.emp_id == id).ok_or_else(|| {
                AppError::not_found(format!("Employee {id} not found in department {department}"))
            })?;
            vec![member]
        }
        None => roster,
    };

    // an empty roster never touches the vendor
    if selected.is_empty() {
        return Ok(DepartmentSummary::empty(department, &date_str));
    }

    let allow_degrade = emp_id.is_none();
    let rows = join_all(
        selected
            .iter()
            .map(|e| evaluate_or_degrade(pool, talk_source, tz, e, date, allow_degrade)),
    )
    .await;

    let mut employees = Vec::with_capacity(rows.len());
    for row in rows {
        employees.push(row?);
    }

    let complete_count = employees
        .iter()
        .filter(|r| r.status == TargetStatus::Complete)
        .count();
    let total_talk: f64 = employees.iter().map(|r| r.targets.talk_time.current).sum();
    let total_count: i64 = employees.iter().map(|r| r.targets.count.current).sum();
    let department_status = if complete_count == employees.len() {
        DepartmentStatus::Complete
    } else {
        DepartmentStatus::Incomplete
    };

    Ok(DepartmentSummary {
        department: department.to_string(),
        date: date_str,
        department_status,
        employee_count: employees.len(),
        complete_count,
        incomplete_count: employees.len() - complete_count,
        total_talk_time_hours: time::round2(total_talk),
        average_talk_time_hours: time::round2(total_talk / employees.len() as f64),
        total_business_count: total_count,
        employees,
    })
}

/// Evaluate one employee for one day outside any department rollup.
/// The caller asked about this one person, so vendor failures
/// propagate instead of degrading.
pub async fn employee_report(
    pool: &SqlitePool,
    talk_source: &dyn TalkTimeSource,
    tz: Tz,
    emp_id: &str,
    date: NaiveDate,
    department: Option<&str>,
) -> AppResult<EmployeeTargetReport> {
    let member = employee::find_by_emp_id(pool, emp_id)
        .await?
        .filter(|e| e.is_active())
        .filter(|e| department.is_none_or(|d| e.department == d))
        .ok_or_else(|| AppError::not_found(format!("Employee {emp_id} not found")))?;
    evaluator::evaluate_day(pool, talk_source, tz, &member, date).await
}

/// Evaluate every day of `month` up to and including `today`.
///
/// Days run sequentially (the vendor re-authenticates per call; a
/// month-sized burst of parallel token fetches is not worth it). This
/// is a single-employee flow, so a vendor failure propagates.
pub async fn monthly_progress(
    pool: &SqlitePool,
    talk_source: &dyn TalkTimeSource,
    tz: Tz,
    emp_id: &str,
    month: NaiveDate,
    today: NaiveDate,
) -> AppResult<MonthlyProgress> {
    let member = employee::find_by_emp_id(pool, emp_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Employee {emp_id} not found")))?;
    if policy_for(&member.department).is_none() {
        return Err(AppError::DepartmentNotEligible(format!(
            "No target policy for department {}",
            member.department
        )));
    }

    let first = time::first_of_month(month);
    let next_first = time::first_of_next_month(month);

    let mut complete_days = 0usize;
    let mut incomplete_days = 0usize;
    let mut reasons = Vec::new();

    let mut day = first;
    while day < next_first && day <= today {
        let report = evaluator::evaluate_day(pool, talk_source, tz, &member, day).await?;
        match report.status {
            TargetStatus::Complete => complete_days += 1,
            TargetStatus::Incomplete => incomplete_days += 1,
        }
        if let Some(reason) = report.reason
            && reason != evaluator::REASON_NOT_PROVIDED
        {
            reasons.push(DailyReason {
                date: report.date,
                reason,
            });
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    // worked hours come from the ledger, not the evaluator
    let last_of_month = next_first.pred_opt().unwrap_or(next_first);
    let sessions = attendance::find_history(
        pool,
        emp_id,
        Some(&first.to_string()),
        Some(&last_of_month.to_string()),
    )
    .await?;
    let total_hours_worked = ledger::sum_completed_hours(&sessions);

    Ok(MonthlyProgress {
        emp_id: member.emp_id,
        name: member.name,
        department: member.department,
        month: first.format("%Y-%m").to_string(),
        days_evaluated: complete_days + incomplete_days,
        complete_days,
        incomplete_days,
        total_hours_worked,
        reasons,
    })
}

async fn evaluate_or_degrade(
    pool: &SqlitePool,
    talk_source: &dyn TalkTimeSource,
    tz: Tz,
    member: &Employee,
    date: NaiveDate,
    allow_degrade: bool,
) -> AppResult<EmployeeTargetReport> {
    match evaluator::evaluate_day(pool, talk_source, tz, member, date).await {
        Ok(report) => Ok(report),
        Err(err) if allow_degrade && err.is_external() => {
            warn!(
                emp_id = %member.emp_id,
                date = %date,
                error = %err,
                "Vendor fetch failed, degrading report row to zero values"
            );
            // the external call only runs after policy resolution
            let Some(policy) = policy_for(&member.department) else {
                return Err(err);
            };
            let date_str = date.to_string();
            let stored = evaluator::stored_reason(pool, &member.emp_id, &date_str).await?;
            Ok(evaluator::degraded_report(member, policy, &date_str, stored))
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::{business_record, employee as employee_repo, target_reason};
    use async_trait::async_trait;
    use chrono_tz::Asia::Kolkata;
    use shared::models::{EmployeeCreate, TruckerOnboardingCreate};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::utils::TimeWindow;

    /// Canned vendor: minutes per alias, `FAIL` marks an outage.
    #[derive(Default)]
    struct StubTalk {
        minutes: HashMap<String, f64>,
        calls: AtomicUsize,
    }

    impl StubTalk {
        fn with(minutes: &[(&str, f64)]) -> Self {
            Self {
                minutes: minutes
                    .iter()
                    .map(|(alias, m)| (alias.to_string(), *m))
                    .collect(),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TalkTimeSource for StubTalk {
        async fn talk_time_minutes(&self, alias: &str, _window: TimeWindow) -> AppResult<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.minutes.get(alias) {
                Some(m) if m.is_nan() => Err(AppError::ExternalService(
                    "stub vendor outage".to_string(),
                )),
                Some(m) => Ok(*m),
                None => Ok(0.0),
            }
        }
    }

    async fn seed_emp(pool: &SqlitePool, emp_id: &str, department: &str) {
        let data = EmployeeCreate {
            emp_id: emp_id.to_string(),
            name: format!("Employee {emp_id}"),
            email: format!("{emp_id}@example.com"),
            password: "secret123".to_string(),
            role: None,
            department: department.to_string(),
            alias_name: format!("Agent {emp_id}"),
        };
        employee_repo::create(pool, &data, "hash").await.unwrap();
    }

    async fn seed_truckers(pool: &SqlitePool, emp_id: &str, date: &str, n: usize) {
        let day = time::parse_date(date).unwrap();
        let created = time::date_hms_to_millis(day, 11, 0, 0, Kolkata);
        for i in 0..n {
            let data = TruckerOnboardingCreate {
                truck_number: format!("KA01-{emp_id}-{i}"),
                owner_name: format!("Owner {i}"),
                owner_phone: None,
                origin_city: None,
                destination_city: None,
            };
            business_record::create_trucker(pool, &data, emp_id, created)
                .await
                .unwrap();
        }
    }

    fn jun19() -> NaiveDate {
        time::parse_date("2025-06-19").unwrap()
    }

    #[tokio::test]
    async fn empty_department_reports_no_employees_without_vendor_calls() {
        let db = DbService::new_in_memory().await.unwrap();
        let talk = StubTalk::default();

        let summary = department_report(&db.pool, &talk, Kolkata, "CMT", jun19(), None)
            .await
            .unwrap();

        assert_eq!(summary.department_status, DepartmentStatus::NoEmployees);
        assert!(summary.employees.is_empty());
        assert_eq!(summary.employee_count, 0);
        assert_eq!(talk.call_count(), 0);
    }

    #[tokio::test]
    async fn unlisted_department_is_rejected() {
        let db = DbService::new_in_memory().await.unwrap();
        let talk = StubTalk::default();

        let err = department_report(&db.pool, &talk, Kolkata, "HR", jun19(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DepartmentNotEligible(_)));
        assert_eq!(talk.call_count(), 0);
    }

    #[tokio::test]
    async fn department_rollup_keeps_roster_order_and_sums_metrics() {
        let db = DbService::new_in_memory().await.unwrap();
        seed_emp(&db.pool, "EMP001", "CMT").await;
        seed_emp(&db.pool, "EMP002", "CMT").await;
        seed_truckers(&db.pool, "EMP001", "2025-06-19", 5).await;
        seed_truckers(&db.pool, "EMP002", "2025-06-19", 4).await;

        // EMP001 1.4h (short), EMP002 2h
        let talk = StubTalk::with(&[("Agent EMP001", 84.0), ("Agent EMP002", 120.0)]);

        let summary = department_report(&db.pool, &talk, Kolkata, "CMT", jun19(), None)
            .await
            .unwrap();

        let ids: Vec<&str> = summary.employees.iter().map(|r| r.emp_id.as_str()).collect();
        assert_eq!(ids, vec!["EMP001", "EMP002"]);
        assert_eq!(summary.department_status, DepartmentStatus::Incomplete);
        assert_eq!(summary.complete_count, 1);
        assert_eq!(summary.incomplete_count, 1);
        assert_eq!(summary.total_talk_time_hours, 3.4);
        assert_eq!(summary.average_talk_time_hours, 1.7);
        assert_eq!(summary.total_business_count, 9);
        assert_eq!(
            summary.employees[0].status_message,
            "Daily target incomplete: talk time short by 0.1h"
        );
    }

    #[tokio::test]
    async fn department_is_complete_only_when_every_member_is() {
        let db = DbService::new_in_memory().await.unwrap();
        seed_emp(&db.pool, "EMP001", "CMT").await;
        seed_emp(&db.pool, "EMP002", "CMT").await;
        seed_truckers(&db.pool, "EMP001", "2025-06-19", 4).await;
        seed_truckers(&db.pool, "EMP002", "2025-06-19", 6).await;

        let talk = StubTalk::with(&[("Agent EMP001", 95.0), ("Agent EMP002", 100.0)]);
        let summary = department_report(&db.pool, &talk, Kolkata, "CMT", jun19(), None)
            .await
            .unwrap();
        assert_eq!(summary.department_status, DepartmentStatus::Complete);
        assert_eq!(summary.incomplete_count, 0);
    }

    #[tokio::test]
    async fn one_vendor_outage_degrades_one_row_not_the_batch() {
        let db = DbService::new_in_memory().await.unwrap();
        seed_emp(&db.pool, "EMP001", "CMT").await;
        seed_emp(&db.pool, "EMP002", "CMT").await;
        seed_truckers(&db.pool, "EMP002", "2025-06-19", 4).await;

        let talk = StubTalk::with(&[("Agent EMP001", f64::NAN), ("Agent EMP002", 120.0)]);
        let summary = department_report(&db.pool, &talk, Kolkata, "CMT", jun19(), None)
            .await
            .unwrap();

        let degraded = &summary.employees[0];
        assert_eq!(degraded.emp_id, "EMP001");
        assert!(degraded.external_error.is_some());
        assert_eq!(degraded.targets.talk_time.current, 0.0);
        assert_eq!(degraded.targets.count.current, 0);

        let healthy = &summary.employees[1];
        assert!(healthy.external_error.is_none());
        assert_eq!(healthy.status, TargetStatus::Complete);
        assert_eq!(summary.department_status, DepartmentStatus::Incomplete);
    }

    #[tokio::test]
    async fn single_member_request_propagates_vendor_failure() {
        let db = DbService::new_in_memory().await.unwrap();
        seed_emp(&db.pool, "EMP001", "CMT").await;

        let talk = StubTalk::with(&[("Agent EMP001", f64::NAN)]);
        let err = department_report(&db.pool, &talk, Kolkata, "CMT", jun19(), Some("EMP001"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ExternalService(_)));
    }

    #[tokio::test]
    async fn single_member_must_belong_to_the_department() {
        let db = DbService::new_in_memory().await.unwrap();
        seed_emp(&db.pool, "EMP001", "CMT").await;
        seed_emp(&db.pool, "EMP777", "Sales").await;

        let talk = StubTalk::default();
        let err = department_report(&db.pool, &talk, Kolkata, "CMT", jun19(), Some("EMP777"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(talk.call_count(), 0);
    }

    #[tokio::test]
    async fn inactive_employees_are_not_on_the_roster() {
        let db = DbService::new_in_memory().await.unwrap();
        seed_emp(&db.pool, "EMP001", "CMT").await;
        seed_emp(&db.pool, "EMP002", "CMT").await;
        employee_repo::set_status(
            &db.pool,
            "EMP002",
            shared::models::EmployeeStatus::Inactive,
        )
        .await
        .unwrap();

        let talk = StubTalk::with(&[("Agent EMP001", 95.0)]);
        seed_truckers(&db.pool, "EMP001", "2025-06-19", 4).await;
        let summary = department_report(&db.pool, &talk, Kolkata, "CMT", jun19(), None)
            .await
            .unwrap();
        assert_eq!(summary.employee_count, 1);
        assert_eq!(summary.employees[0].emp_id, "EMP001");
    }

    #[tokio::test]
    async fn monthly_progress_clamps_to_today_and_collects_reasons() {
        let db = DbService::new_in_memory().await.unwrap();
        seed_emp(&db.pool, "EMP001", "CMT").await;
        // June 1-2 complete, June 3 incomplete with a stored reason
        seed_truckers(&db.pool, "EMP001", "2025-06-01", 4).await;
        seed_truckers(&db.pool, "EMP001", "2025-06-02", 4).await;
        target_reason::upsert(
            &db.pool,
            "EMP001",
            "2025-06-03",
            "all trucks grounded by the regional strike",
            "EMP001",
        )
        .await
        .unwrap();

        // ledger hours: one closed 8.5h session
        ledger::open_session(
            &db.pool,
            Kolkata,
            "EMP001",
            time::date_hms_to_millis(time::parse_date("2025-06-02").unwrap(), 9, 0, 0, Kolkata),
        )
        .await
        .unwrap();
        ledger::close_session(
            &db.pool,
            Kolkata,
            "EMP001",
            time::date_hms_to_millis(time::parse_date("2025-06-02").unwrap(), 17, 30, 0, Kolkata),
        )
        .await
        .unwrap();

        let talk = StubTalk::with(&[("Agent EMP001", 95.0)]);
        let today = time::parse_date("2025-06-03").unwrap();
        let progress = monthly_progress(
            &db.pool,
            &talk,
            Kolkata,
            "EMP001",
            time::parse_month("2025-06").unwrap(),
            today,
        )
        .await
        .unwrap();

        assert_eq!(progress.month, "2025-06");
        assert_eq!(progress.days_evaluated, 3);
        assert_eq!(progress.complete_days, 2);
        assert_eq!(progress.incomplete_days, 1);
        assert_eq!(progress.total_hours_worked, 8.5);
        assert_eq!(progress.reasons.len(), 1);
        assert_eq!(progress.reasons[0].date, "2025-06-03");
        assert_eq!(
            progress.reasons[0].reason,
            "all trucks grounded by the regional strike"
        );
        // one vendor call per evaluated day
        assert_eq!(talk.call_count(), 3);
    }

    #[tokio::test]
    async fn monthly_progress_propagates_vendor_failure() {
        let db = DbService::new_in_memory().await.unwrap();
        seed_emp(&db.pool, "EMP001", "CMT").await;

        let talk = StubTalk::with(&[("Agent EMP001", f64::NAN)]);
        let err = monthly_progress(
            &db.pool,
            &talk,
            Kolkata,
            "EMP001",
            time::parse_month("2025-06").unwrap(),
            time::parse_date("2025-06-02").unwrap(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::ExternalService(_)));
    }

    #[tokio::test]
    async fn employee_report_honors_department_filter() {
        let db = DbService::new_in_memory().await.unwrap();
        seed_emp(&db.pool, "EMP001", "CMT").await;
        seed_truckers(&db.pool, "EMP001", "2025-06-19", 4).await;

        let talk = StubTalk::with(&[("Agent EMP001", 95.0)]);
        let report = employee_report(&db.pool, &talk, Kolkata, "EMP001", jun19(), Some("CMT"))
            .await
            .unwrap();
        assert_eq!(report.status, TargetStatus::Complete);

        let err = employee_report(&db.pool, &talk, Kolkata, "EMP001", jun19(), Some("Sales"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn monthly_progress_for_unknown_employee_is_not_found() {
        let db = DbService::new_in_memory().await.unwrap();
        let talk = StubTalk::default();
        let err = monthly_progress(
            &db.pool,
            &talk,
            Kolkata,
            "EMP404",
            time::parse_month("2025-06").unwrap(),
            time::parse_date("2025-06-15").unwrap(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
