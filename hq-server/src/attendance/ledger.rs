//! Activity ledger
//!
//! One attendance row per (employee, calendar day). Sessions open on
//! login and close exactly once on logout. Days are evaluated in the
//! business time zone, with "now" resolved once at the request
//! boundary and passed down as explicit millis.

use std::collections::HashSet;

use chrono::NaiveDate;
use chrono_tz::Tz;
use sqlx::SqlitePool;

use crate::db::repository::{attendance, employee, leave};
use crate::utils::{AppError, AppResult, time};
use shared::models::{AttendanceRecord, AttendanceStatus};

/// Open a session for `emp_id` at instant `now_ms`.
///
/// Exactly one row may exist per (employee, day): a second login on
/// the same day is a conflict whatever state the first row is in. The
/// unique index on (emp_id, date) backs this up under concurrent
/// logins; the duplicate-key error surfaces as the same conflict.
pub async fn open_session(
    pool: &SqlitePool,
    tz: Tz,
    emp_id: &str,
    now_ms: i64,
) -> AppResult<AttendanceRecord> {
    let date = time::business_date(now_ms, tz).to_string();

    if let Some(existing) = attendance::find_by_emp_and_date(pool, emp_id, &date).await? {
        let message = match existing.status {
            AttendanceStatus::Active => "Already logged in today",
            _ => "Attendance already recorded for today",
        };
        return Err(AppError::conflict(message));
    }

    let record = attendance::insert_login(pool, emp_id, &date, now_ms).await?;
    Ok(record)
}

/// Close today's active session at instant `now_ms`.
///
/// "Already logged out" and "never logged in" are indistinguishable
/// here; both surface as the same not-found error.
pub async fn close_session(
    pool: &SqlitePool,
    tz: Tz,
    emp_id: &str,
    now_ms: i64,
) -> AppResult<AttendanceRecord> {
    let date = time::business_date(now_ms, tz).to_string();

    let active = attendance::find_active(pool, emp_id, &date)
        .await?
        .ok_or_else(|| AppError::not_found("No active session"))?;
    let login_ms = active
        .login_time
        .ok_or_else(|| AppError::database("Active session has no login time"))?;

    let total_hours = time::hours_between(login_ms, now_ms);
    let record = attendance::close(pool, active.id, now_ms, total_hours).await?;
    Ok(record)
}

/// End-of-day sweep: every active employee with no attendance row for
/// `date` gets one, ON_LEAVE when an approved leave covers the day and
/// ABSENT otherwise. Returns the number of rows written.
///
/// Re-running recomputes an empty set difference, and the unique index
/// swallows rows that appear between the read and the insert, so the
/// sweep never duplicates a day.
pub async fn mark_absentees(pool: &SqlitePool, date: NaiveDate, now_ms: i64) -> AppResult<u64> {
    let date_str = date.to_string();

    let roster = employee::find_active(pool).await?;
    let recorded: HashSet<String> = attendance::emp_ids_with_record_on(pool, &date_str)
        .await?
        .into_iter()
        .collect();
    let on_leave: HashSet<String> = leave::approved_emp_ids_covering(pool, &date_str)
        .await?
        .into_iter()
        .collect();

    let marks: Vec<(String, AttendanceStatus)> = roster
        .into_iter()
        .filter(|e| !recorded.contains(&e.emp_id))
        .map(|e| {
            let status = if on_leave.contains(&e.emp_id) {
                AttendanceStatus::OnLeave
            } else {
                AttendanceStatus::Absent
            };
            (e.emp_id, status)
        })
        .collect();

    if marks.is_empty() {
        return Ok(0);
    }
    let inserted = attendance::insert_absent_bulk(pool, &marks, &date_str, now_ms).await?;
    Ok(inserted)
}

/// Session history, newest first, optionally clipped to an inclusive
/// date range.
pub async fn history(
    pool: &SqlitePool,
    emp_id: &str,
    date_from: Option<&str>,
    date_to: Option<&str>,
) -> AppResult<Vec<AttendanceRecord>> {
    if let Some(from) = date_from {
        time::parse_date(from)?;
    }
    if let Some(to) = date_to {
        time::parse_date(to)?;
    }
    let rows = attendance::find_history(pool, emp_id, date_from, date_to).await?;
    Ok(rows)
}

/// Sum of worked hours across closed sessions. Rows without a logout
/// (still active, absent, on leave) do not count.
pub fn sum_completed_hours(records: &[AttendanceRecord]) -> f64 {
    let total: f64 = records
        .iter()
        .filter(|r| r.logout_time.is_some())
        .map(|r| r.total_hours)
        .sum();
    time::round2(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::employee;
    use chrono_tz::Asia::Kolkata;
    use shared::models::{EmployeeCreate, LeaveApply, LeaveStatus};

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
        employee::create(pool, &data, "hash").await.unwrap();
    }

    fn at(date: &str, hour: u32, min: u32) -> i64 {
        let d = time::parse_date(date).unwrap();
        time::date_hms_to_millis(d, hour, min, 0, Kolkata)
    }

    #[tokio::test]
    async fn open_then_close_computes_hours() {
        let db = DbService::new_in_memory().await.unwrap();
        seed_emp(&db.pool, "EMP001", "CMT").await;

        let login = at("2025-06-19", 9, 0);
        let logout = at("2025-06-19", 17, 30);

        let opened = open_session(&db.pool, Kolkata, "EMP001", login).await.unwrap();
        assert_eq!(opened.status, AttendanceStatus::Active);
        assert_eq!(opened.login_time, Some(login));
        assert_eq!(opened.date, "2025-06-19");

        let closed = close_session(&db.pool, Kolkata, "EMP001", logout).await.unwrap();
        assert_eq!(closed.status, AttendanceStatus::Completed);
        assert_eq!(closed.logout_time, Some(logout));
        assert_eq!(closed.total_hours, 8.5);
    }

    #[tokio::test]
    async fn double_login_is_a_conflict() {
        let db = DbService::new_in_memory().await.unwrap();
        seed_emp(&db.pool, "EMP001", "CMT").await;

        open_session(&db.pool, Kolkata, "EMP001", at("2025-06-19", 9, 0))
            .await
            .unwrap();
        let err = open_session(&db.pool, Kolkata, "EMP001", at("2025-06-19", 10, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn login_after_logout_same_day_is_a_conflict() {
        let db = DbService::new_in_memory().await.unwrap();
        seed_emp(&db.pool, "EMP001", "CMT").await;

        open_session(&db.pool, Kolkata, "EMP001", at("2025-06-19", 9, 0))
            .await
            .unwrap();
        close_session(&db.pool, Kolkata, "EMP001", at("2025-06-19", 12, 0))
            .await
            .unwrap();
        let err = open_session(&db.pool, Kolkata, "EMP001", at("2025-06-19", 13, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn close_without_open_is_not_found() {
        let db = DbService::new_in_memory().await.unwrap();
        seed_emp(&db.pool, "EMP001", "CMT").await;

        let err = close_session(&db.pool, Kolkata, "EMP001", at("2025-06-19", 18, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn double_logout_is_not_found() {
        let db = DbService::new_in_memory().await.unwrap();
        seed_emp(&db.pool, "EMP001", "CMT").await;

        open_session(&db.pool, Kolkata, "EMP001", at("2025-06-19", 9, 0))
            .await
            .unwrap();
        close_session(&db.pool, Kolkata, "EMP001", at("2025-06-19", 17, 0))
            .await
            .unwrap();
        let err = close_session(&db.pool, Kolkata, "EMP001", at("2025-06-19", 18, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn sweep_marks_missing_employees_once() {
        let db = DbService::new_in_memory().await.unwrap();
        seed_emp(&db.pool, "EMP001", "CMT").await;
        seed_emp(&db.pool, "EMP002", "CMT").await;
        seed_emp(&db.pool, "EMP003", "Sales").await;

        let date = time::parse_date("2025-06-19").unwrap();
        let now = at("2025-06-19", 20, 0);

        // EMP001 logged in, EMP003 is on approved leave
        open_session(&db.pool, Kolkata, "EMP001", at("2025-06-19", 9, 0))
            .await
            .unwrap();
        let request = leave::create(
            &db.pool,
            "EMP003",
            &LeaveApply {
                date_from: "2025-06-18".to_string(),
                date_to: "2025-06-20".to_string(),
                reason: "Family function out of town".to_string(),
            },
            now,
        )
        .await
        .unwrap();
        leave::decide(&db.pool, request.id, LeaveStatus::Approved, "EMP000", now)
            .await
            .unwrap();

        assert_eq!(mark_absentees(&db.pool, date, now).await.unwrap(), 2);

        let absent = attendance::find_by_emp_and_date(&db.pool, "EMP002", "2025-06-19")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(absent.status, AttendanceStatus::Absent);
        assert_eq!(absent.total_hours, 0.0);
        assert_eq!(absent.login_time, None);

        let on_leave = attendance::find_by_emp_and_date(&db.pool, "EMP003", "2025-06-19")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(on_leave.status, AttendanceStatus::OnLeave);

        // second run finds nothing left to mark
        assert_eq!(mark_absentees(&db.pool, date, now).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn history_is_newest_first_and_clippable() {
        let db = DbService::new_in_memory().await.unwrap();
        seed_emp(&db.pool, "EMP001", "CMT").await;

        for day in ["2025-06-17", "2025-06-18", "2025-06-19"] {
            open_session(&db.pool, Kolkata, "EMP001", at(day, 9, 0))
                .await
                .unwrap();
            close_session(&db.pool, Kolkata, "EMP001", at(day, 17, 0))
                .await
                .unwrap();
        }

        let all = history(&db.pool, "EMP001", None, None).await.unwrap();
        let dates: Vec<&str> = all.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-06-19", "2025-06-18", "2025-06-17"]);

        let clipped = history(&db.pool, "EMP001", Some("2025-06-18"), Some("2025-06-18"))
            .await
            .unwrap();
        assert_eq!(clipped.len(), 1);
        assert_eq!(clipped[0].date, "2025-06-18");

        assert!(history(&db.pool, "EMP001", Some("18-06-2025"), None).await.is_err());
    }

    #[test]
    fn completed_hours_skip_open_rows() {
        fn row(id: i64, logout: Option<i64>, hours: f64) -> AttendanceRecord {
            AttendanceRecord {
                id,
                emp_id: "EMP001".to_string(),
                date: "2025-06-19".to_string(),
                login_time: Some(0),
                logout_time: logout,
                total_hours: hours,
                status: if logout.is_some() {
                    AttendanceStatus::Completed
                } else {
                    AttendanceStatus::Active
                },
                created_at: 0,
                updated_at: 0,
            }
        }

        let records = vec![row(1, Some(1), 8.5), row(2, None, 3.0), row(3, Some(1), 7.25)];
        assert_eq!(sum_completed_hours(&records), 15.75);
        assert_eq!(sum_completed_hours(&[]), 0.0);
    }
}
