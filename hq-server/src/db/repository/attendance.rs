//! Attendance Repository
//!
//! One row per (emp_id, date); the UNIQUE index is the concurrency
//! guard for both logins and the absentee job.

use super::{RepoError, RepoResult};
use shared::models::{AttendanceRecord, AttendanceStatus};
use sqlx::SqlitePool;

const ATTENDANCE_SELECT: &str = "SELECT id, emp_id, date, login_time, logout_time, total_hours, status, created_at, updated_at FROM attendance";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<AttendanceRecord>> {
    let sql = format!("{} WHERE id = ?", ATTENDANCE_SELECT);
    let row = sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_emp_and_date(
    pool: &SqlitePool,
    emp_id: &str,
    date: &str,
) -> RepoResult<Option<AttendanceRecord>> {
    let sql = format!("{} WHERE emp_id = ? AND date = ?", ATTENDANCE_SELECT);
    let row = sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(emp_id)
        .bind(date)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_active(
    pool: &SqlitePool,
    emp_id: &str,
    date: &str,
) -> RepoResult<Option<AttendanceRecord>> {
    let sql = format!(
        "{} WHERE emp_id = ? AND date = ? AND status = 'ACTIVE'",
        ATTENDANCE_SELECT
    );
    let row = sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(emp_id)
        .bind(date)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Insert the login row for today. A concurrent duplicate hits the
/// unique index and comes back as `RepoError::Duplicate`.
pub async fn insert_login(
    pool: &SqlitePool,
    emp_id: &str,
    date: &str,
    login_ms: i64,
) -> RepoResult<AttendanceRecord> {
    let id = shared::util::snowflake_id();

    sqlx::query(
        "INSERT INTO attendance (id, emp_id, date, login_time, total_hours, status, created_at, updated_at) VALUES (?, ?, ?, ?, 0, 'ACTIVE', ?, ?)",
    )
    .bind(id)
    .bind(emp_id)
    .bind(date)
    .bind(login_ms)
    .bind(login_ms)
    .bind(login_ms)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create attendance record".into()))
}

/// Close an ACTIVE row. The status guard keeps a racing double-logout
/// from overwriting the first close.
pub async fn close(
    pool: &SqlitePool,
    id: i64,
    logout_ms: i64,
    total_hours: f64,
) -> RepoResult<AttendanceRecord> {
    let rows = sqlx::query(
        "UPDATE attendance SET logout_time = ?, total_hours = ?, status = 'COMPLETED', updated_at = ? WHERE id = ? AND status = 'ACTIVE'",
    )
    .bind(logout_ms)
    .bind(total_hours)
    .bind(logout_ms)
    .bind(id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound("No active session".into()));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound("No active session".into()))
}

/// Sessions for one employee, newest-first, optionally clipped to an
/// inclusive `[date_from, date_to]` window.
pub async fn find_history(
    pool: &SqlitePool,
    emp_id: &str,
    date_from: Option<&str>,
    date_to: Option<&str>,
) -> RepoResult<Vec<AttendanceRecord>> {
    let mut sql = format!("{} WHERE emp_id = ?", ATTENDANCE_SELECT);
    if date_from.is_some() {
        sql.push_str(" AND date >= ?");
    }
    if date_to.is_some() {
        sql.push_str(" AND date <= ?");
    }
    sql.push_str(" ORDER BY date DESC");

    let mut query = sqlx::query_as::<_, AttendanceRecord>(&sql).bind(emp_id);
    if let Some(from) = date_from {
        query = query.bind(from);
    }
    if let Some(to) = date_to {
        query = query.bind(to);
    }
    let rows = query.fetch_all(pool).await?;
    Ok(rows)
}

/// emp_ids that already have any row for the given day.
pub async fn emp_ids_with_record_on(pool: &SqlitePool, date: &str) -> RepoResult<Vec<String>> {
    let ids = sqlx::query_scalar::<_, String>("SELECT emp_id FROM attendance WHERE date = ?")
        .bind(date)
        .fetch_all(pool)
        .await?;
    Ok(ids)
}

/// Most recent day with any attendance row; None on an empty table.
/// Dates sort lexicographically, so MAX is the latest day.
pub async fn latest_date(pool: &SqlitePool) -> RepoResult<Option<String>> {
    let date = sqlx::query_scalar::<_, Option<String>>("SELECT MAX(date) FROM attendance")
        .fetch_one(pool)
        .await?;
    Ok(date)
}

pub async fn find_by_date_and_status(
    pool: &SqlitePool,
    date: &str,
    status: AttendanceStatus,
) -> RepoResult<Vec<AttendanceRecord>> {
    let sql = format!(
        "{} WHERE date = ? AND status = ? ORDER BY emp_id ASC",
        ATTENDANCE_SELECT
    );
    let rows = sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(date)
        .bind(status)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Bulk-insert zero-hour rows for absentees (status ABSENT or
/// ON_LEAVE). INSERT OR IGNORE + the unique index make re-runs and
/// races with concurrent logins insert nothing. Returns how many rows
/// actually landed.
pub async fn insert_absent_bulk(
    pool: &SqlitePool,
    marks: &[(String, AttendanceStatus)],
    date: &str,
    now_ms: i64,
) -> RepoResult<u64> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0u64;

    for (emp_id, status) in marks {
        let id = shared::util::snowflake_id();
        let result = sqlx::query(
            "INSERT OR IGNORE INTO attendance (id, emp_id, date, login_time, logout_time, total_hours, status, created_at, updated_at) VALUES (?, ?, ?, NULL, NULL, 0, ?, ?, ?)",
        )
        .bind(id)
        .bind(emp_id)
        .bind(date)
        .bind(status)
        .bind(now_ms)
        .bind(now_ms)
        .execute(&mut *tx)
        .await?;
        inserted += result.rows_affected();
    }

    tx.commit().await?;
    Ok(inserted)
}

/// Admin correction of a day's status.
pub async fn set_status(
    pool: &SqlitePool,
    id: i64,
    status: AttendanceStatus,
    now_ms: i64,
) -> RepoResult<AttendanceRecord> {
    let rows = sqlx::query("UPDATE attendance SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now_ms)
        .bind(id)
        .execute(pool)
        .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!(
            "Attendance record {id} not found"
        )));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Attendance record {id} not found")))
}
