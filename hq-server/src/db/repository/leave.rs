//! Leave Request Repository

use super::{RepoError, RepoResult};
use shared::models::{LeaveApply, LeaveRequest, LeaveStatus};
use sqlx::SqlitePool;

const LEAVE_SELECT: &str = "SELECT id, emp_id, date_from, date_to, reason, status, decided_by, created_at, updated_at FROM leave_request";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<LeaveRequest>> {
    let sql = format!("{} WHERE id = ?", LEAVE_SELECT);
    let row = sqlx::query_as::<_, LeaveRequest>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Filtered listing, newest application first. Both filters optional.
pub async fn find_filtered(
    pool: &SqlitePool,
    emp_id: Option<&str>,
    status: Option<LeaveStatus>,
) -> RepoResult<Vec<LeaveRequest>> {
    let mut sql = format!("{} WHERE 1 = 1", LEAVE_SELECT);
    if emp_id.is_some() {
        sql.push_str(" AND emp_id = ?");
    }
    if status.is_some() {
        sql.push_str(" AND status = ?");
    }
    sql.push_str(" ORDER BY created_at DESC");

    let mut query = sqlx::query_as::<_, LeaveRequest>(&sql);
    if let Some(emp_id) = emp_id {
        query = query.bind(emp_id);
    }
    if let Some(status) = status {
        query = query.bind(status);
    }

    let rows = query.fetch_all(pool).await?;
    Ok(rows)
}

pub async fn create(
    pool: &SqlitePool,
    emp_id: &str,
    data: &LeaveApply,
    now_ms: i64,
) -> RepoResult<LeaveRequest> {
    let id = shared::util::snowflake_id();

    sqlx::query(
        "INSERT INTO leave_request (id, emp_id, date_from, date_to, reason, status, decided_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, 'PENDING', NULL, ?, ?)",
    )
    .bind(id)
    .bind(emp_id)
    .bind(&data.date_from)
    .bind(&data.date_to)
    .bind(&data.reason)
    .bind(now_ms)
    .bind(now_ms)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create leave request".into()))
}

/// Settles a pending request. Returns NotFound when the request does
/// not exist or was already decided.
pub async fn decide(
    pool: &SqlitePool,
    id: i64,
    status: LeaveStatus,
    decided_by: &str,
    now_ms: i64,
) -> RepoResult<LeaveRequest> {
    let result = sqlx::query(
        "UPDATE leave_request SET status = ?, decided_by = ?, updated_at = ? WHERE id = ? AND status = 'PENDING'",
    )
    .bind(status)
    .bind(decided_by)
    .bind(now_ms)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound("Pending leave request".into()));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound("Leave request not found".into()))
}

/// Employees with an approved leave covering the given day. Dates are
/// `YYYY-MM-DD`, so lexicographic range checks are correct.
pub async fn approved_emp_ids_covering(pool: &SqlitePool, date: &str) -> RepoResult<Vec<String>> {
    let rows = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT emp_id FROM leave_request WHERE status = 'APPROVED' AND date_from <= ? AND date_to >= ?",
    )
    .bind(date)
    .bind(date)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
