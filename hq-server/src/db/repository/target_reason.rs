//! Target Reason Repository

use super::{RepoError, RepoResult};
use shared::models::TargetReason;
use sqlx::SqlitePool;

const REASON_SELECT: &str = "SELECT id, emp_id, date, reason, submitted_by, created_at, updated_at FROM target_reason";

pub async fn find_by_emp_and_date(
    pool: &SqlitePool,
    emp_id: &str,
    date: &str,
) -> RepoResult<Option<TargetReason>> {
    let sql = format!("{} WHERE emp_id = ? AND date = ?", REASON_SELECT);
    let row = sqlx::query_as::<_, TargetReason>(&sql)
        .bind(emp_id)
        .bind(date)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Insert or overwrite the reason for (emp_id, date). Resubmission
/// always replaces the previous text and stamps the new submitter.
pub async fn upsert(
    pool: &SqlitePool,
    emp_id: &str,
    date: &str,
    reason: &str,
    submitted_by: &str,
) -> RepoResult<TargetReason> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();

    sqlx::query(
        "INSERT INTO target_reason (id, emp_id, date, reason, submitted_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?) ON CONFLICT(emp_id, date) DO UPDATE SET reason = excluded.reason, submitted_by = excluded.submitted_by, updated_at = excluded.updated_at",
    )
    .bind(id)
    .bind(emp_id)
    .bind(date)
    .bind(reason)
    .bind(submitted_by)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_emp_and_date(pool, emp_id, date)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to store target reason".into()))
}
