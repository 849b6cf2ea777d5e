//! Meeting Repository

use super::{RepoError, RepoResult};
use shared::models::{Meeting, MeetingCreate};
use sqlx::SqlitePool;

const MEETING_SELECT: &str = "SELECT id, title, scheduled_at, location, organizer, attendees, reminder_sent, created_at, updated_at FROM meeting";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Meeting>> {
    let sql = format!("{} WHERE id = ?", MEETING_SELECT);
    let row = sqlx::query_as::<_, Meeting>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Meetings scheduled inside `[start_ms, end_ms)`, earliest first.
pub async fn find_in_range(
    pool: &SqlitePool,
    start_ms: i64,
    end_ms: i64,
) -> RepoResult<Vec<Meeting>> {
    let sql = format!(
        "{} WHERE scheduled_at >= ? AND scheduled_at < ? ORDER BY scheduled_at ASC",
        MEETING_SELECT
    );
    let rows = sqlx::query_as::<_, Meeting>(&sql)
        .bind(start_ms)
        .bind(end_ms)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Upcoming meetings inside `[start_ms, end_ms)` whose reminder has
/// not gone out yet.
pub async fn find_unreminded_between(
    pool: &SqlitePool,
    start_ms: i64,
    end_ms: i64,
) -> RepoResult<Vec<Meeting>> {
    let sql = format!(
        "{} WHERE reminder_sent = 0 AND scheduled_at >= ? AND scheduled_at < ? ORDER BY scheduled_at ASC",
        MEETING_SELECT
    );
    let rows = sqlx::query_as::<_, Meeting>(&sql)
        .bind(start_ms)
        .bind(end_ms)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn create(
    pool: &SqlitePool,
    data: &MeetingCreate,
    organizer: &str,
    now_ms: i64,
) -> RepoResult<Meeting> {
    let id = shared::util::snowflake_id();
    let attendees = data.attendees.join(",");

    sqlx::query(
        "INSERT INTO meeting (id, title, scheduled_at, location, organizer, attendees, reminder_sent, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, 0, ?, ?)",
    )
    .bind(id)
    .bind(&data.title)
    .bind(data.scheduled_at)
    .bind(&data.location)
    .bind(organizer)
    .bind(attendees)
    .bind(now_ms)
    .bind(now_ms)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create meeting".into()))
}

pub async fn mark_reminded(pool: &SqlitePool, id: i64, now_ms: i64) -> RepoResult<()> {
    let result = sqlx::query("UPDATE meeting SET reminder_sent = 1, updated_at = ? WHERE id = ?")
        .bind(now_ms)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound("Meeting not found".into()));
    }
    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let result = sqlx::query("DELETE FROM meeting WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepoError::NotFound("Meeting not found".into()));
    }
    Ok(())
}
