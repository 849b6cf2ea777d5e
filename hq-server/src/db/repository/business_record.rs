//! Business Record Repository (trucker onboardings, delivery orders)
//!
//! The target evaluator only ever counts these by creator and day
//! window; the operations API also lists and creates them.

use super::{RepoError, RepoResult};
use shared::models::{
    DeliveryOrder, DeliveryOrderCreate, TruckerOnboarding, TruckerOnboardingCreate,
};
use sqlx::SqlitePool;

const TRUCKER_SELECT: &str = "SELECT id, truck_number, owner_name, owner_phone, origin_city, destination_city, created_by, created_at FROM trucker_onboarding";
const DELIVERY_SELECT: &str = "SELECT id, order_number, client_name, origin_city, destination_city, freight_amount, created_by, created_at FROM delivery_order";

// ── Counting (target evaluation) ────────────────────────────────────

pub async fn count_truckers_created_by(
    pool: &SqlitePool,
    emp_id: &str,
    start_ms: i64,
    end_ms: i64,
) -> RepoResult<i64> {
    let n = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM trucker_onboarding WHERE created_by = ? AND created_at >= ? AND created_at < ?",
    )
    .bind(emp_id)
    .bind(start_ms)
    .bind(end_ms)
    .fetch_one(pool)
    .await?;
    Ok(n)
}

pub async fn count_delivery_orders_created_by(
    pool: &SqlitePool,
    emp_id: &str,
    start_ms: i64,
    end_ms: i64,
) -> RepoResult<i64> {
    let n = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM delivery_order WHERE created_by = ? AND created_at >= ? AND created_at < ?",
    )
    .bind(emp_id)
    .bind(start_ms)
    .bind(end_ms)
    .fetch_one(pool)
    .await?;
    Ok(n)
}

// ── Trucker onboardings ─────────────────────────────────────────────

pub async fn create_trucker(
    pool: &SqlitePool,
    data: &TruckerOnboardingCreate,
    created_by: &str,
    now_ms: i64,
) -> RepoResult<TruckerOnboarding> {
    let id = shared::util::snowflake_id();

    sqlx::query(
        "INSERT INTO trucker_onboarding (id, truck_number, owner_name, owner_phone, origin_city, destination_city, created_by, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(&data.truck_number)
    .bind(&data.owner_name)
    .bind(&data.owner_phone)
    .bind(&data.origin_city)
    .bind(&data.destination_city)
    .bind(created_by)
    .bind(now_ms)
    .execute(pool)
    .await?;

    let sql = format!("{} WHERE id = ?", TRUCKER_SELECT);
    sqlx::query_as::<_, TruckerOnboarding>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create trucker onboarding".into()))
}

pub async fn find_truckers(
    pool: &SqlitePool,
    created_by: Option<&str>,
    window: Option<(i64, i64)>,
) -> RepoResult<Vec<TruckerOnboarding>> {
    let mut sql = format!("{} WHERE 1 = 1", TRUCKER_SELECT);
    if created_by.is_some() {
        sql.push_str(" AND created_by = ?");
    }
    if window.is_some() {
        sql.push_str(" AND created_at >= ? AND created_at < ?");
    }
    sql.push_str(" ORDER BY created_at DESC");

    let mut query = sqlx::query_as::<_, TruckerOnboarding>(&sql);
    if let Some(emp) = created_by {
        query = query.bind(emp);
    }
    if let Some((start, end)) = window {
        query = query.bind(start).bind(end);
    }
    let rows = query.fetch_all(pool).await?;
    Ok(rows)
}

// ── Delivery orders ─────────────────────────────────────────────────

pub async fn create_delivery_order(
    pool: &SqlitePool,
    data: &DeliveryOrderCreate,
    created_by: &str,
    now_ms: i64,
) -> RepoResult<DeliveryOrder> {
    let id = shared::util::snowflake_id();

    sqlx::query(
        "INSERT INTO delivery_order (id, order_number, client_name, origin_city, destination_city, freight_amount, created_by, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(&data.order_number)
    .bind(&data.client_name)
    .bind(&data.origin_city)
    .bind(&data.destination_city)
    .bind(data.freight_amount)
    .bind(created_by)
    .bind(now_ms)
    .execute(pool)
    .await?;

    let sql = format!("{} WHERE id = ?", DELIVERY_SELECT);
    sqlx::query_as::<_, DeliveryOrder>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create delivery order".into()))
}

pub async fn find_delivery_orders(
    pool: &SqlitePool,
    created_by: Option<&str>,
    window: Option<(i64, i64)>,
) -> RepoResult<Vec<DeliveryOrder>> {
    let mut sql = format!("{} WHERE 1 = 1", DELIVERY_SELECT);
    if created_by.is_some() {
        sql.push_str(" AND created_by = ?");
    }
    if window.is_some() {
        sql.push_str(" AND created_at >= ? AND created_at < ?");
    }
    sql.push_str(" ORDER BY created_at DESC");

    let mut query = sqlx::query_as::<_, DeliveryOrder>(&sql);
    if let Some(emp) = created_by {
        query = query.bind(emp);
    }
    if let Some((start, end)) = window {
        query = query.bind(start).bind(end);
    }
    let rows = query.fetch_all(pool).await?;
    Ok(rows)
}
