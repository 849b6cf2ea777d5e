//! Employee Repository

use super::{RepoError, RepoResult};
use shared::models::{Employee, EmployeeCreate, EmployeeStatus, EmployeeUpdate};
use sqlx::SqlitePool;

const EMPLOYEE_SELECT: &str = "SELECT id, emp_id, name, email, password_hash, role, department, alias_name, status, created_at, updated_at FROM employee";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Employee>> {
    let sql = format!("{} ORDER BY created_at DESC", EMPLOYEE_SELECT);
    let rows = sqlx::query_as::<_, Employee>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_emp_id(pool: &SqlitePool, emp_id: &str) -> RepoResult<Option<Employee>> {
    let sql = format!("{} WHERE emp_id = ?", EMPLOYEE_SELECT);
    let row = sqlx::query_as::<_, Employee>(&sql)
        .bind(emp_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<Employee>> {
    let sql = format!("{} WHERE email = ?", EMPLOYEE_SELECT);
    let row = sqlx::query_as::<_, Employee>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// All active employees across departments (absentee sweep roster).
pub async fn find_active(pool: &SqlitePool) -> RepoResult<Vec<Employee>> {
    let sql = format!(
        "{} WHERE status = 'active' ORDER BY emp_id ASC",
        EMPLOYEE_SELECT
    );
    let rows = sqlx::query_as::<_, Employee>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

/// Active employees of one department, ordered by emp_id. This is the
/// roster order every department report preserves.
pub async fn find_active_by_department(
    pool: &SqlitePool,
    department: &str,
) -> RepoResult<Vec<Employee>> {
    let sql = format!(
        "{} WHERE department = ? AND status = 'active' ORDER BY emp_id ASC",
        EMPLOYEE_SELECT
    );
    let rows = sqlx::query_as::<_, Employee>(&sql)
        .bind(department)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Insert a new employee. `password_hash` is already argon2-hashed;
/// the plaintext in `data.password` is never stored.
pub async fn create(
    pool: &SqlitePool,
    data: &EmployeeCreate,
    password_hash: &str,
) -> RepoResult<Employee> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let role = data.role.as_deref().unwrap_or("employee");

    sqlx::query(
        "INSERT INTO employee (id, emp_id, name, email, password_hash, role, department, alias_name, status, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'active', ?, ?)",
    )
    .bind(id)
    .bind(&data.emp_id)
    .bind(&data.name)
    .bind(&data.email)
    .bind(password_hash)
    .bind(role)
    .bind(&data.department)
    .bind(&data.alias_name)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_emp_id(pool, &data.emp_id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create employee".into()))
}

/// Partial update; `password_hash` replaces the stored hash when the
/// caller re-hashed a new password.
pub async fn update(
    pool: &SqlitePool,
    emp_id: &str,
    data: &EmployeeUpdate,
    password_hash: Option<&str>,
) -> RepoResult<Employee> {
    let now = shared::util::now_millis();

    let rows = sqlx::query(
        "UPDATE employee SET name = COALESCE(?, name), email = COALESCE(?, email), password_hash = COALESCE(?, password_hash), role = COALESCE(?, role), department = COALESCE(?, department), alias_name = COALESCE(?, alias_name), updated_at = ? WHERE emp_id = ?",
    )
    .bind(&data.name)
    .bind(&data.email)
    .bind(password_hash)
    .bind(&data.role)
    .bind(&data.department)
    .bind(&data.alias_name)
    .bind(now)
    .bind(emp_id)
    .execute(pool)
    .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Employee {emp_id} not found")));
    }
    find_by_emp_id(pool, emp_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Employee {emp_id} not found")))
}

/// Flip status; employees are never deleted.
pub async fn set_status(
    pool: &SqlitePool,
    emp_id: &str,
    status: EmployeeStatus,
) -> RepoResult<Employee> {
    let now = shared::util::now_millis();

    let rows = sqlx::query("UPDATE employee SET status = ?, updated_at = ? WHERE emp_id = ?")
        .bind(status)
        .bind(now)
        .bind(emp_id)
        .execute(pool)
        .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Employee {emp_id} not found")));
    }
    find_by_emp_id(pool, emp_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Employee {emp_id} not found")))
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employee")
        .fetch_one(pool)
        .await?;
    Ok(n)
}
