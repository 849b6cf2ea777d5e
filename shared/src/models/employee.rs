//! Employee Model

use serde::{Deserialize, Serialize};

/// Employee lifecycle status. Employees are never deleted, only flipped
/// to `inactive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

/// Employee entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: i64,
    /// Business key, distinct from the storage id
    pub emp_id: String,
    pub name: String,
    /// Login identity
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role string ("admin" or "employee")
    pub role: String,
    pub department: String,
    /// Display name used to match call records in the external call system
    pub alias_name: String,
    pub status: EmployeeStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Employee {
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }
}

/// Create employee payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeCreate {
    pub emp_id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    /// Defaults to "employee" when omitted
    pub role: Option<String>,
    pub department: String,
    pub alias_name: String,
}

/// Update employee payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub alias_name: Option<String>,
}

/// Status flip payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeStatusUpdate {
    pub status: EmployeeStatus,
}
