//! Attendance Model

use serde::{Deserialize, Serialize};

/// Attendance session status.
///
/// `Active` means logged in with no logout yet. An `Active` row from a
/// past date is an anomaly (the absentee job never touches rows that
/// already exist), not "still working".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "camelCase")]
pub enum AttendanceStatus {
    Active,
    Completed,
    Short,
    Absent,
    OnLeave,
}

/// One attendance session per (emp_id, date); the pair is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: i64,
    pub emp_id: String,
    /// Business day, `YYYY-MM-DD`
    pub date: String,
    /// Epoch millis; null for rows written by the absentee job
    pub login_time: Option<i64>,
    pub logout_time: Option<i64>,
    /// Derived on logout, 2 decimals
    pub total_hours: f64,
    pub status: AttendanceStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Admin correction payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceStatusUpdate {
    pub status: AttendanceStatus,
}
