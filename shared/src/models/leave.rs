//! Leave Request Model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

/// Leave request entity. Approved leave covering a date turns that
/// day's absentee marking into `ON_LEAVE`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub id: i64,
    pub emp_id: String,
    /// Inclusive, `YYYY-MM-DD`
    pub date_from: String,
    /// Inclusive, `YYYY-MM-DD`
    pub date_to: String,
    pub reason: String,
    pub status: LeaveStatus,
    /// emp_id of the deciding admin
    pub decided_by: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Apply for leave payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveApply {
    pub date_from: String,
    pub date_to: String,
    pub reason: String,
}

/// Approve/reject payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveDecision {
    pub approve: bool,
}
