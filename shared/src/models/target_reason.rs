//! Target Reason Model

use serde::{Deserialize, Serialize};

/// Free-text justification for an incomplete target day.
/// One row per (emp_id, date); resubmission overwrites the text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct TargetReason {
    pub id: i64,
    pub emp_id: String,
    /// Business day, `YYYY-MM-DD`
    pub date: String,
    /// 10..=500 chars
    pub reason: String,
    /// emp_id of whoever submitted (the employee or an admin)
    pub submitted_by: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Submit reason payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetReasonSubmit {
    /// Defaults to the authenticated employee
    pub emp_id: Option<String>,
    pub date: String,
    pub reason: String,
}
