//! Meeting Model

use serde::{Deserialize, Serialize};

/// Scheduled meeting, consumed by the reminder schedulers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: i64,
    pub title: String,
    /// Epoch millis
    pub scheduled_at: i64,
    pub location: Option<String>,
    /// emp_id of the organizer
    pub organizer: String,
    /// Comma-separated emp_ids
    pub attendees: String,
    /// Set once the 10-minute scan has reminded everyone
    pub reminder_sent: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Meeting {
    /// Attendee emp_ids as a list (storage is comma-joined).
    pub fn attendee_ids(&self) -> Vec<&str> {
        self.attendees
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

/// Create meeting payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingCreate {
    pub title: String,
    pub scheduled_at: i64,
    pub location: Option<String>,
    pub attendees: Vec<String>,
}
