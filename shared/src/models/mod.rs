//! Data models
//!
//! Shared between hq-server and API consumers.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY); timestamps are epoch
//! millis; calendar days are `YYYY-MM-DD` strings in the business zone.

pub mod attendance;
pub mod business_record;
pub mod employee;
pub mod leave;
pub mod meeting;
pub mod target_reason;

// Re-exports
pub use attendance::*;
pub use business_record::*;
pub use employee::*;
pub use leave::*;
pub use meeting::*;
pub use target_reason::*;
