//! Attendance domain
//!
//! Session accounting (login -> logout) per employee per calendar day,
//! plus the end-of-day absentee sweep.

pub mod ledger;

pub use ledger::{close_session, mark_absentees, open_session, sum_completed_hours};
