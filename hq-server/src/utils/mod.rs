//! Utility module with common helpers and types:
//! - [`AppError`] / [`AppResult`] - application error type and alias
//! - [`AppResponse`] - error response envelope
//! - time-range math, input validation, logging setup

pub mod error;
pub mod logger;
pub mod time;
pub mod validation;

// Re-exports
pub use error::{AppError, AppResponse, AppResult};
pub use time::TimeWindow;
