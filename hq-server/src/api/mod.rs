//! API Route Modules
//!
//! # Structure
//!
//! - [`health`] - liveness and component checks
//! - [`auth`] - login and current-user lookup
//! - [`employees`] - employee management
//! - [`attendance`] - session open/close, history, corrections
//! - [`targets`] - daily/monthly target evaluation and reasons
//! - [`records`] - trucker onboardings and delivery orders
//! - [`leaves`] - leave applications and decisions
//! - [`meetings`] - meeting scheduling

pub mod auth;
pub mod health;

pub mod attendance;
pub mod employees;
pub mod leaves;
pub mod meetings;
pub mod records;
pub mod targets;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};
