//! Shared types for the HQ back office
//!
//! Data models and small utilities used by the server and by tooling
//! that talks to its API.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
pub use util::{now_millis, snowflake_id};
