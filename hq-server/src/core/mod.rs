//! Core module
//!
//! # Structure
//!
//! - [`Config`] - runtime configuration from the environment
//! - [`ServerState`] - shared handles for handlers and schedulers
//! - [`Server`] - HTTP server lifecycle

pub mod config;
pub mod server;
pub mod state;

pub use config::Config;
pub use server::Server;
pub use state::ServerState;
