//! hq-server - HR and operations back office
//!
//! # Overview
//!
//! Single-node back office for a logistics company:
//!
//! - **Attendance** (`attendance`): login/logout sessions and absentee marking
//! - **Targets** (`targets`): daily and monthly work-target evaluation
//! - **Auth** (`auth`): JWT + Argon2 authentication
//! - **Database** (`db`): embedded SQLite storage
//! - **HTTP API** (`api`): RESTful endpoints
//! - **Services** (`services`): call-analytics vendor, mail, schedulers
//!
//! # Module structure
//!
//! ```text
//! hq-server/src/
//! ├── core/          # configuration, state, server lifecycle
//! ├── auth/          # JWT authentication, role checks
//! ├── api/           # HTTP routes and handlers
//! ├── attendance/    # attendance session ledger
//! ├── targets/       # target policies, evaluation, reports
//! ├── services/      # vendor client, mailer, schedulers, router
//! ├── db/            # database layer and repositories
//! └── utils/         # errors, time windows, validation, logging
//! ```

pub mod api;
pub mod attendance;
pub mod auth;
pub mod core;
pub mod db;
pub mod services;
pub mod targets;
pub mod utils;

// Re-export common types
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
