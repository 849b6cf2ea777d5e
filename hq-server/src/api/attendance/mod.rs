//! Attendance API Module

mod handler;

use axum::{Router, middleware, routing::get, routing::post};

use crate::auth::require_admin;
use crate::core::ServerState;

/// Attendance router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/attendance", routes())
}

fn routes() -> Router<ServerState> {
    let employee_routes = Router::new()
        .route("/login", post(handler::login))
        .route("/logout", post(handler::logout))
        .route("/history", get(handler::history));

    // Admin corrections for sessions the ledger got wrong
    let admin_routes = Router::new()
        .route("/{id}/status", axum::routing::patch(handler::set_status))
        .layer(middleware::from_fn(require_admin));

    employee_routes.merge(admin_routes)
}
