//! Target API Module

mod handler;

use axum::{Router, middleware, routing::get, routing::post};

use crate::auth::require_admin;
use crate::core::ServerState;

/// Target router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/targets", routes())
}

fn routes() -> Router<ServerState> {
    let employee_routes = Router::new()
        .route("/employee", get(handler::employee))
        .route("/monthly", get(handler::monthly))
        .route("/reason", post(handler::submit_reason));

    // Department rollups are a management view
    let admin_routes = Router::new()
        .route("/department", get(handler::department))
        .layer(middleware::from_fn(require_admin));

    employee_routes.merge(admin_routes)
}
