//! Employee API Module

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::require_admin;
use crate::core::ServerState;

/// Employee router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/employees", routes())
}

fn routes() -> Router<ServerState> {
    // Read routes: any authenticated user
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{emp_id}", get(handler::get_by_emp_id));

    // Manage routes: admin only
    let manage_routes = Router::new()
        .route("/", axum::routing::post(handler::create))
        .route("/{emp_id}", axum::routing::put(handler::update))
        .route("/{emp_id}/status", axum::routing::patch(handler::set_status))
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(manage_routes)
}
