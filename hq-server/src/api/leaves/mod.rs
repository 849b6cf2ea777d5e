//! Leave Request API Module

mod handler;

use axum::{Router, middleware, routing::post};

use crate::auth::require_admin;
use crate::core::ServerState;

/// Leave request router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/leaves", routes())
}

fn routes() -> Router<ServerState> {
    let employee_routes = Router::new().route("/", post(handler::apply).get(handler::list));

    let admin_routes = Router::new()
        .route("/{id}/decision", axum::routing::patch(handler::decide))
        .layer(middleware::from_fn(require_admin));

    employee_routes.merge(admin_routes)
}
