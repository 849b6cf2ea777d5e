//! Business Records API Module
//!
//! Trucker onboardings and delivery orders; the target evaluator
//! counts these per creator and day.

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

/// Business records router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/records", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/truckers",
            post(handler::create_trucker).get(handler::list_truckers),
        )
        .route(
            "/delivery-orders",
            post(handler::create_delivery_order).get(handler::list_delivery_orders),
        )
}
