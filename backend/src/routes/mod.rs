//! Route definitions for the Pharmacy Inventory Management System

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Protected routes - medication catalog
        .nest("/medications", medication_routes())
        // Protected routes - stock movements
        .nest("/movements", movement_routes())
        // Protected routes - stock alerts
        .nest("/alerts", alert_routes())
}

/// Medication catalog routes (protected)
fn medication_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_medications).post(handlers::create_medication),
        )
        .route(
            "/:medication_id",
            get(handlers::get_medication)
                .put(handlers::update_medication)
                .delete(handlers::delete_medication),
        )
        .route(
            "/:medication_id/movements",
            get(handlers::get_medication_movements),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock movement routes (protected)
fn movement_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_movements))
        .route("/sales", post(handlers::record_sale))
        .route("/purchases", post(handlers::record_purchase))
        .route("/adjustments", post(handlers::record_adjustment))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock alert routes (protected)
fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_alerts))
        .route_layer(middleware::from_fn(auth_middleware))
}
