//! Backend for the portfolio site: contact mailer, analytics ingestion and
//! project catalog, with a per-client request throttle in front of the
//! mailer and analytics routes.

pub mod catalog;
pub mod config;
pub mod error;
pub mod handlers;
pub mod mailer;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod state;
pub mod telemetry;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

// creating the router with routes
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api/contact", post(handlers::contact_handler))
        .route("/api/analytics", post(handlers::analytics_handler))
        .route("/api/projects", get(handlers::projects_handler))
        .route("/api/images", get(handlers::images_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
