//! Liveness check

use axum::{routing::get, Json, Router};

use super::envelope::Envelope;
use super::errors::method_not_allowed;

pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler).fallback(method_not_allowed))
}

/// Always 200 while the process is serving.
async fn health_handler() -> Json<Envelope> {
    Json(Envelope::message("Server is running"))
}
