// src/routes/health.rs
//! API health check endpoint for the roomsense backend.
//!
//! Defines the `/health` route used by container orchestrators and CI
//! pipelines to verify the service is up and responding. Sibling module in
//! the `routes` directory (EMBP): the handler stays internal, the gateway
//! (`mod.rs`) merges the exported subrouter so `main.rs` never needs to know
//! about individual endpoints.

use axum::{routing::get, Json, Router};
use serde::Serialize;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    service: &'static str,
    status: &'static str,
}

/// Handle `GET /health`.
///
/// Deliberately lightweight: does not touch the database or the
/// notification channels.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "roomsense",
        status: "ok",
    })
}

/// Create a subrouter containing the `/health` route.
///
/// Generic over the application state so it merges cleanly with the gateway
/// router regardless of the state type.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health))
}
