use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::Serialize;

use crate::notify::Notifier;
use crate::pipeline::IngestionPipeline;
use crate::store::PgStore;

mod health;
mod history;
mod ingest;
mod reports;
mod rooms;

// ---

/// State shared by every route handler.
#[derive(Clone)]
pub struct AppState {
    pub store: PgStore,
    pub pipeline: Arc<IngestionPipeline<PgStore>>,
    pub notifier: Notifier,
}

pub fn router(state: AppState) -> Router {
    // ---
    Router::new()
        .merge(ingest::router())
        .merge(history::router())
        .merge(rooms::router())
        .merge(reports::router())
        .merge(health::router())
        .with_state(state)
}

/// JSON error body shared by all endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    // ---
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
        .into_response()
}
