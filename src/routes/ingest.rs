//! Reading ingestion endpoint.
//!
//! `POST /api/readings` pushes one raw reading through the ingestion
//! pipeline: the response carries the persisted measurement, its comfort
//! index, and any alerts the reading triggered.

use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};
use tracing::{debug, error, info};

use crate::error::IngestError;
use crate::models::NewReading;

use super::{error_response, AppState};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/readings", post(handler))
}

async fn handler(
    State(state): State<AppState>,
    Json(reading): Json<NewReading>,
) -> impl IntoResponse {
    // ---
    info!("POST /api/readings - room {}", reading.room_id);

    match state.pipeline.ingest(reading).await {
        Ok(bundle) => {
            debug!(
                "POST /api/readings - ingested measurement {}",
                bundle.measurement.id
            );
            (StatusCode::CREATED, Json(bundle)).into_response()
        }
        Err(err @ IngestError::RoomNotFound(_)) => {
            error_response(StatusCode::NOT_FOUND, err.to_string())
        }
        Err(err @ IngestError::InvalidReading(_)) => {
            error_response(StatusCode::BAD_REQUEST, err.to_string())
        }
        Err(IngestError::Persistence(err)) => {
            error!("Failed to persist reading: {}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "persistence failure")
        }
    }
}
