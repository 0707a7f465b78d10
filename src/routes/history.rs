//! History listing endpoints.
//!
//! Read-only views over persisted records: raw measurements, derived
//! comfort indices, and alerts, each filterable by room and time window.

use std::collections::HashMap;

use axum::{
    extract::Query, extract::State, http::StatusCode, response::IntoResponse, routing::get, Json,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use crate::models::{Measurement, ParamKind, Severity};
use crate::store::{AlertFilter, MeasurementFilter, Store, TimeWindow};

use super::{error_response, AppState};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/measurements", get(list_measurements))
        .route("/api/indices", get(list_indices))
        .route("/api/alerts", get(list_alerts))
}

/// Common range filters for history listings.
#[derive(Debug, Deserialize)]
struct HistoryQuery {
    room_id: Option<Uuid>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    limit: Option<i64>,
}

/// Measurement enriched with its room's name for readability.
#[derive(Serialize)]
struct MeasurementEntry {
    #[serde(flatten)]
    measurement: Measurement,
    room_name: Option<String>,
}

async fn list_measurements(
    Query(params): Query<HistoryQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    // ---
    info!("GET /api/measurements - {:?}", params);

    let filter = MeasurementFilter {
        room_id: params.room_id,
        window: TimeWindow {
            start: params.start,
            end: params.end,
        },
        limit: params.limit,
    };

    let measurements = match state.store.measurements(&filter).await {
        Ok(rows) => rows,
        Err(err) => {
            error!("Failed to list measurements: {}", err);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "persistence failure");
        }
    };

    let room_names: HashMap<Uuid, String> = match state.store.rooms().await {
        Ok(rooms) => rooms.into_iter().map(|r| (r.id, r.name)).collect(),
        Err(err) => {
            error!("Failed to list rooms: {}", err);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "persistence failure");
        }
    };

    let entries: Vec<MeasurementEntry> = measurements
        .into_iter()
        .map(|m| {
            let room_name = room_names.get(&m.room_id).cloned();
            MeasurementEntry {
                measurement: m,
                room_name,
            }
        })
        .collect();

    (StatusCode::OK, Json(entries)).into_response()
}

async fn list_indices(
    Query(params): Query<HistoryQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    // ---
    info!("GET /api/indices - {:?}", params);

    let Some(room_id) = params.room_id else {
        return error_response(StatusCode::BAD_REQUEST, "room_id is required");
    };
    let window = TimeWindow {
        start: params.start,
        end: params.end,
    };

    match state.store.comfort_indices(room_id, window).await {
        Ok(indices) => (StatusCode::OK, Json(indices)).into_response(),
        Err(err) => {
            error!("Failed to list comfort indices: {}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "persistence failure")
        }
    }
}

#[derive(Debug, Deserialize)]
struct AlertsQuery {
    room_id: Option<Uuid>,
    parameter: Option<String>,
    severity: Option<String>,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    limit: Option<i64>,
}

async fn list_alerts(
    Query(params): Query<AlertsQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    // ---
    info!("GET /api/alerts - {:?}", params);

    let parameter = match params.parameter.as_deref().map(str::parse::<ParamKind>) {
        None => None,
        Some(Ok(p)) => Some(p),
        Some(Err(err)) => return error_response(StatusCode::BAD_REQUEST, err),
    };
    let severity = match params.severity.as_deref().map(str::parse::<Severity>) {
        None => None,
        Some(Ok(s)) => Some(s),
        Some(Err(err)) => return error_response(StatusCode::BAD_REQUEST, err),
    };

    let filter = AlertFilter {
        room_id: params.room_id,
        parameter,
        severity,
        window: TimeWindow {
            start: params.start,
            end: params.end,
        },
        limit: params.limit,
    };

    match state.store.alerts(&filter).await {
        Ok(alerts) => (StatusCode::OK, Json(alerts)).into_response(),
        Err(err) => {
            error!("Failed to list alerts: {}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "persistence failure")
        }
    }
}
