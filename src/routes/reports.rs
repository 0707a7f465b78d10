//! Reporting endpoints: windowed statistics and trend evolution.
//!
//! Both are read-only projections over persisted comfort index history and
//! always take the room as a caller-supplied parameter.

use axum::{
    extract::Query, extract::State, http::StatusCode, response::IntoResponse, routing::get, Json,
    Router,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::evolution::{self, Granularity, TrendBucket};
use crate::stats;
use crate::store::{Store, TimeWindow};

use super::{error_response, AppState};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/stats", get(statistics))
        .route("/api/evolution", get(trend))
}

#[derive(Debug, Deserialize)]
struct StatsQuery {
    room_id: Uuid,
    /// Trailing window length in days.
    #[serde(default = "default_days")]
    days: u32,
}

fn default_days() -> u32 {
    7
}

async fn statistics(
    Query(params): Query<StatsQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    // ---
    info!("GET /api/stats - room {} over {} days", params.room_id, params.days);

    match state.store.room(params.room_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return error_response(
                StatusCode::NOT_FOUND,
                format!("room {} not found", params.room_id),
            )
        }
        Err(err) => {
            error!("Failed to fetch room: {}", err);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "persistence failure");
        }
    }

    let end = Utc::now();
    let window = TimeWindow {
        start: Some(end - Duration::days(i64::from(params.days))),
        end: Some(end),
    };

    let indices = match state.store.comfort_indices(params.room_id, window).await {
        Ok(rows) => rows,
        Err(err) => {
            error!("Failed to fetch comfort indices: {}", err);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "persistence failure");
        }
    };
    let alert_count = match state.store.alert_count(params.room_id, window).await {
        Ok(count) => count,
        Err(err) => {
            error!("Failed to count alerts: {}", err);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "persistence failure");
        }
    };

    let summary = stats::summarize(&indices, alert_count, params.days);
    (StatusCode::OK, Json(summary)).into_response()
}

#[derive(Debug, Deserialize)]
struct EvolutionQuery {
    room_id: Uuid,
    /// Bucket width; defaults to day.
    #[serde(default)]
    period: Granularity,
}

async fn trend(
    Query(params): Query<EvolutionQuery>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    // ---
    info!(
        "GET /api/evolution - room {} by {:?}",
        params.room_id, params.period
    );

    match state.store.room(params.room_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return error_response(
                StatusCode::NOT_FOUND,
                format!("room {} not found", params.room_id),
            )
        }
        Err(err) => {
            error!("Failed to fetch room: {}", err);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "persistence failure");
        }
    }

    let earliest = match state.store.earliest_index_timestamp(params.room_id).await {
        Ok(ts) => ts,
        Err(err) => {
            error!("Failed to query earliest index: {}", err);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "persistence failure");
        }
    };
    let Some(start) = earliest else {
        // No history yet: an empty series, not an error
        return (StatusCode::OK, Json(Vec::<TrendBucket>::new())).into_response();
    };

    let window = TimeWindow {
        start: Some(start),
        end: Some(Utc::now()),
    };
    let history = match state.store.comfort_indices(params.room_id, window).await {
        Ok(rows) => rows,
        Err(err) => {
            error!("Failed to fetch comfort indices: {}", err);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "persistence failure");
        }
    };

    let buckets = evolution::aggregate(&history, params.period);
    (StatusCode::OK, Json(buckets)).into_response()
}
