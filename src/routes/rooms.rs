//! Room administration and the per-room live feed.
//!
//! Rooms are long-lived and administrator-managed; the only mutation is a
//! rename/edit. `GET /api/rooms/{id}/live` upgrades to a WebSocket that
//! forwards each ingested bundle for the room as JSON. The feed is lossy by
//! design; clients needing a complete record poll the history endpoints.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{http::StatusCode, Json, Router};
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::models::ReadingBundle;
use crate::store::Store;

use super::{error_response, AppState};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/rooms", get(list_rooms).post(create_room))
        .route("/api/rooms/{id}", get(get_room).put(update_room))
        .route("/api/rooms/{id}/live", get(live_feed))
}

#[derive(Debug, Deserialize)]
struct RoomPayload {
    name: String,
    #[serde(default)]
    description: String,
}

async fn create_room(
    State(state): State<AppState>,
    Json(payload): Json<RoomPayload>,
) -> impl IntoResponse {
    // ---
    info!("POST /api/rooms - {}", payload.name);

    if payload.name.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "name must not be empty");
    }

    match state
        .store
        .create_room(payload.name.trim(), &payload.description)
        .await
    {
        Ok(room) => (StatusCode::CREATED, Json(room)).into_response(),
        Err(err) => {
            error!("Failed to create room: {}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "persistence failure")
        }
    }
}

async fn list_rooms(State(state): State<AppState>) -> impl IntoResponse {
    // ---
    match state.store.rooms().await {
        Ok(rooms) => (StatusCode::OK, Json(rooms)).into_response(),
        Err(err) => {
            error!("Failed to list rooms: {}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "persistence failure")
        }
    }
}

async fn get_room(Path(id): Path<Uuid>, State(state): State<AppState>) -> impl IntoResponse {
    // ---
    match state.store.room(id).await {
        Ok(Some(room)) => (StatusCode::OK, Json(room)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, format!("room {id} not found")),
        Err(err) => {
            error!("Failed to fetch room: {}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "persistence failure")
        }
    }
}

async fn update_room(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<RoomPayload>,
) -> impl IntoResponse {
    // ---
    info!("PUT /api/rooms/{} - {}", id, payload.name);

    if payload.name.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "name must not be empty");
    }

    match state
        .store
        .update_room(id, payload.name.trim(), &payload.description)
        .await
    {
        Ok(Some(room)) => (StatusCode::OK, Json(room)).into_response(),
        Ok(None) => error_response(StatusCode::NOT_FOUND, format!("room {id} not found")),
        Err(err) => {
            error!("Failed to update room: {}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "persistence failure")
        }
    }
}

async fn live_feed(
    Path(id): Path<Uuid>,
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    // ---
    match state.store.room(id).await {
        Ok(Some(_)) => {
            let rx = state.notifier.subscribe(id);
            ws.on_upgrade(move |socket| forward_bundles(socket, rx))
        }
        Ok(None) => error_response(StatusCode::NOT_FOUND, format!("room {id} not found")),
        Err(err) => {
            error!("Failed to fetch room: {}", err);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "persistence failure")
        }
    }
}

async fn forward_bundles(
    mut socket: WebSocket,
    mut rx: broadcast::Receiver<Arc<ReadingBundle>>,
) {
    // ---
    loop {
        match rx.recv().await {
            Ok(bundle) => {
                let Ok(text) = serde_json::to_string(bundle.as_ref()) else {
                    continue;
                };
                if socket.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                debug!("live feed lagged, {} bundles dropped", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
