use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use log::*;

/// GET (or POST) the whole world as `{entity: attributes, ...}`.
pub async fn read(State(app_state): State<AppState>) -> impl IntoResponse {
    debug!("GET World");

    Json(app_state.world().world_snapshot())
}

/// GET (or POST) to drop every entity. Connected clients are not told; they see
/// the empty world the next time they connect.
pub async fn clear(State(app_state): State<AppState>) -> impl IntoResponse {
    debug!("Clear World");

    app_state.world().clear();

    (StatusCode::OK, "world cleared!")
}
