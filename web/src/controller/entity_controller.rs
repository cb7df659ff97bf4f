use crate::extractors::json_body::JsonBody;
use crate::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use log::*;

/// GET a particular entity's attributes. Unknown entities are an empty object.
pub async fn read(
    State(app_state): State<AppState>,
    Path(entity): Path<String>,
) -> impl IntoResponse {
    debug!("GET Entity {entity}");

    Json(app_state.world().get(&entity))
}

/// POST merges each key of the body into the entity, leaving other keys alone.
pub async fn merge(
    State(app_state): State<AppState>,
    Path(entity): Path<String>,
    JsonBody(attributes): JsonBody,
) -> impl IntoResponse {
    debug!("POST Merge into Entity {entity}: {attributes:?}");

    let merged = app_state.world().merge(&entity, attributes);

    debug!("Merged Entity {entity}: {merged:?}");

    Json(merged)
}

/// PUT replaces the entity's attributes with the body.
pub async fn replace(
    State(app_state): State<AppState>,
    Path(entity): Path<String>,
    JsonBody(attributes): JsonBody,
) -> impl IntoResponse {
    debug!("PUT Replace Entity {entity}: {attributes:?}");

    Json(app_state.world().set(&entity, attributes))
}
