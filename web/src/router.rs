use crate::{
    controller::{entity_controller, health_check_controller, world_controller},
    socket, AppState,
};
use axum::{response::Redirect, routing::get, Router};
use std::path::PathBuf;
use tower_http::services::ServeDir;

/// Where `/` sends a browser: the bundled client page.
const INDEX_PATH: &str = "/static/index.html";

pub fn define_routes(app_state: AppState) -> Router {
    let static_dir = app_state.config.static_dir().to_path_buf();

    Router::new()
        .merge(world_routes(app_state.clone()))
        .merge(entity_routes(app_state.clone()))
        .merge(subscribe_routes(app_state))
        .merge(health_routes())
        .merge(static_routes(static_dir))
}

fn world_routes(app_state: AppState) -> Router {
    Router::new()
        // Both verbs are accepted on these for compatibility with existing clients
        .route(
            "/world",
            get(world_controller::read).post(world_controller::read),
        )
        .route(
            "/clear",
            get(world_controller::clear).post(world_controller::clear),
        )
        .with_state(app_state)
}

fn entity_routes(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/entity/:entity",
            get(entity_controller::read)
                .post(entity_controller::merge)
                .put(entity_controller::replace),
        )
        .with_state(app_state)
}

fn subscribe_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/subscribe", get(socket::handler::subscribe))
        .with_state(app_state)
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

// Serves the browser client; `/` redirects into it
pub fn static_routes(static_dir: PathBuf) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to(INDEX_PATH) }))
        .nest_service("/static", ServeDir::new(static_dir))
}
