//! HTTP and websocket front end for the shared world.

use axum::http::{header, HeaderValue, Method};
use log::*;
use service::config::Config;
use std::io;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use self::error::{Error, Result};
pub use router::define_routes;
pub use service::AppState;

mod controller;
pub mod error;
mod extractors;
mod router;
mod socket;

/// Binds the configured interface and port, then serves until the process exits.
pub async fn init_server(app_state: AppState) -> io::Result<()> {
    let interface = app_state.config.interface().to_string();
    let port = app_state.config.port;

    let listener = TcpListener::bind((interface.as_str(), port)).await?;
    info!(
        "Server listening on {} ({} environment)",
        listener.local_addr()?,
        app_state.config.runtime_env()
    );

    serve(listener, app_state).await
}

/// Serves the application on an already bound listener.
pub async fn serve(listener: TcpListener, app_state: AppState) -> io::Result<()> {
    let cors = cors_layer(&app_state.config);
    let router = define_routes(app_state).layer(cors);

    axum::serve(listener, router).await
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {origin}: {e}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE])
}
