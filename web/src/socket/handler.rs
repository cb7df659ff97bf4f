use crate::socket::transport::{WsInbound, WsOutbound};
use axum::extract::ws::{WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::StreamExt;
use log::*;
use service::AppState;

/// Websocket handler that turns the connection into a long-lived session.
/// The client first receives the whole world, then every change as it happens;
/// anything it sends replaces the named entities.
pub(crate) async fn subscribe(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    debug!("Upgrading connection to a world subscription");

    ws.on_upgrade(move |socket| run_session(socket, app_state))
}

async fn run_session(socket: WebSocket, app_state: AppState) {
    // Register before touching the socket so the snapshot is the first thing queued
    let mut session = app_state.manager().open_session();
    let connection_id = session.id().clone();

    let (sink, stream) = socket.split();
    session.run(WsOutbound(sink), WsInbound(stream)).await;

    // Connection closed, `run` has already cleaned up
    debug!("Websocket for session {connection_id} finished");
}
