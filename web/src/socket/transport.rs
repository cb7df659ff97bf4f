use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use hub::error::TransportErrorKind;
use hub::{Error as HubError, Inbound, Outbound};
use log::*;

pub(crate) struct WsOutbound(pub SplitSink<WebSocket, Message>);

#[async_trait]
impl Outbound for WsOutbound {
    async fn send_text(&mut self, text: String) -> Result<(), HubError> {
        self.0
            .send(Message::Text(text))
            .await
            .map_err(|e| HubError::transport_with_source(TransportErrorKind::Send, e))
    }
}

pub(crate) struct WsInbound(pub SplitStream<WebSocket>);

#[async_trait]
impl Inbound for WsInbound {
    async fn next_text(&mut self) -> Option<Result<String, HubError>> {
        loop {
            let message = match self.0.next().await? {
                Ok(message) => message,
                Err(e) => {
                    return Some(Err(HubError::transport_with_source(
                        TransportErrorKind::Receive,
                        e,
                    )))
                }
            };

            match message {
                Message::Text(text) => return Some(Ok(text)),
                Message::Binary(bytes) => match String::from_utf8(bytes) {
                    Ok(text) => return Some(Ok(text)),
                    Err(_) => debug!("Ignoring binary frame that is not UTF-8"),
                },
                // axum answers pings itself
                Message::Ping(_) | Message::Pong(_) => {}
                Message::Close(_) => return None,
            }
        }
    }
}
