use crate::connection::ConnectionRegistry;
use crate::message;
use events::{Error as HandlerError, EventHandler, WorldEvent};
use log::*;
use std::sync::Arc;

/// Turns world changes into websocket messages for every live session.
///
/// Registered as a listener on the `World`, so it runs while the world lock is
/// held: it serializes the change once and enqueues the identical text on every
/// session's queue, without waiting on any connection.
pub struct BroadcastHub {
    registry: Arc<ConnectionRegistry>,
}

impl BroadcastHub {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }
}

impl EventHandler for BroadcastHub {
    fn handle(&self, event: &WorldEvent) -> Result<(), HandlerError> {
        match event {
            WorldEvent::EntityChanged { entity, snapshot } => {
                let text =
                    message::encode_delta(entity, snapshot).map_err(HandlerError::serialization)?;
                let delivered = self.registry.broadcast(&text);

                debug!("Broadcast change of entity {entity} to {delivered} session(s)");
                Ok(())
            }
        }
    }
}
