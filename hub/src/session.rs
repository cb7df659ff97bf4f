//! One connected client: its outbound queue plus the reader and writer loops that
//! move messages between that queue, the world, and the connection.
//!
//! The connection itself is abstracted behind `Outbound` and `Inbound` so the
//! lifecycle here does not depend on any particular websocket library.

use crate::connection::ConnectionId;
use crate::error::Error;
use crate::manager::Manager;
use crate::message;
use crate::queue::QueueReceiver;
use async_trait::async_trait;
use log::*;
use std::sync::Arc;
use world::World;

/// Sending half of a client connection.
#[async_trait]
pub trait Outbound: Send {
    async fn send_text(&mut self, text: String) -> Result<(), Error>;
}

/// Receiving half of a client connection.
#[async_trait]
pub trait Inbound: Send {
    /// Waits for the next text message. `None` means the client closed the stream.
    async fn next_text(&mut self) -> Option<Result<String, Error>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Active,
    Closing,
    Closed,
}

pub struct Session {
    id: ConnectionId,
    manager: Arc<Manager>,
    queue: QueueReceiver,
    state: SessionState,
}

impl Session {
    /// Registers with the manager, which queues the world snapshot as this
    /// session's first message.
    pub fn connect(manager: Arc<Manager>) -> Self {
        trace!("Session state: {:?}", SessionState::Connecting);
        let (id, queue) = manager.register_connection();

        Self {
            id,
            manager,
            queue,
            state: SessionState::Active,
        }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Runs the reader and writer loops until either one stops, or the hub asks
    /// the session to disconnect, then closes the session. Any loop still running
    /// is cancelled.
    pub async fn run<O, I>(&mut self, outbound: O, inbound: I)
    where
        O: Outbound,
        I: Inbound,
    {
        if self.state != SessionState::Active {
            return;
        }

        let world = Arc::clone(self.manager.world());
        let disconnect = self.queue.disconnect_signal();
        tokio::select! {
            _ = read_loop(&self.id, &world, inbound) => {
                debug!("Session {} stopped reading", self.id);
            }
            _ = write_loop(&self.id, &mut self.queue, outbound) => {
                debug!("Session {} stopped writing", self.id);
            }
            _ = disconnect.wait() => {
                info!("Session {} disconnected for falling behind", self.id);
            }
        }

        self.close();
    }

    /// Removes the session from the registry and refuses further messages.
    /// Calling this again is a no-op.
    pub fn close(&mut self) {
        if matches!(self.state, SessionState::Closing | SessionState::Closed) {
            return;
        }

        self.state = SessionState::Closing;
        self.manager.unregister_connection(&self.id);
        self.queue.close();
        self.state = SessionState::Closed;

        info!("Session {} closed", self.id);
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // Covers a session whose task was cancelled before `run` could close it.
        self.close();
    }
}

async fn read_loop<I: Inbound>(id: &ConnectionId, world: &World, mut inbound: I) {
    while let Some(frame) = inbound.next_text().await {
        match frame {
            Ok(text) => match apply_inbound(world, &text) {
                Ok(count) => trace!("Session {id} replaced {count} entities"),
                Err(e) => debug!("Session {id} dropped malformed message: {e}"),
            },
            Err(e) => {
                debug!("Session {id} failed to read: {e}");
                return;
            }
        }
    }
    debug!("Session {id} reached end of stream");
}

async fn write_loop<O: Outbound>(id: &ConnectionId, queue: &mut QueueReceiver, mut outbound: O) {
    while let Some(text) = queue.recv().await {
        if let Err(e) = outbound.send_text(text).await {
            debug!("Session {id} failed to write: {e}");
            return;
        }
    }
    debug!("Session {id} outbound queue closed");
}

/// Applies every top-level key of an inbound message as a whole-entity `set`.
fn apply_inbound(world: &World, text: &str) -> Result<usize, Error> {
    let updates = message::decode_updates(text)?;
    let count = updates.len();
    for (entity, attributes) in updates {
        world.set(&entity, attributes);
    }
    Ok(count)
}
