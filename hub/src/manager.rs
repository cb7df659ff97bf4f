use crate::broadcast::BroadcastHub;
use crate::connection::{ConnectionId, ConnectionRegistry};
use crate::message;
use crate::queue::{outbound_queue, QueueReceiver};
use crate::session::Session;
use log::*;
use std::sync::Arc;
use world::World;

/// Ties a `World` to the sessions that mirror it.
pub struct Manager {
    world: Arc<World>,
    registry: Arc<ConnectionRegistry>,
}

impl Manager {
    /// Creates a manager with unbounded session queues and registers its
    /// `BroadcastHub` as a listener on `world`.
    pub fn new(world: Arc<World>) -> Self {
        Self::with_max_pending(world, None)
    }

    pub fn with_max_pending(world: Arc<World>, max_pending: Option<usize>) -> Self {
        let registry = Arc::new(ConnectionRegistry::with_max_pending(max_pending));
        world.add_listener(Arc::new(BroadcastHub::new(registry.clone())));

        Self { world, registry }
    }

    pub fn world(&self) -> &Arc<World> {
        &self.world
    }

    pub fn connection_count(&self) -> usize {
        self.registry.len()
    }

    pub fn is_connected(&self, connection_id: &ConnectionId) -> bool {
        self.registry.contains(connection_id)
    }

    /// Starts a new `Session` in the `Active` state.
    pub fn open_session(self: &Arc<Self>) -> Session {
        Session::connect(Arc::clone(self))
    }

    /// Register a new connection and return its unique ID along with its queue.
    ///
    /// The world snapshot is taken, enqueued as the first message, and the
    /// connection registered, all under the world lock. Every broadcast is
    /// therefore either already part of the snapshot or queued after it.
    pub fn register_connection(&self) -> (ConnectionId, QueueReceiver) {
        let (sender, receiver) = outbound_queue();

        let connection_id = self.world.with_snapshot(|snapshot| {
            match message::encode_world(snapshot) {
                Ok(text) => {
                    if let Err(e) = sender.push(text) {
                        warn!("Failed to enqueue initial world snapshot: {e}");
                    }
                }
                Err(e) => error!("Failed to serialize world snapshot: {e}"),
            }
            self.registry.register(sender)
        });

        info!(
            "Registered new session {connection_id} ({} live)",
            self.registry.len()
        );
        (connection_id, receiver)
    }

    /// Unregister a connection by ID. Safe to call more than once.
    pub fn unregister_connection(&self, connection_id: &ConnectionId) {
        if self.registry.unregister(connection_id) {
            info!(
                "Unregistered session {connection_id} ({} live)",
                self.registry.len()
            );
        }
    }
}
