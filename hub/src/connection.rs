use crate::queue::QueueSender;
use dashmap::DashMap;
use log::*;
use std::fmt;

/// Unique identifier for a connection (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The set of live sessions, keyed by connection.
///
/// Iteration holds DashMap shard read locks, so a concurrent `unregister` from
/// another task simply waits for the shard; it never invalidates the iteration.
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, QueueSender>,

    /// When set, a session with this many undelivered messages is disconnected
    /// instead of receiving more.
    max_pending: Option<usize>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::with_max_pending(None)
    }

    pub fn with_max_pending(max_pending: Option<usize>) -> Self {
        Self {
            connections: DashMap::new(),
            // a cap of zero would drop every connection on its first broadcast
            max_pending: max_pending.filter(|&max| max > 0),
        }
    }

    /// Register a new connection - O(1)
    pub fn register(&self, queue: QueueSender) -> ConnectionId {
        let connection_id = ConnectionId::new();
        self.connections.insert(connection_id.clone(), queue);
        connection_id
    }

    /// Unregister a connection - O(1). Returns false if it was already gone.
    pub fn unregister(&self, connection_id: &ConnectionId) -> bool {
        self.connections.remove(connection_id).is_some()
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.connections.contains_key(connection_id)
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Enqueue the same message on every registered connection - O(n).
    /// Returns how many queues accepted it.
    pub fn broadcast(&self, message: &str) -> usize {
        let mut delivered = 0;
        let mut overflowed = Vec::new();

        for entry in self.connections.iter() {
            let queue = entry.value();
            if let Some(max_pending) = self.max_pending {
                if queue.pending() >= max_pending {
                    overflowed.push(entry.key().clone());
                    continue;
                }
            }

            match queue.push(message.to_string()) {
                Ok(()) => delivered += 1,
                Err(e) => warn!(
                    "Failed to send broadcast to connection {}: {e}. Connection will be cleaned up.",
                    entry.key()
                ),
            }
        }

        // Removing while iterating would deadlock on the shard lock.
        for connection_id in overflowed {
            warn!("Connection {connection_id} fell too far behind, disconnecting it");
            if let Some((_, queue)) = self.connections.remove(&connection_id) {
                queue.disconnect();
            }
        }

        delivered
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
