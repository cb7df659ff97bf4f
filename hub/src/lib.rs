//! Real-time fan-out of world changes to connected clients.
//!
//! # Architecture
//!
//! - **One queue per session**: Each connected client gets an unbounded, ordered
//!   outbound queue. Any writer may enqueue; only that session's writer loop drains it.
//! - **Registry of live sessions**: A DashMap keyed by server-generated connection id.
//!   Sessions add themselves on connect and remove themselves on disconnect.
//! - **Broadcast hub as a world listener**: Every `set`/`update` on the `World` is
//!   serialized once and enqueued on every registered session, while the world lock
//!   is held. All clients therefore see changes in the same order.
//! - **Snapshot first**: A new session's first message is the whole world, taken
//!   under the same lock as its registration.
//!
//! # Message Flow
//!
//! 1. Client opens a websocket on `/subscribe`
//! 2. `Manager::open_session` snapshots the world, queues it, and registers the session
//! 3. The session's reader applies each inbound `{entity: attributes, ...}` with `World::set`
//! 4. The world notifies the `BroadcastHub`, which enqueues `{entity: attributes}`
//!    on every session, the sender included
//! 5. Each session's writer drains its queue to its connection
//! 6. A closed stream, a read error, or a write error closes the session and removes
//!    it from the registry
//!
//! # Modules
//!
//! - `connection`: ConnectionRegistry and type-safe ConnectionId
//! - `manager`: Session registration and the world/registry wiring
//! - `broadcast`: The world listener that fans changes out
//! - `session`: Session state machine and its reader/writer loops
//! - `message`: Wire encoding and decoding
//! - `queue`: Per-session outbound queue

pub mod broadcast;
pub mod connection;
pub mod error;
pub mod manager;
pub mod message;
pub mod queue;
pub mod session;

pub use error::Error;
pub use manager::Manager;
pub use session::{Inbound, Outbound, Session, SessionState};
