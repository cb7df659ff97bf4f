//! Event system infrastructure for the shared world.
//!
//! This crate provides the listener seam that lets the world store notify
//! interested parties (like the websocket broadcast hub) without depending on them.
//!
//! # Architecture
//!
//! - **WorldEvent**: Enum representing every change the store announces
//! - **EventHandler**: Trait for implementing listeners
//! - **EventPublisher**: Invokes registered handlers in registration order
//!
//! Handlers run synchronously on the thread that performed the mutation, so a
//! handler must be cheap: serialize and enqueue, never wait on I/O.

use log::*;
use serde_json::{Map, Value};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

pub mod error;

pub use error::Error;

/// The attribute mapping of a single entity.
pub type Attributes = Map<String, Value>;

/// Changes announced by the world store.
#[derive(Debug, Clone, PartialEq)]
pub enum WorldEvent {
    /// Emitted after every `set`/`update`, once the new value is visible.
    EntityChanged {
        /// Name of the entity that was written.
        entity: String,
        /// Copy of the entity's full attribute mapping right after the write.
        snapshot: Attributes,
    },
}

/// Trait for handling world events.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &WorldEvent) -> Result<(), Error>;
}

impl<F> EventHandler for F
where
    F: Fn(&WorldEvent) -> Result<(), Error> + Send + Sync,
{
    fn handle(&self, event: &WorldEvent) -> Result<(), Error> {
        self(event)
    }
}

/// Publishes world events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone, Default)]
pub struct EventPublisher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Builder form of `add_handler`.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.add_handler(handler);
        self
    }

    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Publish an event to all registered handlers.
    /// If a handler errors or panics we log it and continue with the remaining
    /// handlers; the caller never sees the failure.
    pub fn publish(&self, event: &WorldEvent) {
        for (index, handler) in self.handlers.iter().enumerate() {
            match panic::catch_unwind(AssertUnwindSafe(|| handler.handle(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Event handler #{index} failed: {e}"),
                Err(_) => error!("Event handler #{index} panicked while handling {event:?}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    fn changed(entity: &str) -> WorldEvent {
        let mut snapshot = Attributes::new();
        snapshot.insert("x".to_string(), json!(1));
        WorldEvent::EntityChanged {
            entity: entity.to_string(),
            snapshot,
        }
    }

    fn recorder(log: Arc<Mutex<Vec<String>>>, tag: &'static str) -> Arc<dyn EventHandler> {
        Arc::new(move |event: &WorldEvent| -> Result<(), Error> {
            let WorldEvent::EntityChanged { entity, .. } = event;
            log.lock().unwrap().push(format!("{tag}:{entity}"));
            Ok(())
        })
    }

    #[test]
    fn test_publish_calls_handlers_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let publisher = EventPublisher::new()
            .with_handler(recorder(log.clone(), "first"))
            .with_handler(recorder(log.clone(), "second"));

        publisher.publish(&changed("player1"));

        assert_eq!(
            *log.lock().unwrap(),
            vec!["first:player1".to_string(), "second:player1".to_string()]
        );
    }

    #[test]
    fn test_failing_handler_does_not_stop_later_handlers() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let failing: Arc<dyn EventHandler> =
            Arc::new(|_: &WorldEvent| -> Result<(), Error> { Err(Error::other("cannot deliver")) });
        let publisher = EventPublisher::new()
            .with_handler(failing)
            .with_handler(recorder(log.clone(), "after"));

        publisher.publish(&changed("player1"));

        assert_eq!(*log.lock().unwrap(), vec!["after:player1".to_string()]);
    }

    #[test]
    fn test_panicking_handler_is_isolated() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let panicking: Arc<dyn EventHandler> = Arc::new(|_: &WorldEvent| -> Result<(), Error> {
            panic!("listener blew up");
        });
        let publisher = EventPublisher::new()
            .with_handler(panicking)
            .with_handler(recorder(log.clone(), "after"));

        publisher.publish(&changed("player2"));

        assert_eq!(*log.lock().unwrap(), vec!["after:player2".to_string()]);
    }

    #[test]
    fn test_publish_with_no_handlers_is_a_no_op() {
        let publisher = EventPublisher::default();
        assert_eq!(publisher.handler_count(), 0);
        publisher.publish(&changed("nobody"));
    }
}
