//! The shared world: a process-wide mapping of entity name to attribute mapping.
//!
//! Every mutation goes through a single lock, and listeners are notified while that
//! lock is still held. This gives all observers the same total order of changes,
//! no matter how many tasks are writing concurrently.
//!
//! Listeners must not call back into the `World` they are registered with; the lock
//! is not reentrant.

use events::{EventHandler, EventPublisher, WorldEvent};
use log::*;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub use events::Attributes;

/// A point-in-time copy of every entity in the world.
pub type WorldSnapshot = BTreeMap<String, Attributes>;

#[derive(Default)]
pub struct World {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    space: WorldSnapshot,
    publisher: EventPublisher,
}

impl Inner {
    fn get(&self, entity: &str) -> Attributes {
        self.space.get(entity).cloned().unwrap_or_default()
    }

    fn update(&mut self, entity: &str, key: &str, value: Value) -> Attributes {
        self.space
            .entry(entity.to_string())
            .or_default()
            .insert(key.to_string(), value);
        self.notify(entity)
    }

    // Must only be called after the write to `entity` is in `space`.
    fn notify(&self, entity: &str) -> Attributes {
        let snapshot = self.get(entity);
        self.publisher.publish(&WorldEvent::EntityChanged {
            entity: entity.to_string(),
            snapshot: snapshot.clone(),
        });
        snapshot
    }
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` to be called after every future `set`/`update`.
    pub fn add_listener(&self, handler: Arc<dyn EventHandler>) {
        let mut inner = self.lock();
        inner.publisher.add_handler(handler);
        debug!(
            "Registered world listener ({} total)",
            inner.publisher.handler_count()
        );
    }

    /// Replaces the entity's whole attribute mapping with `data`.
    pub fn set(&self, entity: &str, data: Attributes) -> Attributes {
        let mut inner = self.lock();
        inner.space.insert(entity.to_string(), data);
        trace!("Set entity {entity}");
        inner.notify(entity)
    }

    /// Sets a single attribute, creating the entity if needed.
    pub fn update(&self, entity: &str, key: &str, value: Value) -> Attributes {
        trace!("Update entity {entity} key {key}");
        self.lock().update(entity, key, value)
    }

    /// Applies `update` for every key of `attributes`, in order, without letting
    /// another writer interleave. Listeners hear about each key separately.
    pub fn merge(&self, entity: &str, attributes: Attributes) -> Attributes {
        let mut inner = self.lock();
        let mut current = inner.get(entity);
        for (key, value) in attributes {
            current = inner.update(entity, &key, value);
        }
        current
    }

    /// Returns the entity's attributes, or an empty mapping for an unknown entity.
    pub fn get(&self, entity: &str) -> Attributes {
        self.lock().get(entity)
    }

    /// Drops every entity. Listeners are not notified.
    pub fn clear(&self) {
        let mut inner = self.lock();
        info!("Clearing world of {} entities", inner.space.len());
        inner.space.clear();
    }

    pub fn world_snapshot(&self) -> WorldSnapshot {
        self.lock().space.clone()
    }

    /// Runs `f` against the current world while holding the write lock, so no
    /// mutation (and therefore no listener call) can happen until `f` returns.
    pub fn with_snapshot<R>(&self, f: impl FnOnce(&WorldSnapshot) -> R) -> R {
        let inner = self.lock();
        f(&inner.space)
    }

    pub fn len(&self) -> usize {
        self.lock().space.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Listener panics are caught by the publisher, so a poisoned lock still
        // guards a consistent world.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use events::Error as HandlerError;
    use serde_json::json;
    use std::thread;

    fn attrs(value: Value) -> Attributes {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    fn recording_world() -> (World, Arc<Mutex<Vec<WorldEvent>>>) {
        let world = World::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        world.add_listener(Arc::new(
            move |event: &WorldEvent| -> Result<(), HandlerError> {
                sink.lock().unwrap().push(event.clone());
                Ok(())
            },
        ));
        (world, seen)
    }

    fn replay(events: &[WorldEvent]) -> WorldSnapshot {
        let mut space = WorldSnapshot::new();
        for WorldEvent::EntityChanged { entity, snapshot } in events {
            space.insert(entity.clone(), snapshot.clone());
        }
        space
    }

    #[test]
    fn test_get_unknown_entity_is_empty_and_not_created() {
        let world = World::new();
        assert!(world.get("ghost").is_empty());
        assert!(world.is_empty());
        assert!(world.world_snapshot().is_empty());
    }

    #[test]
    fn test_set_replaces_whole_entity() {
        let world = World::new();
        world.set("player1", attrs(json!({"x": 1, "y": 2})));
        let result = world.set("player1", attrs(json!({"z": 3})));

        assert_eq!(result, attrs(json!({"z": 3})));
        assert_eq!(world.get("player1"), attrs(json!({"z": 3})));
    }

    #[test]
    fn test_update_merges_single_key() {
        let world = World::new();
        world.set("player1", attrs(json!({"x": 1, "y": 2})));
        world.update("player1", "x", json!(10));
        world.update("player1", "colour", json!("blue"));

        assert_eq!(
            world.get("player1"),
            attrs(json!({"x": 10, "y": 2, "colour": "blue"}))
        );
    }

    #[test]
    fn test_update_creates_missing_entity() {
        let world = World::new();
        let result = world.update("player1", "x", json!(1));
        assert_eq!(result, attrs(json!({"x": 1})));
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_merge_applies_every_key_and_notifies_per_key() {
        let (world, seen) = recording_world();
        world.set("player1", attrs(json!({"y": 2})));

        let result = world.merge("player1", attrs(json!({"x": 1, "z": [1, 2]})));

        assert_eq!(result, attrs(json!({"x": 1, "y": 2, "z": [1, 2]})));
        // one for the set, one per merged key
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[test]
    fn test_merge_with_no_keys_does_not_create_entity() {
        let (world, seen) = recording_world();
        let result = world.merge("player1", Attributes::new());

        assert!(result.is_empty());
        assert!(world.is_empty());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_clear_empties_world_without_notifying() {
        let (world, seen) = recording_world();
        world.set("player1", attrs(json!({"x": 1})));
        world.update("player2", "y", json!(9));
        seen.lock().unwrap().clear();

        world.clear();

        assert!(world.get("player1").is_empty());
        assert!(world.get("player2").is_empty());
        assert!(world.world_snapshot().is_empty());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_listener_sees_snapshot_after_write() {
        let (world, seen) = recording_world();
        world.set("player1", attrs(json!({"x": 1})));
        world.update("player1", "y", json!(2));

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                WorldEvent::EntityChanged {
                    entity: "player1".to_string(),
                    snapshot: attrs(json!({"x": 1})),
                },
                WorldEvent::EntityChanged {
                    entity: "player1".to_string(),
                    snapshot: attrs(json!({"x": 1, "y": 2})),
                },
            ]
        );
    }

    #[test]
    fn test_failing_listener_does_not_fail_write() {
        let world = World::new();
        world.add_listener(Arc::new(
            |_: &WorldEvent| -> Result<(), HandlerError> { Err(HandlerError::other("nope")) },
        ));
        world.add_listener(Arc::new(|_: &WorldEvent| -> Result<(), HandlerError> {
            panic!("listener panicked")
        }));

        world.set("player1", attrs(json!({"x": 1})));
        world.update("player1", "y", json!(2));

        assert_eq!(world.get("player1"), attrs(json!({"x": 1, "y": 2})));
    }

    #[test]
    fn test_snapshot_equals_replay_of_notifications() {
        let (world, seen) = recording_world();
        world.set("a", attrs(json!({"k": 1})));
        world.update("b", "k", json!(2));
        world.update("a", "j", json!(3));
        world.set("b", attrs(json!({"only": true})));
        world.merge("c", attrs(json!({"p": null, "q": {"nested": 1}})));

        assert_eq!(world.world_snapshot(), replay(&seen.lock().unwrap()));
    }

    #[test]
    fn test_with_snapshot_sees_current_world() {
        let world = World::new();
        world.set("player1", attrs(json!({"x": 1})));
        let names: Vec<String> = world.with_snapshot(|space| space.keys().cloned().collect());
        assert_eq!(names, vec!["player1".to_string()]);
    }

    #[test]
    fn test_concurrent_updates_are_not_lost_and_share_one_order() {
        let world = Arc::new(World::new());
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(Mutex::new(Vec::new()));
        for log in [first.clone(), second.clone()] {
            world.add_listener(Arc::new(
                move |event: &WorldEvent| -> Result<(), HandlerError> {
                    log.lock().unwrap().push(event.clone());
                    Ok(())
                },
            ));
        }

        let writers: Vec<_> = (0..8)
            .map(|writer| {
                let world = world.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        world.update("shared", &format!("w{writer}-{i}"), json!(i));
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        assert_eq!(world.get("shared").len(), 400);
        let first = first.lock().unwrap();
        assert_eq!(first.len(), 400);
        assert_eq!(*first, *second.lock().unwrap());
        assert_eq!(world.world_snapshot(), replay(&first));
    }
}
