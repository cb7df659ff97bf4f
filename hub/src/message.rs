//! Wire format shared by both directions of a session.
//!
//! Every message is one JSON object keyed by entity name, with each entity's
//! attribute mapping as the value. The initial sync carries the whole world; a
//! broadcast carries exactly one entity.

use crate::error::{Error, MessageErrorKind};
use serde_json::{json, Value};
use world::{Attributes, WorldSnapshot};

pub fn encode_world(snapshot: &WorldSnapshot) -> Result<String, Error> {
    serde_json::to_string(snapshot).map_err(Error::encode)
}

/// Encodes `{entity: snapshot}`.
pub fn encode_delta(entity: &str, snapshot: &Attributes) -> Result<String, Error> {
    serde_json::to_string(&json!({ entity: snapshot })).map_err(Error::encode)
}

/// Parses an inbound message into `(entity, attributes)` pairs, in message order.
///
/// The message is rejected as a whole if it is not an object, or if any entity's
/// value is not an object.
pub fn decode_updates(text: &str) -> Result<Vec<(String, Attributes)>, Error> {
    let packet = match serde_json::from_str::<Value>(text).map_err(Error::invalid_json)? {
        Value::Object(packet) => packet,
        _ => return Err(Error::message(MessageErrorKind::NotAnObject)),
    };

    packet
        .into_iter()
        .map(|(entity, attributes)| match attributes {
            Value::Object(attributes) => Ok((entity, attributes)),
            _ => Err(Error::message(MessageErrorKind::EntityNotAnObject(entity))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn test_encode_delta_has_exactly_one_key() {
        let text = encode_delta("player1", &attrs(json!({"x": 1}))).unwrap();
        let decoded: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(decoded, json!({"player1": {"x": 1}}));
    }

    #[test]
    fn test_encode_delta_escapes_entity_name() {
        let text = encode_delta(r#"say "hi""#, &Attributes::new()).unwrap();
        assert_eq!(text, r#"{"say \"hi\"":{}}"#);
    }

    #[test]
    fn test_encode_world_of_empty_world_is_empty_object() {
        assert_eq!(encode_world(&WorldSnapshot::new()).unwrap(), "{}");
    }

    #[test]
    fn test_encode_world_contains_every_entity() {
        let mut snapshot = WorldSnapshot::new();
        snapshot.insert("player1".to_string(), attrs(json!({"x": 1})));
        snapshot.insert("player2".to_string(), attrs(json!({"y": 9})));

        let decoded: Value = serde_json::from_str(&encode_world(&snapshot).unwrap()).unwrap();
        assert_eq!(decoded, json!({"player1": {"x": 1}, "player2": {"y": 9}}));
    }

    #[test]
    fn test_decode_updates_returns_every_entity() {
        let updates = decode_updates(r#"{"player2": {"y": 9}, "player3": {}}"#).unwrap();
        assert_eq!(updates.len(), 2);
        assert!(updates.contains(&("player2".to_string(), attrs(json!({"y": 9})))));
        assert!(updates.contains(&("player3".to_string(), Attributes::new())));
    }

    #[test]
    fn test_decode_updates_rejects_invalid_json() {
        let err = decode_updates("{not json").unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Message(MessageErrorKind::InvalidJson)
        );
    }

    #[test]
    fn test_decode_updates_rejects_non_object_message() {
        let err = decode_updates("[1, 2, 3]").unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Message(MessageErrorKind::NotAnObject)
        );
    }

    #[test]
    fn test_decode_updates_rejects_non_object_entity() {
        let err = decode_updates(r#"{"ok": {"x": 1}, "bad": 5}"#).unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::Message(MessageErrorKind::EntityNotAnObject("bad".to_string()))
        );
    }
}
