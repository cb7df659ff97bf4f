//! Error types for the `hub` crate.
//!
//! Follows the same pattern as `events::error` with a root Error struct and error kind enums.
//! None of these errors ever reach a client: sessions turn them into log lines,
//! dropped messages, or a disconnect.

use std::error::Error as StdError;
use std::fmt;

#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in the hub.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Message(MessageErrorKind),
    Transport(TransportErrorKind),
}

/// Errors turning wire text into world updates, or world state into wire text.
#[derive(Debug, PartialEq)]
pub enum MessageErrorKind {
    InvalidJson,
    /// The message parsed, but its top level is not a JSON object.
    NotAnObject,
    /// The value for the named entity is not a JSON object.
    EntityNotAnObject(String),
    Encode,
}

/// Errors moving text between a session and its connection.
#[derive(Debug, PartialEq)]
pub enum TransportErrorKind {
    Send,
    Receive,
    /// The session's outbound queue has no reader anymore.
    QueueClosed,
}

impl Error {
    pub fn message(kind: MessageErrorKind) -> Self {
        Self {
            source: None,
            error_kind: ErrorKind::Message(kind),
        }
    }

    pub fn invalid_json(source: serde_json::Error) -> Self {
        Self {
            source: Some(Box::new(source)),
            error_kind: ErrorKind::Message(MessageErrorKind::InvalidJson),
        }
    }

    pub fn encode(source: serde_json::Error) -> Self {
        Self {
            source: Some(Box::new(source)),
            error_kind: ErrorKind::Message(MessageErrorKind::Encode),
        }
    }

    pub fn transport(kind: TransportErrorKind) -> Self {
        Self {
            source: None,
            error_kind: ErrorKind::Transport(kind),
        }
    }

    /// A transport failure caused by an error from the underlying connection.
    pub fn transport_with_source(
        kind: TransportErrorKind,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            source: Some(Box::new(source)),
            error_kind: ErrorKind::Transport(kind),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "Hub Error: {:?} ({source})", self.error_kind),
            None => write!(f, "Hub Error: {:?}", self.error_kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}
