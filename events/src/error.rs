//! Error types for listener failures.
//!
//! Follows the same pattern as the other layers: a root `Error` struct holding an
//! error kind and an optional source for chaining.

use std::error::Error as StdError;
use std::fmt;

#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: HandlerErrorKind,
}

/// The ways a listener can fail to process a `WorldEvent`.
#[derive(Debug, PartialEq)]
pub enum HandlerErrorKind {
    /// The event could not be turned into an outbound message.
    Serialization,
    Other(String),
}

impl Error {
    pub fn serialization(source: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            source: Some(Box::new(source)),
            error_kind: HandlerErrorKind::Serialization,
        }
    }

    pub fn other(reason: impl Into<String>) -> Self {
        Self {
            source: None,
            error_kind: HandlerErrorKind::Other(reason.into()),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Handler Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}
