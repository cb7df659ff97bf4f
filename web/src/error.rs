use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

extern crate log;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: WebErrorKind,
}

/// Ways a request can be rejected before it reaches the world.
#[derive(Debug, PartialEq)]
pub enum WebErrorKind {
    /// The request body could not be read off the connection.
    BodyUnreadable,
    /// The body is not valid JSON.
    InvalidJson,
    /// The body is valid JSON but not an object.
    NotAnObject,
}

impl Error {
    pub fn new(error_kind: WebErrorKind) -> Self {
        Self {
            source: None,
            error_kind,
        }
    }

    pub fn with_source(
        error_kind: WebErrorKind,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            source: Some(Box::new(source)),
            error_kind,
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

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        log::debug!("Rejecting request: {self}");
        match self.error_kind {
            WebErrorKind::BodyUnreadable | WebErrorKind::InvalidJson => {
                (StatusCode::BAD_REQUEST, "BAD REQUEST").into_response()
            }
            WebErrorKind::NotAnObject => {
                (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE ENTITY").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_json_is_bad_request() {
        let response = Error::new(WebErrorKind::InvalidJson).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_non_object_is_unprocessable() {
        let response = Error::new(WebErrorKind::NotAnObject).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
