use crate::error::{Error, WebErrorKind};
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::Value;
use world::Attributes;

/// A JSON object request body, parsed whatever the `Content-Type` header says.
///
/// Browser clients commonly post JSON as `text/plain` or form data to avoid CORS
/// preflights, so the header is not trusted either way.
pub(crate) struct JsonBody(pub Attributes);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| Error::with_source(WebErrorKind::BodyUnreadable, e))?;

        parse_object(&bytes).map(JsonBody)
    }
}

fn parse_object(bytes: &[u8]) -> Result<Attributes, Error> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(attributes)) => Ok(attributes),
        Ok(_) => Err(Error::new(WebErrorKind::NotAnObject)),
        Err(e) => Err(Error::with_source(WebErrorKind::InvalidJson, e)),
    }
}
