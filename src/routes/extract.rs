use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::AppError;

/// The numeric `{id}` path segment of a by-id route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TodoId(pub i32);

impl<S> FromRequestParts<S> for TodoId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::bad_request("invalid id"))?;
        raw.parse::<i32>()
            .map(TodoId)
            .map_err(|_| AppError::bad_request("invalid id"))
    }
}

/// A JSON request body. The content type is not checked, and every decode
/// failure is a 400. Only the first JSON value is read, so trailing data is
/// ignored, and a `null` body decodes to `T::default()`.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned + Default + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|err| {
            debug!(error = %err, "failed to read request body");
            AppError::bad_request("invalid json")
        })?;
        match serde_json::Deserializer::from_slice(&bytes)
            .into_iter::<Option<T>>()
            .next()
        {
            Some(Ok(value)) => Ok(JsonBody(value.unwrap_or_default())),
            Some(Err(err)) => {
                debug!(error = %err, "rejected request body");
                Err(AppError::bad_request("invalid json"))
            }
            None => {
                debug!("empty request body");
                Err(AppError::bad_request("invalid json"))
            }
        }
    }
}
