//! Request extractors with the status codes this API promises.
//!
//! axum's stock `Path<Uuid>` and `Json<T>` reject with 400/415/422 and a
//! plain-text body. The todo routes instead answer a bad or missing id with
//! a bare 404 and any undecodable body with a bare 400.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{request::Parts, StatusCode},
};
use serde::de::DeserializeOwned;
use tracing::debug;
use uuid::Uuid;

/// The `{id}` path segment, parsed as a UUID.
///
/// Missing and malformed ids are both rejected with 404.
#[derive(Debug, Clone, Copy)]
pub struct TodoIdParam(pub Uuid);

impl<S> FromRequestParts<S> for TodoIdParam
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                debug!(%rejection, "missing todo id path parameter");
                StatusCode::NOT_FOUND
            })?;
        Uuid::parse_str(&raw).map(TodoIdParam).map_err(|err| {
            debug!(id = %raw, error = %err, "malformed todo id");
            StatusCode::NOT_FOUND
        })
    }
}

/// A JSON request body decoded with serde_json.
///
/// The `Content-Type` header is not inspected; anything that fails to decode
/// as `T` is rejected with 400.
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = StatusCode;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            debug!(%rejection, "unreadable request body");
            StatusCode::BAD_REQUEST
        })?;
        serde_json::from_slice(&bytes).map(JsonBody).map_err(|err| {
            debug!(error = %err, "undecodable request body");
            StatusCode::BAD_REQUEST
        })
    }
}
