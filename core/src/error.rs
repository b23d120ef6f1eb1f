//! Error types for the todo API client.
//!
//! # Design
//! The server answers 400 and 404 without a body, so those two statuses get
//! dedicated variants; callers branch on them. Any other unexpected status
//! lands in `HttpError` with the raw code and body.

use thiserror::Error;

/// Errors returned by `TodoClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 404: no todo with that id, or the id was malformed.
    #[error("resource not found")]
    NotFound,

    /// 400: the body was undecodable or the task was blank.
    #[error("request rejected by server")]
    BadRequest,

    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    #[error("serialization failed: {0}")]
    SerializationError(String),
}
