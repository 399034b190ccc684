//! Metadata query errors

use crate::geometry::GeometryError;
use crate::http::HttpError;
use thiserror::Error;

/// Errors returned by [`MetadataClient`](super::MetadataClient) queries.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// The query was rejected before any network call
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Transport failure or a non-2xx status without an API error payload
    #[error("Network error: {0}")]
    Network(String),

    /// The API answered with an error payload
    #[error("API error: {message}")]
    Api { message: String, code: Option<i64> },

    /// The body was not JSON or lacked a `data` array of objects
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl QueryError {
    /// True for errors that will fail the same way on every retry.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, QueryError::InvalidArgument(_))
    }
}

impl From<GeometryError> for QueryError {
    fn from(e: GeometryError) -> Self {
        QueryError::InvalidArgument(e.to_string())
    }
}

impl From<HttpError> for QueryError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::Transport(msg) => QueryError::Network(msg),
            HttpError::InvalidUrl { .. } => QueryError::InvalidArgument(e.to_string()),
        }
    }
}
