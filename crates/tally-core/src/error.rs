//! The error taxonomy of the dispatch engine.
//!
//! Every expected failure category is a variant of [`ApiError`] carrying
//! enough structure to build the wire payload; nothing in the engine
//! propagates as a panic. The two validation layers deliberately use
//! different status codes for structurally identical failures: invalid
//! envelope fields are a 400, invalid inner arguments a 422.

use http::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;

use crate::schema::SchemaError;

/// Result type alias using [`ApiError`].
pub type ApiResult<T> = Result<T, ApiError>;

/// An expected failure while validating, authenticating, or dispatching a
/// request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The raw mapping lacks required keys (envelope or inner arguments).
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Envelope-level field validation failed.
    #[error("invalid envelope fields")]
    InvalidEnvelope(Vec<SchemaError>),

    /// Inner-argument validation failed (including cross-field rules).
    #[error("invalid method arguments")]
    InvalidArguments(Vec<SchemaError>),

    /// Token check failed.
    #[error("forbidden")]
    Forbidden,

    /// The envelope names a method the service does not expose.
    #[error("unknown method: {0}")]
    MethodNotFound(String),

    /// Unexpected failure inside a business function (e.g. a dead store).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// The HTTP status code this failure maps to.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingFields(_) | Self::InvalidArguments(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidEnvelope(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::MethodNotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `"error"` payload for the response frame.
    ///
    /// Field-validation failures list each offending field; internal errors
    /// deliberately hide their detail (it is logged, not returned).
    #[must_use]
    pub fn payload(&self) -> Value {
        match self {
            Self::MissingFields(_) | Self::MethodNotFound(_) => json!(self.to_string()),
            Self::InvalidEnvelope(errors) | Self::InvalidArguments(errors) => {
                json!(errors.iter().map(ToString::to_string).collect::<Vec<_>>())
            }
            Self::Forbidden => json!("Forbidden"),
            Self::Internal(_) => json!("Internal Server Error"),
        }
    }
}

impl From<tally_store::StoreError> for ApiError {
    fn from(err: tally_store::StoreError) -> Self {
        Self::Internal(err.to_string())
    }
}
