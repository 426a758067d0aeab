//! Per-request audit context.

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps request ids useful for log
/// correlation. Transports may also supply an id taken from an
/// `X-Request-Id` header.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Creates a new unique request id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    /// Wraps an externally supplied id (e.g. from a header).
    #[must_use]
    pub fn from_header(raw: &str) -> Self {
        Self(raw.to_string())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Request-scoped audit state.
///
/// Business handlers record what the request actually supplied (`has` for
/// `online_score`, `nclients` for `clients_interests`); the transport logs
/// the whole context after the response is framed. Never used for control
/// flow.
#[derive(Debug, Clone, Serialize)]
pub struct AuditContext {
    /// Correlation id for this request.
    pub request_id: RequestId,
    /// Audit entries recorded during dispatch.
    #[serde(flatten)]
    entries: Map<String, Value>,
}

impl AuditContext {
    /// Creates a context for the given request id.
    #[must_use]
    pub fn new(request_id: RequestId) -> Self {
        Self {
            request_id,
            entries: Map::new(),
        }
    }

    /// Records an audit entry.
    pub fn record(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    /// Reads back a recorded entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }
}

impl Default for AuditContext {
    fn default() -> Self {
        Self::new(RequestId::new())
    }
}
