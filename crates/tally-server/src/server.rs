//! HTTP server implementation.
//!
//! A small http1 accept loop: one Tokio task per connection, each request
//! decoded and handed to the dispatch engine. The engine returns either a
//! payload or an [`ApiError`]; both are framed into the wire envelope here.

use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use http::{header, Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tokio::net::TcpListener;

use tally_core::{method_handler, ApiError, AuditContext, Clock, RequestId, SystemClock};
use tally_store::Store;

use crate::config::ServerConfig;

/// Type alias for the HTTP response body.
pub type ResponseBody = Full<Bytes>;

/// Type alias for the HTTP response.
pub type HttpResponse = Response<ResponseBody>;

/// Header carrying an externally assigned request id.
const REQUEST_ID_HEADER: &str = "x-request-id";

/// Errors starting or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured bind address does not parse.
    #[error("invalid bind address: {0}")]
    Addr(#[from] std::net::AddrParseError),

    /// Socket-level failure while binding or accepting.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// The Tally HTTP server.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use tally_server::{Server, ServerConfig};
/// use tally_store::MemoryStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), tally_server::ServerError> {
///     let config = ServerConfig::builder().http_addr("0.0.0.0:8080").build();
///     let server = Server::new(config, Arc::new(MemoryStore::new()));
///     server.run().await
/// }
/// ```
pub struct Server {
    config: ServerConfig,
    store: Arc<dyn Store>,
    clock: Arc<dyn Clock>,
}

impl Server {
    /// Creates a server over the given store, using the system clock.
    #[must_use]
    pub fn new(config: ServerConfig, store: Arc<dyn Store>) -> Self {
        Self {
            config,
            store,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the time source (used by tests to pin the admin hour).
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Binds to the configured address and serves until the task is
    /// cancelled or an accept error occurs.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] if the address cannot be parsed or bound, or
    /// if accepting a connection fails.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.config.socket_addr()?;
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "server listening");
        self.serve(listener).await
    }

    /// Serves connections from an already bound listener.
    ///
    /// Useful for tests that bind to an ephemeral port first.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] if accepting a connection fails.
    pub async fn serve(self, listener: TcpListener) -> Result<(), ServerError> {
        let server = Arc::new(self);
        loop {
            let (stream, peer_addr) = listener.accept().await?;
            let server = Arc::clone(&server);
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |req| {
                    let server = Arc::clone(&server);
                    async move { Ok::<_, Infallible>(server.handle(req).await) }
                });
                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    tracing::debug!(error = %err, peer = %peer_addr, "connection error");
                }
            });
        }
    }

    /// Handles one request end to end: route, decode, dispatch, frame.
    async fn handle(&self, req: Request<Incoming>) -> HttpResponse {
        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map_or_else(RequestId::new, RequestId::from_header);

        if req.method() != Method::POST {
            return error_response(StatusCode::METHOD_NOT_ALLOWED, json!("Method Not Allowed"));
        }
        if req.uri().path() != self.config.method_path() {
            return error_response(StatusCode::NOT_FOUND, json!("Not Found"));
        }

        let body = match req.into_body().collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(err) => {
                tracing::warn!(request_id = %request_id, error = %err, "failed to read body");
                return error_response(StatusCode::BAD_REQUEST, json!("Bad Request"));
            }
        };

        let Some(raw) = decode_body(&body) else {
            tracing::warn!(request_id = %request_id, "request body is not a JSON object");
            return error_response(StatusCode::BAD_REQUEST, json!("Bad Request"));
        };

        tracing::info!(
            request_id = %request_id,
            body = %String::from_utf8_lossy(&body),
            "handling request"
        );

        let mut ctx = AuditContext::new(request_id);
        let response =
            match method_handler(&raw, &mut ctx, self.store.as_ref(), self.clock.as_ref()) {
                Ok(payload) => json_response(
                    StatusCode::OK,
                    &json!({ "response": payload, "code": StatusCode::OK.as_u16() }),
                ),
                Err(err) => {
                    if let ApiError::Internal(detail) = &err {
                        tracing::error!(
                            request_id = %ctx.request_id,
                            method = raw.get("method").and_then(serde_json::Value::as_str).unwrap_or(""),
                            payload = %serde_json::Value::Object(raw.clone()),
                            detail = %detail,
                            "business function failed"
                        );
                    }
                    error_response(err.status_code(), err.payload())
                }
            };

        match serde_json::to_value(&ctx) {
            Ok(audit) => tracing::info!(audit = %audit, "request complete"),
            Err(err) => tracing::warn!(error = %err, "audit context did not serialize"),
        }
        response
    }
}

/// Decodes a request body into the raw JSON object the engine consumes.
fn decode_body(body: &[u8]) -> Option<Map<String, Value>> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn error_response(code: StatusCode, payload: Value) -> HttpResponse {
    json_response(code, &json!({ "error": payload, "code": code.as_u16() }))
}

fn json_response(code: StatusCode, frame: &Value) -> HttpResponse {
    let body = serde_json::to_vec(frame).unwrap_or_default();
    Response::builder()
        .status(code)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_body_accepts_objects_only() {
        assert!(decode_body(br#"{"login": "h&f"}"#).is_some());
        assert!(decode_body(br#"["not", "an", "object"]"#).is_none());
        assert!(decode_body(b"not json").is_none());
        assert!(decode_body(b"").is_none());
    }

    #[test]
    fn test_error_response_frame() {
        let response = error_response(StatusCode::FORBIDDEN, json!("Forbidden"));
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
