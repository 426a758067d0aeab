//! # Tally Server
//!
//! HTTP transport for the Tally scoring service, built on Hyper and Tokio.
//!
//! The transport is a thin shell around the engine in `tally-core`: it
//! accepts connections, decodes the JSON body, hands the raw mapping to
//! [`method_handler`](tally_core::method_handler), and frames the result as
//! `{"response": ..., "code": 200}` or `{"error": ..., "code": <4xx|5xx>}`.
//!
//! Transport-level concerns handled here, not in the engine:
//!
//! - routing: only `POST` to the configured path reaches the engine; other
//!   paths are 404, other verbs 405
//! - undecodable bodies are a 400 before the engine is invoked
//! - request ids: `X-Request-Id` header or a generated UUID v7
//! - internal errors are logged with the method name, request id, and
//!   offending payload, and surface as a bare 500 frame

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod server;

pub use config::{ServerConfig, ServerConfigBuilder, DEFAULT_HTTP_ADDR, DEFAULT_METHOD_PATH};
pub use server::{Server, ServerError};
