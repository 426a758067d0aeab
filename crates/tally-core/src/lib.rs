//! # Tally Core
//!
//! Declarative request validation and method dispatch for the Tally scoring
//! service.
//!
//! The engine accepts a JSON-decoded request body, validates it against the
//! envelope schema ([`MethodRequest`]), authenticates the caller, and routes
//! the validated arguments to one of the business methods:
//!
//! - `online_score`, validated by [`OnlineScoreRequest`]
//! - `clients_interests`, validated by [`ClientsInterestsRequest`]
//!
//! The entry point is [`method_handler`]. The engine is stateless: every
//! call builds fresh schema instances, and the only shared state is the
//! external [`Store`](tally_store::Store).
//!
//! Key types:
//!
//! - [`FieldSpec`] / [`FieldKind`] - declarative per-field validation rules
//! - [`Schema`] - the generic validate-and-bind walk over a declared field table
//! - [`ApiError`] - the error taxonomy with HTTP status code mapping
//! - [`Clock`] - injected time source, so token checks and age limits are
//!   testable with a fixed clock

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod auth;
mod clock;
mod context;
mod dispatch;
mod error;
mod field;
mod requests;
mod schema;
pub mod scoring;

pub use clock::{Clock, FixedClock, SystemClock};
pub use context::{AuditContext, RequestId};
pub use dispatch::{method_handler, ApiMethod};
pub use error::{ApiError, ApiResult};
pub use field::{FieldError, FieldKind, FieldSpec, FieldValue, Gender};
pub use requests::{ClientsInterestsRequest, MethodRequest, OnlineScoreRequest};
pub use schema::{Schema, SchemaError};
