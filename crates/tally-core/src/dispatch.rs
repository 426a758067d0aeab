//! The dispatcher: validate the envelope, authenticate, route by method
//! name, validate the inner arguments, invoke the business function.
//!
//! [`method_handler`] is a state machine, terminal at the first applicable
//! failure:
//!
//! | step | failure | status |
//! |---|---|---|
//! | envelope required keys | [`ApiError::MissingFields`] | 422 |
//! | envelope field validation | [`ApiError::InvalidEnvelope`] | 400 |
//! | token check | [`ApiError::Forbidden`] | 403 |
//! | method resolution | [`ApiError::MethodNotFound`] | 404 |
//! | inner required keys | [`ApiError::MissingFields`] | 422 |
//! | inner validation | [`ApiError::InvalidArguments`] | 422 |
//!
//! The engine is stateless: every call builds fresh schema instances, and
//! expected failures are return values, never panics.

use std::str::FromStr;

use serde_json::{json, Map, Value};
use tally_store::Store;

use crate::auth;
use crate::clock::Clock;
use crate::context::AuditContext;
use crate::error::{ApiError, ApiResult};
use crate::requests::{ClientsInterestsRequest, MethodRequest, OnlineScoreRequest};
use crate::schema::Schema;
use crate::scoring;

/// The business methods the service exposes, keyed by wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiMethod {
    /// `online_score`: compute a score from identity fields.
    OnlineScore,
    /// `clients_interests`: look up precomputed interests per client id.
    ClientsInterests,
}

impl ApiMethod {
    /// The wire name of this method.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::OnlineScore => "online_score",
            Self::ClientsInterests => "clients_interests",
        }
    }
}

impl FromStr for ApiMethod {
    type Err = ApiError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "online_score" => Ok(Self::OnlineScore),
            "clients_interests" => Ok(Self::ClientsInterests),
            other => Err(ApiError::MethodNotFound(other.to_string())),
        }
    }
}

/// Validates inner arguments against schema `S`: required keys first, then
/// the field walk.
fn validate_args<S: Schema>(args: &Map<String, Value>, clock: &dyn Clock) -> ApiResult<S> {
    let missing = S::missing_required(args);
    if !missing.is_empty() {
        return Err(ApiError::MissingFields(missing));
    }
    let mut inner = S::default();
    let errors = inner.validate(args, clock.now());
    if errors.is_empty() {
        Ok(inner)
    } else {
        Err(ApiError::InvalidArguments(errors))
    }
}

fn online_score(
    envelope: &MethodRequest,
    args: &Map<String, Value>,
    ctx: &mut AuditContext,
    store: &dyn Store,
    clock: &dyn Clock,
) -> ApiResult<Value> {
    let inner: OnlineScoreRequest = validate_args(args, clock)?;
    ctx.record("has", inner.reported_context());
    if envelope.is_admin() {
        return Ok(json!({ "score": scoring::ADMIN_SCORE }));
    }
    let score = scoring::get_score(
        store,
        inner.phone.as_deref(),
        inner.email.as_deref(),
        inner.birthday,
        inner.gender,
        inner.first_name.as_deref(),
        inner.last_name.as_deref(),
    );
    Ok(json!({ "score": score }))
}

fn clients_interests(
    args: &Map<String, Value>,
    ctx: &mut AuditContext,
    store: &dyn Store,
    clock: &dyn Clock,
) -> ApiResult<Value> {
    let inner: ClientsInterestsRequest = validate_args(args, clock)?;
    ctx.record("nclients", inner.reported_context());
    let mut response = Map::new();
    for &client_id in &inner.client_ids {
        let interests = scoring::get_interests(store, client_id)?;
        response.insert(client_id.to_string(), json!(interests));
    }
    Ok(Value::Object(response))
}

/// Validates, authenticates, and dispatches one raw request body.
///
/// `body` is the JSON-decoded request object; `ctx` collects audit entries
/// for the transport to log. On success the method's response payload is
/// returned; every expected failure comes back as an [`ApiError`] carrying
/// its status code.
///
/// # Errors
///
/// See the state machine table in the module docs.
pub fn method_handler(
    body: &Map<String, Value>,
    ctx: &mut AuditContext,
    store: &dyn Store,
    clock: &dyn Clock,
) -> ApiResult<Value> {
    let missing = MethodRequest::missing_required(body);
    if !missing.is_empty() {
        return Err(ApiError::MissingFields(missing));
    }

    let mut envelope = MethodRequest::default();
    let errors = envelope.validate(body, clock.now());
    if !errors.is_empty() {
        return Err(ApiError::InvalidEnvelope(errors));
    }

    if !auth::check_auth(&envelope, clock) {
        tracing::warn!(
            request_id = %ctx.request_id,
            login = envelope.login.as_deref().unwrap_or(""),
            "authentication failed"
        );
        return Err(ApiError::Forbidden);
    }

    let method = ApiMethod::from_str(envelope.method.as_deref().unwrap_or_default())?;
    tracing::debug!(request_id = %ctx.request_id, method = method.name(), "dispatching");

    let empty = Map::new();
    let args = envelope.arguments.as_ref().unwrap_or(&empty);
    match method {
        ApiMethod::OnlineScore => online_score(&envelope, args, ctx, store, clock),
        ApiMethod::ClientsInterests => clients_interests(args, ctx, store, clock),
    }
}
