//! The generic validate-and-bind walk over a declared field table.
//!
//! A schema is a request shape: an ordered table of [`FieldSpec`]s plus a
//! binding step that records each validated value on the instance. The walk
//! itself is generic; concrete schemas only declare their field table, how
//! values bind to typed storage, and an optional cross-field rule.
//!
//! Validation is fail-fast per field but aggregated per schema: every
//! failing field is reported, not just the first.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::field::{FieldError, FieldSpec, FieldValue};

/// One entry in a schema's aggregate failure list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A single field failed validation.
    #[error("{field}: {error}")]
    Field {
        /// Name of the offending field.
        field: &'static str,
        /// What went wrong with its value.
        error: FieldError,
    },
    /// A cross-field rule failed after all fields validated.
    #[error("{message}")]
    Rule {
        /// Rule failure description.
        message: &'static str,
    },
}

/// A request shape: declared fields, typed bindings, and cross-field rules.
///
/// Implementors supply [`Schema::fields`] and [`Schema::bind`]; the walk in
/// [`Schema::validate`] is shared. Instances are request-scoped: construct
/// with `Default`, validate once, read the bound values, drop.
pub trait Schema: Default {
    /// The declared field table for this request shape.
    fn fields() -> &'static [FieldSpec];

    /// Records a successfully validated value on the instance.
    ///
    /// Called once per present, valid field; [`FieldValue::Unset`] is passed
    /// for empty nullable values so implementors can ignore it uniformly.
    fn bind(&mut self, name: &str, value: FieldValue);

    /// Cross-field rule, checked only when every field validated.
    ///
    /// Returns a failure message, or `None` when the rule holds.
    fn cross_field(&self) -> Option<&'static str> {
        None
    }

    /// Audit payload describing which data was actually supplied.
    ///
    /// Used only for logging, never for control flow.
    fn reported_context(&self) -> Value {
        Value::Null
    }

    /// Names of all fields declared `required` on this schema.
    fn required_field_names() -> BTreeSet<&'static str> {
        Self::fields()
            .iter()
            .filter(|spec| spec.required)
            .map(|spec| spec.name)
            .collect()
    }

    /// Required field names absent from `raw`, in declaration order.
    fn missing_required(raw: &Map<String, Value>) -> Vec<&'static str> {
        Self::fields()
            .iter()
            .filter(|spec| spec.required && !raw.contains_key(spec.name))
            .map(|spec| spec.name)
            .collect()
    }

    /// Validates `raw` against the declared fields, binding every valid
    /// value onto the instance.
    ///
    /// Keys that do not name a declared field are ignored. Returns the empty
    /// list on full success; otherwise every per-field failure, or the
    /// single cross-field failure when all fields passed individually.
    fn validate(&mut self, raw: &Map<String, Value>, now: DateTime<Utc>) -> Vec<SchemaError> {
        let mut errors = Vec::new();
        for spec in Self::fields() {
            let Some(value) = raw.get(spec.name) else {
                continue;
            };
            match spec.check(value, now) {
                Ok(bound) => self.bind(spec.name, bound),
                Err(error) => errors.push(SchemaError::Field {
                    field: spec.name,
                    error,
                }),
            }
        }
        if errors.is_empty() {
            if let Some(message) = self.cross_field() {
                errors.push(SchemaError::Rule { message });
            }
        }
        errors
    }
}
