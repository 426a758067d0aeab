//! Field descriptors and per-value validation.
//!
//! A [`FieldSpec`] is the smallest unit of the schema system: a named, typed
//! attribute with independent `required` and `nullable` flags. `required`
//! governs *key presence* in the raw mapping and is enforced by the schema
//! walk; `nullable` governs *value emptiness* and is enforced here, per
//! value. Keeping the two predicates separate is deliberate: collapsing them
//! is the classic source of off-by-one validation bugs.
//!
//! Validation of a candidate value runs in a fixed order:
//!
//! 1. nullable and empty → pass as unset
//! 2. base type mismatch → [`FieldError::Type`]
//! 3. empty and not nullable → [`FieldError::Blank`]
//! 4. the kind-specific rule → typed [`FieldValue`] or [`FieldError::Invalid`]

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use thiserror::Error;

/// Date format used on the wire for `date` and `birthday` fields.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Maximum age, in years, accepted for a birthday field.
pub const MAX_AGE_YEARS: f64 = 70.0;

/// Gender codes accepted on the wire.
///
/// `Unknown` is encoded as `0`, which doubles as the "empty" sentinel for
/// nullable gender fields; an explicit `0` still counts as a supplied
/// value for cross-field rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    /// Gender not stated (`0`).
    Unknown,
    /// Male (`1`).
    Male,
    /// Female (`2`).
    Female,
}

impl Gender {
    /// Decodes a wire integer into a gender, if valid.
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Unknown),
            1 => Some(Self::Male),
            2 => Some(Self::Female),
            _ => None,
        }
    }

    /// Returns the wire encoding of this gender.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Unknown => 0,
            Self::Male => 1,
            Self::Female => 2,
        }
    }
}

/// The value kind a field accepts, with its extra validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Plain string.
    Str,
    /// JSON object holding method arguments.
    Arguments,
    /// String containing an `@`.
    Email,
    /// String or integer: 11 characters, starting with `7`.
    Phone,
    /// `DD.MM.YYYY` date string.
    Date,
    /// `DD.MM.YYYY` date string, at most 70 years in the past.
    BirthDay,
    /// Integer gender code, one of `0`, `1`, `2`.
    Gender,
    /// Array of integer client ids.
    ClientIds,
}

impl FieldKind {
    /// Human-readable name of the base type, used in type errors.
    #[must_use]
    pub const fn type_name(self) -> &'static str {
        match self {
            Self::Str | Self::Email | Self::Date | Self::BirthDay => "string",
            Self::Arguments => "object",
            Self::Phone => "string or integer",
            Self::Gender => "integer",
            Self::ClientIds => "array",
        }
    }

    /// Whether `value` counts as "empty" for the nullable rule.
    fn is_empty(self, value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Object(map) => map.is_empty(),
            Value::Array(items) => items.is_empty(),
            // 0 is the "unset" sentinel for gender only.
            Value::Number(n) => self == Self::Gender && n.as_i64() == Some(0),
            Value::Bool(_) => false,
        }
    }

    /// Whether `value` has the base JSON type this kind expects.
    fn type_matches(self, value: &Value) -> bool {
        match self {
            Self::Str | Self::Email | Self::Date | Self::BirthDay => value.is_string(),
            Self::Arguments => value.is_object(),
            Self::Phone => value.is_string() || value.as_i64().is_some(),
            Self::Gender => value.as_i64().is_some(),
            Self::ClientIds => value.is_array(),
        }
    }

    /// Runs the kind-specific rule on a non-empty, type-checked value.
    fn apply_rule(self, value: &Value, now: DateTime<Utc>) -> Result<FieldValue, FieldError> {
        match self {
            Self::Str => Ok(FieldValue::Str(as_string(value))),
            Self::Arguments => {
                let map = value.as_object().cloned().unwrap_or_default();
                Ok(FieldValue::Map(map))
            }
            Self::Email => {
                let raw = as_string(value);
                if raw.contains('@') {
                    Ok(FieldValue::Str(raw))
                } else {
                    Err(FieldError::Invalid {
                        message: "must contain an '@'",
                    })
                }
            }
            Self::Phone => {
                let raw = as_string(value);
                if raw.len() == 11 && raw.starts_with('7') {
                    Ok(FieldValue::Str(raw))
                } else {
                    Err(FieldError::Invalid {
                        message: "must be 11 characters starting with 7",
                    })
                }
            }
            Self::Date => parse_wire_date(value).map(FieldValue::Date),
            Self::BirthDay => {
                let date = parse_wire_date(value)?;
                let age_years = f64::from((now.date_naive() - date).num_days() as i32) / 365.25;
                if age_years <= MAX_AGE_YEARS {
                    Ok(FieldValue::Date(date))
                } else {
                    Err(FieldError::Invalid {
                        message: "must be at most 70 years in the past",
                    })
                }
            }
            Self::Gender => value
                .as_i64()
                .and_then(Gender::from_code)
                .map(FieldValue::Gender)
                .ok_or(FieldError::Invalid {
                    message: "must be one of 0, 1, 2",
                }),
            Self::ClientIds => {
                let items = value.as_array().map(Vec::as_slice).unwrap_or_default();
                let ids: Option<Vec<i64>> = items.iter().map(Value::as_i64).collect();
                ids.map(FieldValue::ClientIds).ok_or(FieldError::Invalid {
                    message: "every client id must be an integer",
                })
            }
        }
    }
}

/// Error validating a single field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The value has the wrong base type.
    #[error("must be a {expected}")]
    Type {
        /// Expected base type name.
        expected: &'static str,
    },
    /// The value is empty but the field is not nullable.
    #[error("blank value not allowed")]
    Blank,
    /// The value failed the kind-specific rule.
    #[error("{message}")]
    Invalid {
        /// Rule failure description.
        message: &'static str,
    },
}

/// Typed result of a successful field check.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// The field was empty and nullable; nothing to record.
    Unset,
    /// A validated string (plain, email, or coerced phone).
    Str(String),
    /// A validated arguments object.
    Map(serde_json::Map<String, Value>),
    /// A validated date or birthday.
    Date(NaiveDate),
    /// A validated gender code.
    Gender(Gender),
    /// A validated client id list.
    ClientIds(Vec<i64>),
}

/// Declarative rule for one named, typed attribute of a schema.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use serde_json::json;
/// use tally_core::{FieldKind, FieldSpec, FieldValue};
///
/// const PHONE: FieldSpec = FieldSpec {
///     name: "phone",
///     kind: FieldKind::Phone,
///     required: false,
///     nullable: true,
/// };
///
/// let checked = PHONE.check(&json!("79175002040"), Utc::now()).unwrap();
/// assert_eq!(checked, FieldValue::Str("79175002040".to_string()));
/// assert_eq!(PHONE.check(&json!(""), Utc::now()).unwrap(), FieldValue::Unset);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name, unique within its schema.
    pub name: &'static str,
    /// Value kind and its extra rule.
    pub kind: FieldKind,
    /// Whether the key must be present in the raw mapping.
    pub required: bool,
    /// Whether an empty value is accepted as "unset".
    pub nullable: bool,
}

impl FieldSpec {
    /// Validates a candidate value against this descriptor.
    ///
    /// `now` feeds the birthday age rule; pass the injected clock's time.
    ///
    /// # Errors
    ///
    /// Returns a [`FieldError`] describing the first failed check.
    pub fn check(&self, value: &Value, now: DateTime<Utc>) -> Result<FieldValue, FieldError> {
        if self.nullable && self.kind.is_empty(value) {
            // Gender 0 passes as "empty" but is still a real value and must
            // be recorded for cross-field rules.
            if self.kind == FieldKind::Gender && value.as_i64() == Some(0) {
                return Ok(FieldValue::Gender(Gender::Unknown));
            }
            return Ok(FieldValue::Unset);
        }
        if !self.kind.type_matches(value) {
            return Err(FieldError::Type {
                expected: self.kind.type_name(),
            });
        }
        if self.kind.is_empty(value) {
            return Err(FieldError::Blank);
        }
        self.kind.apply_rule(value, now)
    }
}

/// Renders a string or integer value as an owned string.
fn as_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn parse_wire_date(value: &Value) -> Result<NaiveDate, FieldError> {
    let raw = value.as_str().unwrap_or_default();
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| FieldError::Invalid {
        message: "must be a DD.MM.YYYY date",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2017, 7, 19, 10, 0, 0).unwrap()
    }

    fn spec(kind: FieldKind, nullable: bool) -> FieldSpec {
        FieldSpec {
            name: "field",
            kind,
            required: false,
            nullable,
        }
    }

    #[test]
    fn test_nullable_accepts_empty_values() {
        let cases = [
            (FieldKind::Str, json!("")),
            (FieldKind::Str, Value::Null),
            (FieldKind::Arguments, json!({})),
            (FieldKind::ClientIds, json!([])),
            (FieldKind::Email, json!("")),
            (FieldKind::Phone, json!("")),
            (FieldKind::Date, json!("")),
            (FieldKind::BirthDay, Value::Null),
        ];
        for (kind, value) in cases {
            let checked = spec(kind, true).check(&value, now());
            assert_eq!(checked, Ok(FieldValue::Unset), "kind {kind:?} value {value}");
        }
    }

    #[test]
    fn test_not_nullable_rejects_empty_values() {
        let cases = [
            (FieldKind::Str, json!("")),
            (FieldKind::Arguments, json!({})),
            (FieldKind::ClientIds, json!([])),
        ];
        for (kind, value) in cases {
            let checked = spec(kind, false).check(&value, now());
            assert_eq!(checked, Err(FieldError::Blank), "kind {kind:?} value {value}");
        }
    }

    #[test]
    fn test_null_on_not_nullable_field_is_a_type_error() {
        // Type check precedes the blank check, so JSON null reports as a
        // type mismatch rather than a blank value.
        let checked = spec(FieldKind::Str, false).check(&Value::Null, now());
        assert_eq!(checked, Err(FieldError::Type { expected: "string" }));
    }

    #[test]
    fn test_string_rejects_number() {
        let checked = spec(FieldKind::Str, false).check(&json!(123), now());
        assert_eq!(checked, Err(FieldError::Type { expected: "string" }));
    }

    #[test]
    fn test_email_requires_at_sign() {
        let ok = spec(FieldKind::Email, true).check(&json!("stupnikov@otus.ru"), now());
        assert_eq!(ok, Ok(FieldValue::Str("stupnikov@otus.ru".to_string())));

        let bad = spec(FieldKind::Email, true).check(&json!("testts.com"), now());
        assert!(matches!(bad, Err(FieldError::Invalid { .. })));
    }

    #[test]
    fn test_phone_accepts_string_and_integer_forms() {
        for value in [json!("79175002040"), json!(79_857_778_767_i64)] {
            let checked = spec(FieldKind::Phone, true).check(&value, now());
            assert!(matches!(checked, Ok(FieldValue::Str(_))), "value {value}");
        }
    }

    #[test]
    fn test_phone_rejects_bad_values() {
        let cases = [
            json!("test"),
            json!("7916789"),
            json!(798_577),
            json!("89175002040"),
            json!("791750020401"),
        ];
        for value in cases {
            let checked = spec(FieldKind::Phone, true).check(&value, now());
            assert!(matches!(checked, Err(FieldError::Invalid { .. })), "value {value}");
        }
    }

    #[test]
    fn test_phone_rejects_float() {
        let checked = spec(FieldKind::Phone, true).check(&json!(7.9), now());
        assert_eq!(
            checked,
            Err(FieldError::Type {
                expected: "string or integer"
            })
        );
    }

    #[test]
    fn test_date_format() {
        let ok = spec(FieldKind::Date, true).check(&json!("19.07.2017"), now());
        assert_eq!(
            ok,
            Ok(FieldValue::Date(NaiveDate::from_ymd_opt(2017, 7, 19).unwrap()))
        );

        for value in [json!("2017-07-19"), json!("19.13.2017"), json!("xxx")] {
            let checked = spec(FieldKind::Date, true).check(&value, now());
            assert!(matches!(checked, Err(FieldError::Invalid { .. })), "value {value}");
        }
    }

    #[test]
    fn test_birthday_age_limit() {
        let ok = spec(FieldKind::BirthDay, true).check(&json!("19.07.1990"), now());
        assert!(matches!(ok, Ok(FieldValue::Date(_))));

        // 75 years before the fixed "now".
        let too_old = spec(FieldKind::BirthDay, true).check(&json!("19.07.1942"), now());
        assert!(matches!(too_old, Err(FieldError::Invalid { .. })));
    }

    #[test]
    fn test_gender_codes() {
        for code in [0, 1, 2] {
            let checked = spec(FieldKind::Gender, true).check(&json!(code), now());
            assert_eq!(
                checked,
                Ok(FieldValue::Gender(Gender::from_code(code).unwrap())),
                "code {code}"
            );
        }
        let bad = spec(FieldKind::Gender, true).check(&json!(3), now());
        assert!(matches!(bad, Err(FieldError::Invalid { .. })));
        let not_int = spec(FieldKind::Gender, true).check(&json!("1"), now());
        assert_eq!(not_int, Err(FieldError::Type { expected: "integer" }));
    }

    #[test]
    fn test_gender_zero_is_recorded_not_dropped() {
        let checked = spec(FieldKind::Gender, true).check(&json!(0), now());
        assert_eq!(checked, Ok(FieldValue::Gender(Gender::Unknown)));
    }

    #[test]
    fn test_client_ids() {
        let ok = spec(FieldKind::ClientIds, false).check(&json!([1, 2, 3]), now());
        assert_eq!(ok, Ok(FieldValue::ClientIds(vec![1, 2, 3])));

        let mixed = spec(FieldKind::ClientIds, false).check(&json!([1, "2"]), now());
        assert!(matches!(mixed, Err(FieldError::Invalid { .. })));

        let not_array = spec(FieldKind::ClientIds, false).check(&json!({"1": 2}), now());
        assert_eq!(not_array, Err(FieldError::Type { expected: "array" }));
    }
}
