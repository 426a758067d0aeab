//! Concrete request schemas: the two business shapes and the envelope.

use chrono::NaiveDate;
use serde_json::{json, Map, Value};

use crate::field::{FieldKind, FieldSpec, FieldValue, Gender};
use crate::schema::Schema;

/// Login that grants the admin shortcut.
pub const ADMIN_LOGIN: &str = "admin";

const ONLINE_SCORE_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "first_name",
        kind: FieldKind::Str,
        required: false,
        nullable: true,
    },
    FieldSpec {
        name: "last_name",
        kind: FieldKind::Str,
        required: false,
        nullable: true,
    },
    FieldSpec {
        name: "email",
        kind: FieldKind::Email,
        required: false,
        nullable: true,
    },
    FieldSpec {
        name: "phone",
        kind: FieldKind::Phone,
        required: false,
        nullable: true,
    },
    FieldSpec {
        name: "birthday",
        kind: FieldKind::BirthDay,
        required: false,
        nullable: true,
    },
    FieldSpec {
        name: "gender",
        kind: FieldKind::Gender,
        required: false,
        nullable: true,
    },
];

/// Arguments for the `online_score` method.
///
/// Every field is individually optional, but at least one complete pair of
/// (first + last name), (email + phone), or (birthday + gender) must be
/// supplied; gender counts as supplied even when it is exactly `0`.
#[derive(Debug, Default)]
pub struct OnlineScoreRequest {
    /// First name, when supplied non-empty.
    pub first_name: Option<String>,
    /// Last name, when supplied non-empty.
    pub last_name: Option<String>,
    /// Email address, when supplied non-empty.
    pub email: Option<String>,
    /// Phone number in string form, when supplied non-empty.
    pub phone: Option<String>,
    /// Birthday, when supplied non-empty.
    pub birthday: Option<NaiveDate>,
    /// Gender code, when supplied (including an explicit `0`).
    pub gender: Option<Gender>,
}

impl Schema for OnlineScoreRequest {
    fn fields() -> &'static [FieldSpec] {
        ONLINE_SCORE_FIELDS
    }

    fn bind(&mut self, name: &str, value: FieldValue) {
        match (name, value) {
            ("first_name", FieldValue::Str(s)) => self.first_name = Some(s),
            ("last_name", FieldValue::Str(s)) => self.last_name = Some(s),
            ("email", FieldValue::Str(s)) => self.email = Some(s),
            ("phone", FieldValue::Str(s)) => self.phone = Some(s),
            ("birthday", FieldValue::Date(d)) => self.birthday = Some(d),
            ("gender", FieldValue::Gender(g)) => self.gender = Some(g),
            _ => {}
        }
    }

    fn cross_field(&self) -> Option<&'static str> {
        let has_pair = (self.first_name.is_some() && self.last_name.is_some())
            || (self.email.is_some() && self.phone.is_some())
            || (self.birthday.is_some() && self.gender.is_some());
        if has_pair {
            None
        } else {
            Some("at least one complete pair of fields is required: \
                  first_name/last_name, email/phone, or birthday/gender")
        }
    }

    /// The names of the fields that actually hold a value, for audit logs.
    fn reported_context(&self) -> Value {
        let mut present = Vec::new();
        if self.first_name.is_some() {
            present.push("first_name");
        }
        if self.last_name.is_some() {
            present.push("last_name");
        }
        if self.email.is_some() {
            present.push("email");
        }
        if self.phone.is_some() {
            present.push("phone");
        }
        if self.birthday.is_some() {
            present.push("birthday");
        }
        if self.gender.is_some() {
            present.push("gender");
        }
        json!(present)
    }
}

const CLIENTS_INTERESTS_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "client_ids",
        kind: FieldKind::ClientIds,
        required: true,
        nullable: false,
    },
    FieldSpec {
        name: "date",
        kind: FieldKind::Date,
        required: false,
        nullable: true,
    },
];

/// Arguments for the `clients_interests` method.
///
/// `client_ids` is a required key; an explicitly supplied empty list is
/// still rejected as a blank value (required governs key presence, nullable
/// governs emptiness).
#[derive(Debug, Default)]
pub struct ClientsInterestsRequest {
    /// The client ids to look up.
    pub client_ids: Vec<i64>,
    /// Optional as-of date; accepted but unused by the lookup.
    pub date: Option<NaiveDate>,
}

impl Schema for ClientsInterestsRequest {
    fn fields() -> &'static [FieldSpec] {
        CLIENTS_INTERESTS_FIELDS
    }

    fn bind(&mut self, name: &str, value: FieldValue) {
        match (name, value) {
            ("client_ids", FieldValue::ClientIds(ids)) => self.client_ids = ids,
            ("date", FieldValue::Date(d)) => self.date = Some(d),
            _ => {}
        }
    }

    /// The number of client ids, for audit logs.
    fn reported_context(&self) -> Value {
        json!(self.client_ids.len())
    }
}

const METHOD_REQUEST_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "account",
        kind: FieldKind::Str,
        required: false,
        nullable: true,
    },
    FieldSpec {
        name: "login",
        kind: FieldKind::Str,
        required: true,
        nullable: true,
    },
    FieldSpec {
        name: "token",
        kind: FieldKind::Str,
        required: true,
        nullable: true,
    },
    FieldSpec {
        name: "arguments",
        kind: FieldKind::Arguments,
        required: true,
        nullable: true,
    },
    FieldSpec {
        name: "method",
        kind: FieldKind::Str,
        required: true,
        nullable: false,
    },
];

/// The envelope every call must satisfy: credentials, target method name,
/// and the opaque arguments blob.
///
/// `login`, `token`, and `arguments` are required *keys* whose values may
/// still be empty; `method` must be present and non-empty.
#[derive(Debug, Default)]
pub struct MethodRequest {
    /// Account name; hashes as empty when absent.
    pub account: Option<String>,
    /// Login; `"admin"` switches authentication to the admin digest.
    pub login: Option<String>,
    /// Supplied authentication token.
    pub token: Option<String>,
    /// Raw method arguments, validated later by the inner schema.
    pub arguments: Option<Map<String, Value>>,
    /// Target business method name.
    pub method: Option<String>,
}

impl MethodRequest {
    /// Whether this request authenticates via the admin shortcut.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.login.as_deref() == Some(ADMIN_LOGIN)
    }
}

impl Schema for MethodRequest {
    fn fields() -> &'static [FieldSpec] {
        METHOD_REQUEST_FIELDS
    }

    fn bind(&mut self, name: &str, value: FieldValue) {
        match (name, value) {
            ("account", FieldValue::Str(s)) => self.account = Some(s),
            ("login", FieldValue::Str(s)) => self.login = Some(s),
            ("token", FieldValue::Str(s)) => self.token = Some(s),
            ("arguments", FieldValue::Map(m)) => self.arguments = Some(m),
            ("method", FieldValue::Str(s)) => self.method = Some(s),
            _ => {}
        }
    }
}
