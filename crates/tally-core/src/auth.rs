//! Token authentication.
//!
//! Tokens are SHA-512 hex digests derived from the caller's credentials.
//! The admin login is special-cased: its expected token is derived from the
//! current hour, so it rotates hourly. The hour comes from the injected
//! [`Clock`], which keeps the admin path testable.
//!
//! Authentication has no persisted state; the expected digest is recomputed
//! on every request.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha512};

use crate::clock::Clock;
use crate::requests::MethodRequest;

/// Salt mixed into non-admin token digests.
pub const SALT: &str = "Otus";

/// Salt mixed into admin token digests.
pub const ADMIN_SALT: &str = "42";

/// Hour format hashed into the admin token.
const ADMIN_HOUR_FORMAT: &str = "%Y%m%d%H";

fn sha512_hex(input: &str) -> String {
    hex::encode(Sha512::digest(input.as_bytes()))
}

/// Computes the admin token valid for the hour containing `now`.
///
/// Exposed so tests and tooling can mint a currently valid token.
#[must_use]
pub fn admin_token(now: DateTime<Utc>) -> String {
    sha512_hex(&format!("{}{ADMIN_SALT}", now.format(ADMIN_HOUR_FORMAT)))
}

/// Computes the expected token for a non-admin `(account, login)` pair.
#[must_use]
pub fn user_token(account: &str, login: &str) -> String {
    sha512_hex(&format!("{account}{login}{SALT}"))
}

/// Checks the envelope's token against the expected digest.
///
/// Comparison is exact and case-sensitive. Absent account or login values
/// hash as empty strings.
#[must_use]
pub fn check_auth(request: &MethodRequest, clock: &dyn Clock) -> bool {
    let expected = if request.is_admin() {
        admin_token(clock.now())
    } else {
        user_token(
            request.account.as_deref().unwrap_or(""),
            request.login.as_deref().unwrap_or(""),
        )
    };
    request.token.as_deref() == Some(expected.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use chrono::TimeZone;

    fn clock() -> FixedClock {
        FixedClock::at(Utc.with_ymd_and_hms(2017, 7, 19, 10, 0, 0).unwrap())
    }

    fn envelope(account: &str, login: &str, token: String) -> MethodRequest {
        MethodRequest {
            account: Some(account.to_string()),
            login: Some(login.to_string()),
            token: Some(token),
            ..MethodRequest::default()
        }
    }

    #[test]
    fn test_valid_user_token() {
        let req = envelope("horns&hoofs", "h&f", user_token("horns&hoofs", "h&f"));
        assert!(check_auth(&req, &clock()));
    }

    #[test]
    fn test_invalid_user_token() {
        let req = envelope("horns&hoofs", "h&f", "sdd".to_string());
        assert!(!check_auth(&req, &clock()));
    }

    #[test]
    fn test_empty_account_hashes_as_empty_string() {
        let req = MethodRequest {
            account: None,
            login: Some("h&f".to_string()),
            token: Some(user_token("", "h&f")),
            ..MethodRequest::default()
        };
        assert!(check_auth(&req, &clock()));
    }

    #[test]
    fn test_admin_token_depends_on_hour() {
        let req = envelope("horns&hoofs", "admin", admin_token(clock().now()));
        assert!(check_auth(&req, &clock()));

        let next_hour = FixedClock::at(Utc.with_ymd_and_hms(2017, 7, 19, 11, 0, 0).unwrap());
        assert!(!check_auth(&req, &next_hour));
    }

    #[test]
    fn test_admin_ignores_account_in_digest() {
        let token = admin_token(clock().now());
        let first = envelope("a", "admin", token.clone());
        let second = envelope("b", "admin", token);
        assert!(check_auth(&first, &clock()));
        assert!(check_auth(&second, &clock()));
    }

    #[test]
    fn test_missing_token_fails() {
        let req = MethodRequest {
            login: Some("h&f".to_string()),
            ..MethodRequest::default()
        };
        assert!(!check_auth(&req, &clock()));
    }
}
