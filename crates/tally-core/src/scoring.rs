//! Business functions for the two methods.
//!
//! `get_score` memoizes results in the cache side of the store; cache
//! failures degrade to a fresh computation rather than failing the request.
//! `get_interests` reads precomputed data from the persistent side, where a
//! store failure does surface to the caller.

use std::time::Duration;

use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use tally_store::Store;

use crate::error::{ApiError, ApiResult};
use crate::field::Gender;

/// How long a computed score stays cached.
pub const SCORE_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Fixed score returned to admin callers without touching the store.
pub const ADMIN_SCORE: u32 = 42;

/// Key format of precomputed interests entries.
fn interests_key(client_id: i64) -> String {
    format!("i:{client_id}")
}

/// Cache key for a score, derived from the identity-bearing fields.
fn score_key(
    first_name: Option<&str>,
    last_name: Option<&str>,
    phone: Option<&str>,
    birthday: Option<NaiveDate>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(first_name.unwrap_or_default());
    hasher.update(last_name.unwrap_or_default());
    hasher.update(phone.unwrap_or_default());
    if let Some(date) = birthday {
        hasher.update(date.format("%Y%m%d").to_string());
    }
    format!("uid:{}", hex::encode(hasher.finalize()))
}

/// Computes (or recalls) the score for one validated `online_score` request.
///
/// A cached non-zero score is returned as-is. Otherwise the score is the sum
/// of fixed weights for each supplied pair of facts, written back to the
/// cache best-effort. Cache errors are logged and treated as a miss.
#[allow(clippy::similar_names)]
pub fn get_score(
    store: &dyn Store,
    phone: Option<&str>,
    email: Option<&str>,
    birthday: Option<NaiveDate>,
    gender: Option<Gender>,
    first_name: Option<&str>,
    last_name: Option<&str>,
) -> f64 {
    let key = score_key(first_name, last_name, phone, birthday);
    match store.cache_get(&key) {
        Ok(Some(cached)) if cached != 0.0 => return cached,
        Ok(_) => {}
        Err(err) => {
            tracing::debug!(error = %err, "score cache read failed, computing fresh");
        }
    }

    let mut score = 0.0;
    if phone.is_some() {
        score += 1.5;
    }
    if email.is_some() {
        score += 1.5;
    }
    if birthday.is_some() && gender.is_some_and(|g| g != Gender::Unknown) {
        score += 1.5;
    }
    if first_name.is_some() && last_name.is_some() {
        score += 0.5;
    }

    if let Err(err) = store.cache_set(&key, score, SCORE_CACHE_TTL) {
        tracing::warn!(error = %err, "score cache write failed, continuing uncached");
    }
    score
}

/// Looks up the precomputed interests list for one client id.
///
/// An absent key reads as an empty list; a store failure or a malformed
/// entry is an internal error.
///
/// # Errors
///
/// Returns [`ApiError::Internal`] when the store is unreachable or the
/// stored entry is not a JSON string array.
pub fn get_interests(store: &dyn Store, client_id: i64) -> ApiResult<Vec<String>> {
    let key = interests_key(client_id);
    match store.get(&key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map_err(|err| ApiError::Internal(format!("malformed interests entry {key}: {err}"))),
        None => Ok(Vec::new()),
    }
}
