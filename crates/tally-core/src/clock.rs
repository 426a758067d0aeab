//! Injected time source.
//!
//! The admin token digest depends on the current hour and the birthday rule
//! depends on "now", so both take their time from a [`Clock`] rather than
//! reading the wall clock directly. Production code uses [`SystemClock`];
//! tests use [`FixedClock`] to pin the hour.

use chrono::{DateTime, Utc};

/// A source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a given instant.
///
/// # Example
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use tally_core::{Clock, FixedClock};
///
/// let clock = FixedClock::at(Utc.with_ymd_and_hms(2017, 7, 19, 10, 0, 0).unwrap());
/// assert_eq!(clock.now().to_rfc3339(), "2017-07-19T10:00:00+00:00");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Creates a clock frozen at `instant`.
    #[must_use]
    pub const fn at(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
