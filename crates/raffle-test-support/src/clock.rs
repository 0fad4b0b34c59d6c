//! Test clock: deterministic `Clock` implementation for tests.

use chrono::{DateTime, TimeZone, Utc};
use raffle_core::clock::Clock;

/// A clock that always returns a fixed point in time.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// The instant used across the test suites.
    ///
    /// # Panics
    ///
    /// Never; the timestamp is a valid literal.
    #[must_use]
    pub fn standard() -> Self {
        Self(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
