//! Clock abstraction for determinism.

use chrono::{DateTime, Utc};

/// Abstraction over wall-clock time.
///
/// Only used to stamp observable moments such as the start of a draw;
/// draw timing itself runs on the async runtime's monotonic timers.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
