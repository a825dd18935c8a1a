//! Tick timestamps and unit-carrying durations.
//!
//! Every actuator timeout is evaluated by comparing two [`Instant`]s taken
//! from the scheduler's monotonic clock; nothing here blocks.  Durations are
//! built through unit factories so call sites always name their unit:
//!
//! ```
//! use demeter::time::Duration;
//! assert_eq!(Duration::minutes(1), Duration::seconds(60));
//! ```

use core::fmt;
use core::ops::Add;

use serde::{Deserialize, Serialize};

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1_000;
/// Milliseconds per minute.
pub const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
/// Milliseconds per hour.
pub const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// A point on the controller's monotonic timeline, in milliseconds since
/// the clock started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant(u64);

impl Instant {
    pub const ZERO: Self = Self(0);

    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Time elapsed since `earlier`.  Saturates to zero if `earlier` is in
    /// the future.
    pub const fn duration_since(self, earlier: Instant) -> Duration {
        Duration(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Instant {
        Instant(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t+{}ms", self.0)
    }
}

/// A span of time with millisecond resolution.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Duration(u64);

impl Duration {
    pub const ZERO: Self = Self(0);

    pub const fn millis(ms: u64) -> Self {
        Self(ms)
    }

    pub const fn seconds(s: u64) -> Self {
        Self(s.saturating_mul(MS_PER_SECOND))
    }

    pub const fn minutes(m: u64) -> Self {
        Self(m.saturating_mul(MS_PER_MINUTE))
    }

    pub const fn hours(h: u64) -> Self {
        Self(h.saturating_mul(MS_PER_HOUR))
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn saturating_sub(self, rhs: Duration) -> Duration {
        Duration(self.0.saturating_sub(rhs.0))
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        Duration(self.0.saturating_add(rhs.0))
    }
}

impl From<core::time::Duration> for Duration {
    fn from(d: core::time::Duration) -> Self {
        Self(d.as_millis().min(u64::MAX as u128) as u64)
    }
}

impl From<Duration> for core::time::Duration {
    fn from(d: Duration) -> Self {
        core::time::Duration::from_millis(d.0)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.0;
        if ms != 0 && ms % MS_PER_MINUTE == 0 {
            write!(f, "{}min", ms / MS_PER_MINUTE)
        } else if ms != 0 && ms % MS_PER_SECOND == 0 {
            write!(f, "{}s", ms / MS_PER_SECOND)
        } else {
            write!(f, "{}ms", ms)
        }
    }
}
