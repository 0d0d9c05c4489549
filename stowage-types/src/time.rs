//! Epoch-millisecond time helpers.
//!
//! Profiles, history rows and `updated_at` stamps all use milliseconds since
//! the Unix epoch as a plain `i64`, which is also their JSON wire form.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in milliseconds since the Unix epoch.
///
/// A clock set before the epoch reads as `0`.
#[must_use]
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// An inclusive `[start, end]` window of epoch-millisecond timestamps.
///
/// Every time-series listing takes one of these; there is no unbounded scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    start: i64,
    end: i64,
}

impl TimeRange {
    /// Creates a range, rejecting `start > end`.
    pub fn new(start: i64, end: i64) -> Result<Self, Error> {
        if start > end {
            return Err(Error::InvalidTimeRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The range covering exactly one timestamp.
    #[must_use]
    pub const fn at(ts: i64) -> Self {
        Self { start: ts, end: ts }
    }

    #[must_use]
    pub const fn start(&self) -> i64 {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> i64 {
        self.end
    }

    /// Returns true if `ts` lies within the range (bounds inclusive).
    #[must_use]
    pub const fn contains(&self, ts: i64) -> bool {
        ts >= self.start && ts <= self.end
    }
}
