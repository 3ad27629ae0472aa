//! Control-cycle time.
//!
//! Behaviors never read a clock themselves. The caller samples the clock once
//! at the top of each control cycle and hands the same [`Timestamp`] to every
//! behavior, so all timing decisions within one step agree.

use std::fmt;
use std::time::Instant;

/// Monotonic milliseconds since an arbitrary epoch.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Zero; the initial value of every recorded transition time.
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Create a timestamp from milliseconds.
    #[inline]
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Milliseconds value.
    #[inline]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed from `earlier` to `self`.
    ///
    /// Saturates at zero if `earlier` is in the future.
    #[inline]
    pub fn since(self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    /// Timestamp `ms` milliseconds after `self`.
    #[inline]
    pub fn offset(self, ms: u64) -> Timestamp {
        Timestamp(self.0 + ms)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Wall-clock backed millisecond source for real control loops.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    /// Start a clock; the first reading is close to zero.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Current time. Read once per cycle.
    pub fn now(&self) -> Timestamp {
        Timestamp(self.start.elapsed().as_millis() as u64)
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}
