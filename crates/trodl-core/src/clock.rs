// crates/trodl-core/src/clock.rs
//
// Time source abstraction for reward accrual.
//
// The ledger never reads the wall clock directly. Every component is handed
// the same `Clock`, so all checkpoints are taken from one source.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// Seconds since the Unix epoch.
pub type Timestamp = u64;

/// Number of seconds in one day (one accrual unit / lock unit).
pub const SECONDS_PER_DAY: u64 = 86_400;

/// A source of "now".
pub trait Clock: Send + Sync {
    /// Current time in whole seconds.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time from the system (UTC).
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        // Pre-epoch system time clamps to zero.
        u64::try_from(Utc::now().timestamp()).unwrap_or(0)
    }
}

/// A manually driven clock for simulations and tests.
///
/// Starts at a fixed instant and only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Move the clock forward by `seconds`. Returns the new time.
    ///
    /// Returns `None`, leaving the clock where it was, if the new time would
    /// not fit in a `Timestamp`.
    pub fn advance(&self, seconds: u64) -> Option<Timestamp> {
        self.now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                now.checked_add(seconds)
            })
            .ok()
            .map(|previous| previous + seconds)
    }

    /// Move the clock forward by whole days.
    pub fn advance_days(&self, days: u64) -> Option<Timestamp> {
        days.checked_mul(SECONDS_PER_DAY)
            .and_then(|seconds| self.advance(seconds))
    }

    /// Set the clock to an arbitrary instant, including one in the past.
    pub fn set(&self, at: Timestamp) {
        self.now.store(at, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}
