//! Ledger time source.
//!
//! The hosting environment supplies "now"; callers never choose it. Every
//! entry point reads the clock exactly once and uses that value for all of
//! its checks and records.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use weeklyrace_types::Timestamp;

/// A monotonic, externally controlled source of ledger time.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time via `chrono::Utc::now`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_datetime(Utc::now())
    }
}

/// A clock that only moves when told to. Used by simulations and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(start.as_secs()),
        }
    }

    /// Jump to `to`. Moving backwards is ignored so time stays monotonic.
    pub fn set(&self, to: Timestamp) {
        self.now.fetch_max(to.as_secs(), Ordering::SeqCst);
    }

    /// Move forward by `secs`, saturating at the maximum timestamp.
    pub fn advance(&self, secs: u64) {
        let _ = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some(t.saturating_add(secs))
            });
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_secs(self.now.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(Timestamp(1_000));
        assert_eq!(clock.now(), Timestamp(1_000));
        clock.advance(50);
        assert_eq!(clock.now(), Timestamp(1_050));
    }

    #[test]
    fn manual_clock_never_goes_backwards() {
        let clock = ManualClock::new(Timestamp(1_000));
        clock.set(Timestamp(500));
        assert_eq!(clock.now(), Timestamp(1_000));
        clock.set(Timestamp(2_000));
        assert_eq!(clock.now(), Timestamp(2_000));
    }

    #[test]
    fn manual_clock_saturates() {
        let clock = ManualClock::new(Timestamp(u64::MAX - 1));
        clock.advance(10);
        assert_eq!(clock.now(), Timestamp(u64::MAX));
    }

    #[test]
    fn system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now() > Timestamp(1_577_836_800));
    }
}
