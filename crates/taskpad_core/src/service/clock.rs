//! Wall-clock abstraction for note ids, display stamps and reminder checks.

use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Source of the current local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> DateTime<FixedOffset> {
        (**self).now()
    }
}

/// Device clock in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Manually driven clock for deterministic callers.
#[derive(Debug)]
pub struct ManualClock {
    epoch_ms: AtomicI64,
    offset: FixedOffset,
}

impl ManualClock {
    /// Starts at `epoch_ms` in UTC.
    pub fn at_epoch_millis(epoch_ms: i64) -> Self {
        Self::with_offset(epoch_ms, Utc.fix())
    }

    pub fn with_offset(epoch_ms: i64, offset: FixedOffset) -> Self {
        Self {
            epoch_ms: AtomicI64::new(epoch_ms),
            offset,
        }
    }

    pub fn set_epoch_millis(&self, epoch_ms: i64) {
        self.epoch_ms.store(epoch_ms, Ordering::SeqCst);
    }

    pub fn advance_millis(&self, delta_ms: i64) {
        self.epoch_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        let millis = self.epoch_ms.load(Ordering::SeqCst);
        self.offset
            .timestamp_millis_opt(millis)
            .single()
            .unwrap_or_else(|| DateTime::<Utc>::UNIX_EPOCH.fixed_offset())
    }
}

#[cfg(test)]
mod tests {
    use super::{Clock, ManualClock};

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::at_epoch_millis(1_000);
        clock.advance_millis(500);
        assert_eq!(clock.now().timestamp_millis(), 1_500);
    }
}
