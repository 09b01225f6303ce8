//! Wall-clock abstraction.
//!
//! # Invariants
//! - `Clock::now` returns UTC instants truncated to whole milliseconds, the
//!   precision every timestamp is persisted with.

use chrono::{DateTime, TimeDelta, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Source of "now" for timers, overdue checks and audit timestamps.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        truncate_to_millis(Utc::now())
    }
}

/// Manually driven clock for deterministic tests and replays.
///
/// Clones share the same instant, so a test can keep a handle while a service
/// owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    epoch_ms: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            epoch_ms: Arc::new(AtomicI64::new(start.timestamp_millis())),
        }
    }

    /// Moves the clock by `delta` (negative values move it backwards).
    pub fn advance(&self, delta: TimeDelta) {
        self.epoch_ms
            .fetch_add(delta.num_milliseconds(), Ordering::SeqCst);
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        self.epoch_ms
            .store(instant.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        from_epoch_millis(self.epoch_ms.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Drops sub-millisecond precision.
pub fn truncate_to_millis(instant: DateTime<Utc>) -> DateTime<Utc> {
    from_epoch_millis(instant.timestamp_millis()).unwrap_or(instant)
}

/// Converts persisted epoch milliseconds back into an instant.
pub fn from_epoch_millis(epoch_ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(epoch_ms)
}
