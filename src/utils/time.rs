use chrono::{DateTime, Duration, Utc};
use std::sync::RwLock;

/// Source of "now" for freshness checks and timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to. Used to simulate cache expiry.
#[derive(Debug)]
pub struct ManualClock {
    current: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            current: RwLock::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut current = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = *current + by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        let mut current = self.current.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *current = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.current.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// True while `captured_at` is no older than `window` relative to `now`.
/// An entry exactly `window` old is still fresh.
pub fn is_within_window(captured_at: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> bool {
    match now.checked_sub_signed(window) {
        Some(cutoff) => captured_at >= cutoff,
        None => true,
    }
}

/// Convert timestamp to human readable format
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}
