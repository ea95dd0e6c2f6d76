//! Time source for agent timestamps

use chrono::{DateTime, Duration, SubsecRound, Utc};
use std::sync::Mutex;

/// Source of "now" for the agent store
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Millisecond-precision timestamp strictly after `previous`
///
/// Stored timestamps carry milliseconds only, so a clock reading that does not
/// clear `previous` after truncation is bumped by one millisecond.
pub fn next_timestamp(clock: &dyn Clock, previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = clock.now().trunc_subsecs(3);
    match previous {
        Some(previous) if now <= previous => previous + Duration::milliseconds(1),
        _ => now,
    }
}
