//! services/mobile_client/src/adapters/clock.rs

use chrono::{DateTime, Utc};
use coach_core::ports::Clock;

/// The device's wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
