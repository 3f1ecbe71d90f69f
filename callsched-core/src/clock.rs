//! Clock capability. Everything that depends on "now" takes one of these.

use crate::wall_clock::Instant;

pub trait Clock {
    fn now(&self) -> Instant;
}

/// Reads the host wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::from(chrono::Utc::now())
    }
}

/// A frozen clock for tests and reproducible CLI runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Instant);

impl Clock for FixedClock {
    fn now(&self) -> Instant {
        self.0
    }
}
