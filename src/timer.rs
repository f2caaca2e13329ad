use std::time::{Duration, Instant};

const NANOS_IN_SECOND: u64 = 1_000_000_000;

/// 8-bit countdown register, decremented once per timer tick until it rests at zero.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    count: u8,
}

impl Timer {
    pub fn new(init_count: u8) -> Self {
        Self { count: init_count }
    }

    pub fn get(&self) -> u8 {
        self.count
    }

    pub fn set(&mut self, value: u8) {
        self.count = value;
    }

    pub fn is_active(&self) -> bool {
        self.count > 0
    }

    pub fn tick(&mut self) {
        self.count = self.count.saturating_sub(1);
    }
}

/// Frequency, in hertz (per second)
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Hz(pub u64);

impl From<Hz> for Duration {
    fn from(freq: Hz) -> Self {
        if freq.0 == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(NANOS_IN_SECOND / freq.0)
        }
    }
}

/// A fixed-rate trigger measured against the wall clock.
///
/// When a deadline is observed late, the cadence restarts from the moment
/// of observation instead of firing the missed ticks. A host that stalls
/// simply resumes at the usual speed.
#[derive(Debug, Clone)]
pub struct Cadence {
    interval: Duration,
    last: Instant,
}

impl Cadence {
    pub fn new(freq: Hz, now: Instant) -> Self {
        Self {
            interval: freq.into(),
            last: now,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn reset(&mut self, now: Instant) {
        self.last = now;
    }

    /// Returns true when the interval has elapsed, and starts the next one at `now`.
    pub fn due(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) >= self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }

    /// Time left until the next deadline.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.interval
            .saturating_sub(now.saturating_duration_since(self.last))
    }
}
