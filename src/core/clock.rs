//! Time sources for measuring time-in-state.
//!
//! The machine samples the clock once per state entry and again whenever
//! `time_in_state` is read.

use std::cell::Cell;
use std::time::{Duration, Instant};

/// Monotonic time source.
///
/// `now` returns the time elapsed since an arbitrary, fixed origin. It must
/// never go backwards.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall-time clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock advanced explicitly by the host, e.g. once per frame.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use tickstate::core::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// clock.advance(Duration::from_millis(16));
/// assert_eq!(clock.now(), Duration::from_millis(16));
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }

    /// Jump to `now`. Earlier values are ignored so time stays monotonic.
    pub fn set(&self, now: Duration) {
        if now > self.now.get() {
            self.now.set(now);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}
