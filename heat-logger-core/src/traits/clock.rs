use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::session::stop_signal::StopSignal;

/// Time source for the acquisition loop.
pub trait Clock: Send {
    /// Wall-clock time; the authority for record timestamps.
    fn now(&self) -> DateTime<Utc>;

    /// Monotonic time since an arbitrary origin, used for cadence arithmetic.
    fn monotonic(&self) -> Duration;

    /// Block for `duration` or until `stop` is raised.
    ///
    /// Returns `true` if woken early by a stop request.
    fn sleep(&self, duration: Duration, stop: &StopSignal) -> bool;
}

/// `Clock` backed by the system clock.
#[derive(Debug, Clone)]
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
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn monotonic(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration, stop: &StopSignal) -> bool {
        stop.wait_timeout(duration)
    }
}
