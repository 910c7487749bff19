use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Default)]
struct Inner {
    stopped: Mutex<bool>,
    wake: Condvar,
}

/// Cloneable stop request shared between the loop and an interrupt handler.
///
/// Once raised it stays raised.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<Inner>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal and wake any sleeper.
    pub fn request_stop(&self) {
        let mut stopped = self.inner.stopped.lock();
        *stopped = true;
        self.inner.wake.notify_all();
    }

    pub fn is_stop_requested(&self) -> bool {
        *self.inner.stopped.lock()
    }

    /// Wait up to `duration` for a stop request. Returns `true` if stopped.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let mut stopped = self.inner.stopped.lock();
        match Instant::now().checked_add(duration) {
            Some(deadline) => {
                while !*stopped {
                    if self.inner.wake.wait_until(&mut stopped, deadline).timed_out() {
                        break;
                    }
                }
            }
            None => {
                while !*stopped {
                    self.inner.wake.wait(&mut stopped);
                }
            }
        }
        *stopped
    }
}
