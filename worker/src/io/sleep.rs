//! Blocking pauses between worker steps.

use std::thread;
use std::time::Duration;

use tracing::trace;

/// Blocking pause. The worker never cancels a sleep once started.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by [`std::thread::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        trace!(secs = duration.as_secs_f64(), "sleeping");
        thread::sleep(duration);
    }
}
