use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Sliding-window event rate, used for the status bar's ticks-per-second.
///
/// Record an event with [`record`](RateMeter::record); read the rate with
/// [`per_second`](RateMeter::per_second).
pub struct RateMeter {
    stamps: VecDeque<Instant>,
    window: Duration,
}

impl Default for RateMeter {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl RateMeter {
    pub fn new(window: Duration) -> Self {
        Self {
            stamps: VecDeque::new(),
            window,
        }
    }

    /// Record one event at `now`, dropping stamps that fell out of the window.
    pub fn record(&mut self, now: Instant) {
        self.stamps.push_back(now);
        while let Some(&front) = self.stamps.front() {
            if now.duration_since(front) > self.window {
                self.stamps.pop_front();
            } else {
                break;
            }
        }
    }

    /// Events per second over the window. Zero until two events are seen.
    pub fn per_second(&self) -> f64 {
        if self.stamps.len() < 2 || self.window.is_zero() {
            return 0.0;
        }
        self.stamps.len() as f64 / self.window.as_secs_f64()
    }
}
