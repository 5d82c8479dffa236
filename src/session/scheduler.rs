use std::time::{Duration, Instant};

/// Default redraw interval, roughly one animation frame.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Trailing debounce for redraw requests.
///
/// Every [`request`](Self::request) pushes the deadline to `now + interval`; [`poll`](Self::poll)
/// fires once the requests have been quiet for a full interval. A burst of slider events
/// therefore renders once, with the settled state. Time is always passed in, never read.
#[derive(Clone, Copy, Debug)]
pub struct FrameDebounce {
    interval: Duration,
    deadline: Option<Instant>,
}

impl FrameDebounce {
    /// Debouncer with the given quiet interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    /// Quiet interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Ask for a redraw.
    pub fn request(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    /// Whether a redraw is waiting.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left until the pending redraw may run; `None` when idle.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Consume the pending request if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drop any pending request (after a forced render).
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

impl Default for FrameDebounce {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/scheduler.rs"]
mod tests;
