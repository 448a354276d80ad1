//! A cancellable one-shot timer driven by the host's clock.
//!
//! The host calls [`Debounce::schedule`] on every event it wants to coalesce and polls
//! [`Debounce::fire_if_due`] from its event loop. Rescheduling pushes the deadline back, so a
//! burst of events fires once, `delay` after the last one.

use std::time::{Duration, Instant};

/// Deadline-based debounce timer.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    /// A disarmed timer firing `delay` after the last schedule.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// The configured delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm (or re-arm) the timer relative to `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Disarm the timer.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Returns `true` while armed.
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Disarm and return `true` if the deadline has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_fires_once_after_last_event() {
        let start = Instant::now();
        let mut timer = Debounce::new(Duration::from_millis(100));
        timer.schedule(start);
        timer.schedule(start + Duration::from_millis(60));
        assert!(!timer.fire_if_due(start + Duration::from_millis(120)));
        assert!(timer.fire_if_due(start + Duration::from_millis(160)));
        assert!(!timer.fire_if_due(start + Duration::from_millis(500)));
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut timer = Debounce::new(Duration::from_millis(10));
        timer.schedule(start);
        assert!(timer.is_pending());
        timer.cancel();
        assert!(!timer.fire_if_due(start + Duration::from_secs(1)));
    }
}
