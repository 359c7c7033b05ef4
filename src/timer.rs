// Single-threaded deferred work: "run this once, `delay` from now", polled by the frame loop.
// Nothing here sleeps; the owner asks `fire(now)` every frame and drops/cancels on teardown.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Pending,
    Fired,
    Cancelled,
}

#[derive(Debug)]
pub struct Deferred {
    due: Instant,
    state: TimerState,
}

impl Deferred {
    pub fn after(now: Instant, delay: Duration) -> Self {
        Self { due: now + delay, state: TimerState::Pending }
    }

    /// True exactly once: on the first poll at or after the due time.
    pub fn fire(&mut self, now: Instant) -> bool {
        if self.state == TimerState::Pending && now >= self.due {
            self.state = TimerState::Fired;
            return true;
        }
        false
    }

    pub fn cancel(&mut self) {
        if self.state == TimerState::Pending {
            self.state = TimerState::Cancelled;
        }
    }

    pub fn is_pending(&self) -> bool {
        self.state == TimerState::Pending
    }

    #[cfg(test)]
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Time remaining (0 once due).
    #[cfg(test)]
    pub fn remaining(&self, now: Instant) -> Duration {
        self.due.saturating_duration_since(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_at_the_due_time() {
        let t0 = Instant::now();
        let mut d = Deferred::after(t0, Duration::from_millis(100));
        assert!(!d.fire(t0 + Duration::from_millis(99)));
        assert!(d.fire(t0 + Duration::from_millis(100)));
        assert!(!d.fire(t0 + Duration::from_millis(200)));
        assert_eq!(d.state(), TimerState::Fired);
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let t0 = Instant::now();
        let mut d = Deferred::after(t0, Duration::from_millis(10));
        d.cancel();
        assert!(!d.fire(t0 + Duration::from_secs(1)));
        assert_eq!(d.state(), TimerState::Cancelled);
        assert_eq!(d.remaining(t0 + Duration::from_secs(1)), Duration::ZERO);
    }
}
