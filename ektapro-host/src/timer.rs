//! Engine callbacks on the console thread
//!
//! The engine keeps at most one tick pending, so a single deadline is
//! enough. The main loop sleeps on console input until the deadline and then
//! runs the tick.

use std::time::{Duration, Instant};

use ektapro_hal::TimerHost;

#[derive(Debug, Default)]
pub struct DeadlineTimer {
    deadline: Option<Instant>,
}

impl DeadlineTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time left until the pending tick, zero if overdue
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Clear and report an expired deadline
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

impl TimerHost for DeadlineTimer {
    fn call_after(&mut self, delay_ms: u32) {
        self.deadline = Some(Instant::now() + Duration::from_millis(delay_ms as u64));
    }
}
