// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! Single-slot tick timer and per-run cancellation token.
//!
//! The timer never spawns anything. The owning event loop asks it how long
//! to wait and whether the pending tick is due, which keeps at most one tick
//! pending at any time.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Shared flag that ends a run at its next tick check.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call from any thread, any number of times.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A deferred, re-armable, one-shot timer.
#[derive(Debug, Clone)]
pub struct TickTimer {
    interval: Duration,
    deadline: Option<Instant>,
}

impl TickTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Arm the timer to fire one interval after `now`, replacing any
    /// previous deadline.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left before the pending tick, or `None` when nothing is armed.
    pub fn time_until(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Consume the pending tick if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if d <= now => {
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
    fn test_token_shared_between_clones() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!token.is_cancelled());
        other.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_timer_fires_once() {
        let start = Instant::now();
        let mut timer = TickTimer::new(Duration::from_millis(1000));
        assert!(!timer.take_due(start));

        timer.arm(start);
        assert!(timer.is_armed());
        assert!(!timer.take_due(start + Duration::from_millis(999)));
        assert!(timer.take_due(start + Duration::from_millis(1000)));
        assert!(!timer.is_armed());
        assert!(!timer.take_due(start + Duration::from_millis(5000)));
    }

    #[test]
    fn test_rearm_replaces_deadline() {
        let start = Instant::now();
        let mut timer = TickTimer::new(Duration::from_millis(100));
        timer.arm(start);
        timer.arm(start + Duration::from_millis(50));
        assert_eq!(
            timer.time_until(start + Duration::from_millis(100)),
            Some(Duration::from_millis(50))
        );
    }

    #[test]
    fn test_time_until_saturates() {
        let start = Instant::now();
        let mut timer = TickTimer::new(Duration::from_millis(10));
        assert_eq!(timer.time_until(start), None);
        timer.arm(start);
        assert_eq!(
            timer.time_until(start + Duration::from_secs(1)),
            Some(Duration::ZERO)
        );
        timer.disarm();
        assert!(!timer.is_armed());
    }
}
