//! Time sources for cue dispatch.
//!
//! The sequencer schedules clips against absolute offsets from the cue start
//! rather than chained delays, so late wakeups never compound. [`SystemClock`]
//! backs production playback; [`ManualClock`] lets tests step time forward
//! deterministically without sleeping.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// A monotonic time source the cue dispatcher sleeps against.
///
/// `now()` reports the time elapsed since the clock's origin. `sleep_until()`
/// blocks the calling thread until `now()` has reached the given deadline,
/// returning immediately when the deadline has already passed.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
    fn sleep_until(&self, deadline: Duration);
}

/// Wall clock anchored at its creation instant.
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

    fn sleep_until(&self, deadline: Duration) {
        let now = self.now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

/// Manually advanced clock for deterministic tests.
///
/// Time only moves when [`ManualClock::advance`] or [`ManualClock::advance_to`]
/// is called; sleepers are woken as soon as the new time covers their deadline.
pub struct ManualClock {
    now: Mutex<Duration>,
    waiters: Condvar,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Duration::ZERO),
            waiters: Condvar::new(),
        }
    }

    /// Moves time forward by `delta` and wakes every sleeper whose deadline
    /// is now covered.
    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += delta;
        self.waiters.notify_all();
    }

    /// Moves time forward to `target`. Earlier targets are ignored; the clock
    /// never runs backwards.
    pub fn advance_to(&self, target: Duration) {
        let mut now = self.now.lock().unwrap();
        if target > *now {
            *now = target;
            self.waiters.notify_all();
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap()
    }

    fn sleep_until(&self, deadline: Duration) {
        let mut now = self.now.lock().unwrap();
        while *now < deadline {
            now = self.waiters.wait(now).unwrap();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn manual_clock_starts_at_zero() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), Duration::ZERO);
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new();
        clock.advance(Duration::from_millis(250));
        clock.advance(Duration::from_millis(250));
        assert_eq!(clock.now(), Duration::from_millis(500));
    }

    #[test]
    fn manual_clock_never_runs_backwards() {
        let clock = ManualClock::new();
        clock.advance_to(Duration::from_millis(400));
        clock.advance_to(Duration::from_millis(100));
        assert_eq!(clock.now(), Duration::from_millis(400));
    }

    #[test]
    fn sleep_until_past_deadline_returns_immediately() {
        let clock = ManualClock::new();
        clock.advance(Duration::from_millis(10));
        clock.sleep_until(Duration::from_millis(5));
        assert_eq!(clock.now(), Duration::from_millis(10));
    }

    #[test]
    fn advance_wakes_sleeper() {
        let clock = Arc::new(ManualClock::new());
        let sleeper_clock = Arc::clone(&clock);
        let sleeper = std::thread::spawn(move || {
            sleeper_clock.sleep_until(Duration::from_millis(100));
            sleeper_clock.now()
        });
        // The sleeper may not have parked yet; advancing is still correct
        // because sleep_until checks state, not notifications.
        clock.advance(Duration::from_millis(100));
        let woke_at = sleeper.join().unwrap();
        assert_eq!(woke_at, Duration::from_millis(100));
    }

    #[test]
    fn system_clock_skips_past_deadlines() {
        let clock = SystemClock::new();
        std::thread::sleep(Duration::from_millis(5));
        // Deadline already behind us: must not block.
        clock.sleep_until(Duration::from_millis(1));
        assert!(clock.now() >= Duration::from_millis(5));
    }
}
