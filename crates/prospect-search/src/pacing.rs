//! Request pacing primitives: the sliding rate window, the shared
//! cooldown deadline, and the jitter helper.
//!
//! The rate limit is a property of the remote surface, not of any single
//! caller, so both structures describe process-wide state. The window is
//! owned by the scheduler worker; the cooldown is shared between the
//! worker (reads) and the retry policy (extends).

use rand::Rng;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Width of the rolling admission window.
const WINDOW: Duration = Duration::from_secs(60);

/// Sliding-window counter over the trailing sixty seconds.
///
/// A sliding window avoids the burst-at-boundary behaviour of fixed
/// buckets: the cap holds at every instant, not just at bucket edges.
#[derive(Debug)]
pub(crate) struct RateWindow {
    cap: usize,
    timestamps: VecDeque<Instant>,
}

impl RateWindow {
    pub(crate) fn new(cap: usize) -> Self {
        Self {
            // A cap of zero would never admit anything.
            cap: cap.max(1),
            timestamps: VecDeque::new(),
        }
    }

    /// How long the caller must wait before its request may fire.
    ///
    /// Prunes entries older than the window, then returns zero while the
    /// window has room. At capacity, the wait is the time until the oldest
    /// entry ages out. The caller sleeps the wait (plus jitter) and then
    /// calls [`RateWindow::record`].
    pub(crate) fn admit(&mut self, now: Instant) -> Duration {
        while let Some(&oldest) = self.timestamps.front() {
            if now.saturating_duration_since(oldest) > WINDOW {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }

        if self.timestamps.len() < self.cap {
            return Duration::ZERO;
        }

        let oldest = *self
            .timestamps
            .front()
            .expect("window at capacity has a front entry");
        WINDOW.saturating_sub(now.saturating_duration_since(oldest))
    }

    /// Record an admitted request at `now`.
    pub(crate) fn record(&mut self, now: Instant) {
        self.timestamps.push_back(now);
    }
}

/// Forward-only deadline tripped by throttling responses.
///
/// While the deadline lies in the future every scheduled request waits it
/// out before anything else. The deadline only ever moves forward; a storm
/// of failures can lengthen a cooldown but never reset a longer wait back
/// down. Expiry is implicit: once the deadline is in the past it has no
/// effect and nothing needs clearing.
#[derive(Debug, Default)]
pub(crate) struct Cooldown {
    deadline: Mutex<Option<Instant>>,
}

impl Cooldown {
    /// Push the deadline to at least `period` from now.
    pub(crate) fn extend(&self, period: Duration) {
        let target = Instant::now() + period;
        let mut deadline = self.deadline.lock().expect("cooldown lock poisoned");
        *deadline = Some(deadline.map_or(target, |current| current.max(target)));
    }

    /// Time left until the deadline, or zero when no cooldown is active.
    pub(crate) fn remaining(&self) -> Duration {
        let deadline = self.deadline.lock().expect("cooldown lock poisoned");
        deadline.map_or(Duration::ZERO, |d| {
            d.saturating_duration_since(Instant::now())
        })
    }
}

/// A random delay in `[0, max]`, used to desynchronize retry storms.
pub(crate) fn jitter(max: Duration) -> Duration {
    if max.is_zero() {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..=max.as_millis() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_admits_up_to_cap_immediately() {
        let mut window = RateWindow::new(3);
        let start = Instant::now();
        for i in 0..3 {
            let at = start + Duration::from_secs(i);
            assert_eq!(window.admit(at), Duration::ZERO);
            window.record(at);
        }
    }

    #[test]
    fn test_over_cap_wait_is_strictly_positive() {
        let mut window = RateWindow::new(3);
        let start = Instant::now();
        for i in 0..3 {
            let at = start + Duration::from_secs(i);
            assert_eq!(window.admit(at), Duration::ZERO);
            window.record(at);
        }

        // Fourth admission within the same minute must wait for the oldest
        // entry to age out: 60s - 10s elapsed = 50s.
        let wait = window.admit(start + Duration::from_secs(10));
        assert!(wait > Duration::ZERO);
        assert_eq!(wait, Duration::from_secs(50));
    }

    #[test]
    fn test_aged_out_entries_make_room() {
        let mut window = RateWindow::new(2);
        let start = Instant::now();
        window.record(start);
        window.record(start + Duration::from_secs(1));

        // 61 seconds later both entries are stale.
        let later = start + Duration::from_secs(62);
        assert_eq!(window.admit(later), Duration::ZERO);
    }

    #[test]
    fn test_zero_cap_is_clamped() {
        let mut window = RateWindow::new(0);
        assert_eq!(window.admit(Instant::now()), Duration::ZERO);
    }

    #[test]
    fn test_cooldown_inactive_by_default() {
        let cooldown = Cooldown::default();
        assert_eq!(cooldown.remaining(), Duration::ZERO);
    }

    #[test]
    fn test_cooldown_extend_sets_deadline() {
        let cooldown = Cooldown::default();
        cooldown.extend(Duration::from_secs(30));
        let remaining = cooldown.remaining();
        assert!(remaining > Duration::from_secs(29));
        assert!(remaining <= Duration::from_secs(30));
    }

    #[test]
    fn test_cooldown_never_shrinks() {
        let cooldown = Cooldown::default();
        cooldown.extend(Duration::from_secs(60));
        // A shorter follow-up failure must not pull the deadline back in.
        cooldown.extend(Duration::from_secs(5));
        assert!(cooldown.remaining() > Duration::from_secs(58));
    }

    #[test]
    fn test_jitter_bounded() {
        let max = Duration::from_millis(20);
        for _ in 0..100 {
            assert!(jitter(max) <= max);
        }
        assert_eq!(jitter(Duration::ZERO), Duration::ZERO);
    }
}
