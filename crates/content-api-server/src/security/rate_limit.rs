use std::sync::Mutex;
use std::time::{Duration, Instant};

use dashmap::DashMap;

pub const WINDOW: Duration = Duration::from_secs(15 * 60);
pub const MAX_REQUESTS: u32 = 100;

struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window admission control, counted per client identity.
///
/// Expired windows are swept at most once per window duration, amortized
/// into `check_at`, so the map stays proportional to identities seen in
/// the current window rather than every address ever observed.
///
/// In-process only — a multi-instance deployment would need the counters
/// centralized behind this same admit/reject contract.
pub struct RateLimiter {
    windows: DashMap<String, Window>,
    limit: u32,
    window: Duration,
    last_sweep: Mutex<Instant>,
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            limit,
            window,
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    /// Count this request and decide admission. The counter resets exactly
    /// when the current time passes the window start plus its duration.
    pub fn check(&self, identity: &str) -> bool {
        self.check_at(identity, Instant::now())
    }

    pub fn check_at(&self, identity: &str, now: Instant) -> bool {
        let admitted = {
            let mut entry = self
                .windows
                .entry(identity.to_string())
                .or_insert_with(|| Window {
                    started: now,
                    count: 0,
                });

            if now.duration_since(entry.started) >= self.window {
                entry.started = now;
                entry.count = 0;
            }

            entry.count += 1;
            entry.count <= self.limit
        };

        // Entry guard dropped above; retain takes the shard locks itself.
        self.maybe_sweep(now);
        admitted
    }

    fn maybe_sweep(&self, now: Instant) {
        let mut last = match self.last_sweep.try_lock() {
            Ok(guard) => guard,
            // Another request is already sweeping.
            Err(_) => return,
        };
        if now.duration_since(*last) < self.window {
            return;
        }
        *last = now;

        self.windows
            .retain(|_, w| now.duration_since(w.started) < self.window);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(MAX_REQUESTS, WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_up_to_the_threshold() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        assert!(limiter.check("1.2.3.4"));
        assert!(limiter.check("1.2.3.4"));
        assert!(limiter.check("1.2.3.4"));
        assert!(!limiter.check("1.2.3.4"));
        assert!(!limiter.check("1.2.3.4"));
    }

    #[test]
    fn identities_are_counted_independently() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check("1.2.3.4"));
        assert!(!limiter.check("1.2.3.4"));
        assert!(limiter.check("5.6.7.8"));
    }

    #[test]
    fn counter_resets_exactly_at_rollover() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();

        assert!(limiter.check_at("1.2.3.4", start));
        assert!(limiter.check_at("1.2.3.4", start));
        assert!(!limiter.check_at("1.2.3.4", start + Duration::from_secs(59)));

        // Exactly at window start + duration the count is back to zero.
        assert!(limiter.check_at("1.2.3.4", start + Duration::from_secs(60)));
        assert!(limiter.check_at("1.2.3.4", start + Duration::from_secs(61)));
        assert!(!limiter.check_at("1.2.3.4", start + Duration::from_secs(62)));
    }

    #[test]
    fn expired_windows_are_evicted() {
        let limiter = RateLimiter::new(2, Duration::from_millis(1));
        let start = Instant::now();

        for i in 0..1000 {
            let identity = format!("10.0.{}.{}", i / 256, i % 256);
            limiter.check_at(&identity, start);
        }
        assert!(limiter.windows.len() >= 1000);

        // One request past the sweep interval drops every stale window;
        // only the identity making that request survives.
        assert!(limiter.check_at("198.51.100.1", start + Duration::from_secs(1)));
        assert_eq!(limiter.windows.len(), 1);
    }

    #[test]
    fn sweep_does_not_disturb_an_active_window() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();

        assert!(limiter.check_at("1.2.3.4", start));
        // Rollover resets and re-stamps this window; the sweep that runs in
        // the same call must keep it.
        assert!(limiter.check_at("1.2.3.4", start + Duration::from_secs(120)));
        assert_eq!(limiter.windows.len(), 1);
        assert!(limiter.check_at("1.2.3.4", start + Duration::from_secs(121)));
        assert!(!limiter.check_at("1.2.3.4", start + Duration::from_secs(122)));
    }

    #[test]
    fn defaults_match_the_published_policy() {
        let limiter = RateLimiter::default();
        assert_eq!(limiter.limit, 100);
        assert_eq!(limiter.window, Duration::from_secs(900));
    }
}
