use std::time::{Duration, Instant};

use dashmap::DashMap;

struct Window {
    failures: u32,
    started: Instant,
}

/// Per-username login brute force limiter over a fixed window.
pub struct LoginRateLimiter {
    windows: DashMap<String, Window>,
    max_failures: u32,
    window: Duration,
}

impl LoginRateLimiter {
    pub fn new(max_failures: u32, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_failures,
            window,
        }
    }

    /// Ok while the username is under its failure budget, otherwise the time
    /// left until the window resets. Does not count the attempt.
    pub fn check(&self, username: &str) -> Result<(), Duration> {
        let Some(entry) = self.windows.get(&username.to_lowercase()) else {
            return Ok(());
        };

        let elapsed = entry.started.elapsed();
        if elapsed > self.window || entry.failures < self.max_failures {
            return Ok(());
        }

        Err(self.window.saturating_sub(elapsed))
    }

    pub fn record_failure(&self, username: &str) {
        let now = Instant::now();
        let mut entry = self
            .windows
            .entry(username.to_lowercase())
            .or_insert(Window {
                failures: 0,
                started: now,
            });

        if now.duration_since(entry.started) > self.window {
            entry.failures = 1;
            entry.started = now;
        } else {
            entry.failures += 1;
        }
    }

    pub fn reset(&self, username: &str) {
        self.windows.remove(&username.to_lowercase());
    }

    pub fn cleanup(&self) {
        let window = self.window;
        self.windows.retain(|_, w| w.started.elapsed() < window);
    }
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(15 * 60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_after_max_failures() {
        let limiter = LoginRateLimiter::new(3, Duration::from_secs(60));
        for _ in 0..3 {
            assert!(limiter.check("alice").is_ok());
            limiter.record_failure("alice");
        }
        assert!(limiter.check("alice").is_err());
        assert!(limiter.check("ALICE").is_err());
        assert!(limiter.check("bob").is_ok());
    }

    #[test]
    fn reset_clears_failures() {
        let limiter = LoginRateLimiter::new(1, Duration::from_secs(60));
        limiter.record_failure("alice");
        assert!(limiter.check("alice").is_err());
        limiter.reset("alice");
        assert!(limiter.check("alice").is_ok());
    }

    #[test]
    fn window_expires() {
        let limiter = LoginRateLimiter::new(1, Duration::from_millis(10));
        limiter.record_failure("alice");
        std::thread::sleep(Duration::from_millis(20));
        assert!(limiter.check("alice").is_ok());
        limiter.cleanup();
        assert!(limiter.windows.is_empty());
    }
}
