//! Fixed-window failure counter for login attempts.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

const DEFAULT_WINDOW: Duration = Duration::from_secs(15 * 60);
const DEFAULT_MAX_FAILURES: u32 = 10;

/// Per-key (tenant + e-mail) brute-force throttle.
///
/// Counts failures within a fixed window; a successful login clears the key.
#[derive(Debug)]
pub struct LoginLimiter {
    window: Duration,
    max_failures: u32,
    slots: Mutex<HashMap<String, (Instant, u32)>>,
}

impl Default for LoginLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, DEFAULT_MAX_FAILURES)
    }
}

impl LoginLimiter {
    pub fn new(window: Duration, max_failures: u32) -> Self {
        Self {
            window,
            max_failures,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Whether another attempt is allowed right now.
    pub fn check(&self, key: &str) -> bool {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        match slots.get(key) {
            Some((start, count)) if start.elapsed() < self.window => *count < self.max_failures,
            Some(_) => {
                slots.remove(key);
                true
            }
            None => true,
        }
    }

    pub fn record_failure(&self, key: &str) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        let slot = slots.entry(key.to_string()).or_insert((Instant::now(), 0));
        if slot.0.elapsed() >= self.window {
            *slot = (Instant::now(), 0);
        }
        slot.1 += 1;
    }

    pub fn reset(&self, key: &str) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_failure_budget() {
        let limiter = LoginLimiter::new(Duration::from_secs(60), 3);
        for _ in 0..3 {
            assert!(limiter.check("acme:a@b"));
            limiter.record_failure("acme:a@b");
        }
        assert!(!limiter.check("acme:a@b"));
    }

    #[test]
    fn keys_are_independent() {
        let limiter = LoginLimiter::new(Duration::from_secs(60), 1);
        limiter.record_failure("acme:a@b");
        assert!(!limiter.check("acme:a@b"));
        assert!(limiter.check("globex:a@b"));
    }

    #[test]
    fn reset_clears_the_counter() {
        let limiter = LoginLimiter::new(Duration::from_secs(60), 1);
        limiter.record_failure("acme:a@b");
        assert!(!limiter.check("acme:a@b"));
        limiter.reset("acme:a@b");
        assert!(limiter.check("acme:a@b"));
    }

    #[test]
    fn window_expiry_reopens_the_key() {
        let limiter = LoginLimiter::new(Duration::from_millis(10), 1);
        limiter.record_failure("acme:a@b");
        assert!(!limiter.check("acme:a@b"));
        std::thread::sleep(Duration::from_millis(20));
        assert!(limiter.check("acme:a@b"));
    }
}
