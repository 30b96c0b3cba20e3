//! Request rate limiting
//!
//! The limiter is injected into the server as `Arc<dyn RateLimiter>` so the
//! in-memory implementation can be swapped for a shared store.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default window length (10 minutes)
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(10 * 60);

/// Default requests allowed per window
pub const DEFAULT_MAX_REQUESTS: u32 = 20;

/// Prune stale windows once the map grows past this many keys
const PRUNE_THRESHOLD: usize = 10_000;

/// Decides whether a request from `key` may proceed
pub trait RateLimiter: Send + Sync {
    fn allow(&self, key: &str) -> bool;

    /// Seconds `key` should wait before retrying
    fn retry_after_secs(&self, key: &str) -> u64;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    start: Instant,
}

/// Fixed-window counter per key, held in process memory
#[derive(Debug)]
pub struct FixedWindowLimiter {
    window: Duration,
    max_requests: u32,
    hits: Mutex<HashMap<String, Window>>,
}

impl Default for FixedWindowLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, DEFAULT_MAX_REQUESTS)
    }
}

impl FixedWindowLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
            hits: Mutex::new(HashMap::new()),
        }
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Seconds left in `key`'s current window at `now`, rounded up
    ///
    /// A key with no open window gets the full window length.
    pub fn retry_after_at(&self, key: &str, now: Instant) -> u64 {
        let hits = self
            .hits
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let remaining = hits
            .get(key)
            .map(|w| self.window.saturating_sub(now.duration_since(w.start)))
            .filter(|left| !left.is_zero())
            .unwrap_or(self.window);

        remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
    }

    /// Record a hit for `key` at `now`
    ///
    /// A key's first hit, or its first hit after the window elapsed, opens a
    /// new window with a count of one. Within a window, hits are allowed
    /// until the count reaches `max_requests`.
    pub fn allow_at(&self, key: &str, now: Instant) -> bool {
        // Counters stay valid even if a holder panicked
        let mut hits = self
            .hits
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if hits.len() > PRUNE_THRESHOLD {
            let window = self.window;
            hits.retain(|_, w| now.duration_since(w.start) <= window);
        }

        match hits.get_mut(key) {
            Some(w) if now.duration_since(w.start) <= self.window => {
                if w.count >= self.max_requests {
                    tracing::debug!(key, count = w.count, "Rate limit exceeded");
                    false
                } else {
                    w.count += 1;
                    true
                }
            }
            _ => {
                hits.insert(
                    key.to_string(),
                    Window {
                        count: 1,
                        start: now,
                    },
                );
                true
            }
        }
    }
}

impl RateLimiter for FixedWindowLimiter {
    fn allow(&self, key: &str) -> bool {
        self.allow_at(key, Instant::now())
    }

    fn retry_after_secs(&self, key: &str) -> u64 {
        self.retry_after_at(key, Instant::now())
    }
}
