//! Request pacing for external lookups.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::{sleep_until, Duration, Instant};

/// Sliding-window quota: at most `max_requests` calls in any `window`.
///
/// Requests under the quota go out immediately. Clones share the same
/// history, so every clone of a client counts against one quota.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    recent: Arc<Mutex<VecDeque<Instant>>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    /// `max_requests` is raised to 1 if zero.
    pub fn new(max_requests: usize, window: Duration) -> Self {
        let max_requests = max_requests.max(1);
        Self {
            recent: Arc::new(Mutex::new(VecDeque::with_capacity(max_requests))),
            max_requests,
            window,
        }
    }

    pub const fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub const fn window(&self) -> Duration {
        self.window
    }

    /// Wait until one more request fits in the window, then record it.
    pub async fn acquire(&self) {
        let mut recent = self.recent.lock().await;

        let now = Instant::now();
        while recent
            .front()
            .is_some_and(|t| now.duration_since(*t) >= self.window)
        {
            recent.pop_front();
        }

        if recent.len() >= self.max_requests {
            if let Some(oldest) = recent.pop_front() {
                log::debug!("Request quota reached; waiting for the window to move");
                sleep_until(oldest + self.window).await;
            }
        }

        recent.push_back(Instant::now());
    }
}
