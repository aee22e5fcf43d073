//! Minimum spacing between fetches.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum delay between consecutive [`RateLimiter::wait`] calls
#[derive(Debug)]
pub struct RateLimiter {
    delay: Duration,
    last: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Sleep for whatever is left of the delay since the previous call, then
    /// record this one. The first call never sleeps.
    pub async fn wait(&self) {
        let mut last = self.last.lock().await;

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.delay {
                let remaining = self.delay - elapsed;
                tracing::debug!(?remaining, "Rate limiting");
                tokio::time::sleep(remaining).await;
            }
        }

        *last = Some(Instant::now());
    }
}
