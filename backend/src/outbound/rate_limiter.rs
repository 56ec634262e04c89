//! Minimum-interval limiter shared by every caller of one upstream service.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};

/// Spaces permitted calls at least `min_interval` apart.
///
/// Waiters queue on a fair mutex, so they are released in arrival order and
/// never in bursts. Acquiring never fails.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_permit: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Limiter with the given spacing between calls.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_permit: Mutex::new(None),
        }
    }

    /// Configured spacing.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait until the next call may proceed.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use backend::outbound::rate_limiter::RateLimiter;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let limiter = RateLimiter::new(Duration::from_millis(1));
    /// limiter.acquire().await;
    /// limiter.acquire().await;
    /// # }
    /// ```
    pub async fn acquire(&self) {
        let mut last_permit = self.last_permit.lock().await;
        if let Some(previous) = *last_permit {
            sleep_until(previous + self.min_interval).await;
        }
        *last_permit = Some(Instant::now());
    }
}
