//! Sliding-window rate limiting for outbound searches

use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::warn;

const WINDOW: Duration = Duration::from_secs(60);

/// Rate limiter shared by every in-flight request.
///
/// The whole prune/decide/sleep/record sequence runs while holding the lock, so
/// concurrent callers queue behind a sleeping one instead of racing past the bound.
#[derive(Debug)]
pub struct RateLimiter {
    calls_per_minute: usize,
    calls: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    /// * `calls_per_minute` - Maximum calls allowed in any trailing 60 second window (min 1)
    pub fn new(calls_per_minute: usize) -> Self {
        let calls_per_minute = calls_per_minute.max(1);
        Self {
            calls_per_minute,
            calls: Mutex::new(VecDeque::with_capacity(calls_per_minute)),
        }
    }

    /// Wait until a call slot is free, then record the call
    pub async fn acquire(&self) {
        let mut calls = self.calls.lock().await;
        loop {
            let now = Instant::now();
            while calls
                .front()
                .is_some_and(|oldest| now.duration_since(*oldest) >= WINDOW)
            {
                calls.pop_front();
            }

            if calls.len() < self.calls_per_minute {
                calls.push_back(now);
                return;
            }

            // Loop guard: len >= calls_per_minute >= 1, so front exists.
            let Some(oldest) = calls.front().copied() else {
                continue;
            };
            let sleep_for = WINDOW.saturating_sub(now.duration_since(oldest));
            warn!(
                calls_in_window = calls.len(),
                sleep_secs = sleep_for.as_secs_f64(),
                "Rate limit reached, sleeping {:.2}s",
                sleep_for.as_secs_f64()
            );
            tokio::time::sleep(sleep_for).await;
        }
    }

    /// Calls recorded in the current window, without pruning
    pub async fn window_len(&self) -> usize {
        self.calls.lock().await.len()
    }

    pub fn calls_per_minute(&self) -> usize {
        self.calls_per_minute
    }
}
