//! Pacing for image-generation calls.
//!
//! [`RateLimiter`] hands out at most `capacity` permits per rolling `window`.
//! Each permit comes back `window` after it was taken, so a burst of
//! `capacity` calls is followed by a pause until the oldest permit returns.
//! Waiting selects on a [`CancellationToken`] so a cancelled run never
//! sits out the remainder of a window.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::StageError;

/// Rolling-window token bucket shared by every image task of one run.
pub struct RateLimiter {
    capacity: usize,
    window: Duration,
    /// Issue times of permits still inside the window, oldest first.
    issued: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn new(capacity: u32, window: Duration) -> Self {
        let capacity = usize::try_from(capacity.max(1)).unwrap_or(usize::MAX);
        Self {
            capacity,
            window,
            issued: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Wait for a permit.
    ///
    /// # Errors
    ///
    /// Returns [`StageError::Cancelled`] if `token` is cancelled before a
    /// permit is granted. A cancelled token never receives a permit.
    pub async fn acquire(&self, token: &CancellationToken) -> Result<(), StageError> {
        loop {
            if token.is_cancelled() {
                return Err(StageError::Cancelled);
            }

            let resume_at = {
                let mut issued = self.issued.lock().await;
                let now = Instant::now();
                while issued
                    .front()
                    .is_some_and(|t| now.duration_since(*t) >= self.window)
                {
                    issued.pop_front();
                }
                match issued.front() {
                    Some(oldest) if issued.len() >= self.capacity => *oldest + self.window,
                    _ => {
                        issued.push_back(now);
                        return Ok(());
                    }
                }
            };

            tracing::info!(
                capacity = self.capacity,
                window_secs = self.window.as_secs(),
                wait_ms = resume_at
                    .saturating_duration_since(Instant::now())
                    .as_millis(),
                "image generation budget spent; pacing"
            );

            tokio::select! {
                biased;
                () = token.cancelled() => return Err(StageError::Cancelled),
                () = tokio::time::sleep_until(resume_at) => {}
            }
        }
    }
}
