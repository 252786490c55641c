//! Request pacing for polite scraping.
//!
//! The upstream API publishes no rate limits, so every request is followed
//! by a fixed pause. All waiting (pacing and retry backoff) goes through a
//! [`Sleeper`] so it can be observed without actually waiting.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Something that can suspend the current task for a duration.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real sleeps on the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Records requested sleeps and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every duration requested so far, in order.
    pub fn recorded(&self) -> Vec<Duration> {
        self.slept.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut slept) = self.slept.lock() {
            slept.push(duration);
        }
    }
}

/// Fixed delay inserted after every request, regardless of its outcome.
pub struct RateLimiter {
    delay: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl RateLimiter {
    pub fn new(delay: Duration, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { delay, sleeper }
    }

    /// Wait out the configured delay. A zero delay returns immediately.
    pub async fn pause(&self) {
        if !self.delay.is_zero() {
            self.sleeper.sleep(self.delay).await;
        }
    }
}
