//! JSON-over-POST client for the Kaveri API with bounded retries.
//!
//! One logical request makes up to `max_retries` attempts. Every `429`
//! answer backs off linearly (`5 × attempt` seconds, 1-based), the last one
//! included. Any other failure backs off exponentially (`2^attempt` seconds,
//! 0-based) unless it was the last attempt. Every attempt is logged with its
//! endpoint and attempt number.

use crate::acquisition::http_session::HttpSession;
use crate::cartography::rate_limiter::Sleeper;
use crate::config::Config;
use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

/// Failure of a single attempt, or of a whole logical request.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Upstream answered `429 Too Many Requests`.
    #[error("rate limited (HTTP 429)")]
    RateLimited,
    /// Upstream answered with any other non-success status.
    #[error("HTTP {status}")]
    Status { status: u16 },
    /// Connection, TLS, or timeout failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Body was not the expected JSON shape.
    #[error("malformed response: {0}")]
    Decode(#[source] serde_json::Error),
    /// Every attempt failed; `last` is the final attempt's failure.
    #[error("all {attempts} attempts failed for {endpoint}")]
    Exhausted {
        endpoint: String,
        attempts: u32,
        #[source]
        last: Option<Box<FetchError>>,
    },
}

impl FetchError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchError::RateLimited)
    }
}

/// Backoff after a `429` on the given 0-based attempt.
pub fn rate_limit_backoff(attempt: u32) -> Duration {
    Duration::from_secs(5 * (u64::from(attempt) + 1))
}

/// Backoff after any other failure on the given 0-based attempt.
pub fn error_backoff(attempt: u32) -> Duration {
    Duration::from_secs(2u64.saturating_pow(attempt))
}

/// HTTP client bound to one API root and one header set.
pub struct HttpClient {
    inner: reqwest::Client,
    config: Config,
    sleeper: Arc<dyn Sleeper>,
}

impl HttpClient {
    pub fn new(config: &Config, sleeper: Arc<dyn Sleeper>) -> Result<Self> {
        let session = HttpSession::from_config(config)?;
        if session.uses_placeholder_credentials() {
            warn!("credentials are placeholders; requests will likely be rejected");
        }

        let inner = reqwest::Client::builder()
            .default_headers(session.headers().clone())
            .timeout(config.request_timeout)
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            inner,
            config: config.clone(),
            sleeper,
        })
    }

    /// POST `body` to `endpoint` with the configured retry budget.
    pub async fn request<T, B>(&self, endpoint: &str, body: &B) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request_with_retries(endpoint, body, self.config.max_retries)
            .await
    }

    /// POST `body` to `endpoint` making at most `max_retries` attempts.
    pub async fn request_with_retries<T, B>(
        &self,
        endpoint: &str,
        body: &B,
        max_retries: u32,
    ) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.config.endpoint_url(endpoint);
        let attempts = max_retries.max(1);
        let mut last = None;

        for attempt in 0..attempts {
            let number = attempt + 1;
            match self.attempt(&url, body).await {
                Ok(value) => {
                    info!(endpoint, attempt = number, "request succeeded");
                    return Ok(value);
                }
                Err(FetchError::RateLimited) => {
                    let wait = rate_limit_backoff(attempt);
                    warn!(
                        endpoint,
                        attempt = number,
                        wait_secs = wait.as_secs(),
                        "rate limited"
                    );
                    self.sleeper.sleep(wait).await;
                    last = Some(FetchError::RateLimited);
                }
                Err(e) => {
                    error!(endpoint, attempt = number, error = %e, "attempt failed");
                    if number < attempts {
                        self.sleeper.sleep(error_backoff(attempt)).await;
                    }
                    last = Some(e);
                }
            }
        }

        error!(endpoint, attempts, "all attempts failed");
        Err(FetchError::Exhausted {
            endpoint: endpoint.to_string(),
            attempts,
            last: last.map(Box::new),
        })
    }

    async fn attempt<T, B>(&self, url: &str, body: &B) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.inner.post(url).json(body).send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchError::RateLimited);
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(FetchError::Decode)
    }
}
