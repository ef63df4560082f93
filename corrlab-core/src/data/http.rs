//! Blocking JSON client shared by the live feeds.
//!
//! Every call is bounded by the client timeout, retried at most once for
//! transient failures, and gated by the feed's circuit breaker.

use super::circuit_breaker::CircuitBreaker;
use super::provider::FeedError;
use reqwest::blocking::Client;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Hard cap on retries per call.
pub const MAX_RETRIES: u32 = 1;

/// Timeout and retry policy for one feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedSettings {
    pub timeout: Duration,
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            max_retries: 1,
            backoff: Duration::from_millis(250),
        }
    }
}

pub struct FeedClient {
    client: Client,
    breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    backoff: Duration,
}

impl FeedClient {
    pub fn new(breaker: Arc<CircuitBreaker>, settings: FeedSettings) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("corrlab/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FeedError::Client(e.to_string()))?;

        Ok(Self {
            client,
            breaker,
            max_retries: settings.max_retries.min(MAX_RETRIES),
            backoff: settings.backoff,
        })
    }

    pub fn feed(&self) -> &str {
        self.breaker.feed()
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// GET `url` and decode the JSON body.
    pub fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FeedError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                debug!(feed = self.feed(), attempt, "retrying feed request");
                std::thread::sleep(self.backoff);
            }

            if !self.breaker.is_allowed() {
                return Err(FeedError::CircuitBreakerTripped {
                    feed: self.feed().to_string(),
                });
            }

            match self.attempt(url) {
                Ok(body) => {
                    self.breaker.record_success();
                    return Ok(body);
                }
                Err(e) if e.is_transient() => {
                    self.breaker.record_failure();
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| FeedError::NetworkUnreachable("retries exhausted".into())))
    }

    fn attempt<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FeedError> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .map_err(classify_transport_error)?;
        let status = resp.status();

        if status == StatusCode::FORBIDDEN {
            self.breaker.trip();
            return Err(FeedError::CircuitBreakerTripped {
                feed: self.feed().to_string(),
            });
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(FeedError::RateLimited { retry_after_secs });
        }

        if status == StatusCode::UNAUTHORIZED {
            return Err(FeedError::AuthenticationRequired(format!(
                "{} rejected the credentials",
                self.feed()
            )));
        }

        if !status.is_success() {
            return Err(FeedError::HttpStatus {
                feed: self.feed().to_string(),
                status: status.as_u16(),
            });
        }

        resp.json::<T>().map_err(|e| {
            if e.is_timeout() {
                FeedError::Timeout(e.to_string())
            } else {
                FeedError::ResponseFormatChanged(format!("{}: {e}", self.feed()))
            }
        })
    }
}

fn classify_transport_error(e: reqwest::Error) -> FeedError {
    if e.is_timeout() {
        FeedError::Timeout(e.to_string())
    } else {
        FeedError::NetworkUnreachable(e.to_string())
    }
}
