//! Series provider trait, feed traits and structured error types.
//!
//! A [`SeriesProvider`] turns a source identifier and a date range into a
//! [`NamedSeries`]. Providers sit on top of lower-level feeds
//! ([`PriceFeed`], [`WeatherFeed`]) so feeds can be swapped or mocked in tests.

use crate::domain::{DataPoint, NamedSeries, SourceId, UnknownSourceError};
use chrono::NaiveDate;
use thiserror::Error;

/// Errors a provider surfaces to the caller.
///
/// Feed outages are deliberately absent: providers absorb them into an
/// empty or synthetic series.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(transparent)]
    UnknownSource(#[from] UnknownSourceError),

    #[error("invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// Errors from a single external feed call.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("rate limited by feed (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("HTTP {status} from {feed}")]
    HttpStatus { feed: String, status: u16 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("feed rejected the request ({code}): {message}")]
    Rejected { code: String, message: String },

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: {feed} circuit breaker is open")]
    CircuitBreakerTripped { feed: String },

    #[error("invalid feed endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl FeedError {
    /// Whether a single retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            FeedError::NetworkUnreachable(_)
            | FeedError::Timeout(_)
            | FeedError::RateLimited { .. } => true,
            FeedError::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Produces one named daily series per call.
pub trait SeriesProvider: Send + Sync {
    /// Human-readable strategy name, used in logs.
    fn name(&self) -> &str;

    /// Fetch the series for `source` over the inclusive range `[start, end]`.
    fn fetch(
        &self,
        source: SourceId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<NamedSeries, ProviderError>;

    /// Fetch by wire identifier. Unknown identifiers are an error, never an
    /// empty series.
    fn fetch_by_id(
        &self,
        source_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<NamedSeries, ProviderError> {
        let source: SourceId = source_id.parse()?;
        self.fetch(source, start, end)
    }
}

/// Historical daily closing prices keyed by a ticker symbol.
pub trait PriceFeed: Send + Sync {
    fn name(&self) -> &str;

    /// Daily closes in `[start, end]`, ascending. Gaps are allowed.
    fn daily_closes(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DataPoint>, FeedError>;
}

/// Daily mean temperature for one fixed station.
pub trait WeatherFeed: Send + Sync {
    fn name(&self) -> &str;

    /// Daily means in `[start, end]`. Days without a reading are omitted.
    fn daily_mean_temperature(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DataPoint>, FeedError>;
}

pub(crate) fn check_range(start: NaiveDate, end: NaiveDate) -> Result<(), ProviderError> {
    if start > end {
        return Err(ProviderError::InvalidRange { start, end });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(FeedError::Timeout("slow".into()).is_transient());
        assert!(FeedError::NetworkUnreachable("down".into()).is_transient());
        assert!(FeedError::RateLimited { retry_after_secs: 1 }.is_transient());
        assert!(FeedError::HttpStatus { feed: "x".into(), status: 503 }.is_transient());
        assert!(!FeedError::HttpStatus { feed: "x".into(), status: 404 }.is_transient());
        assert!(!FeedError::ResponseFormatChanged("bad".into()).is_transient());
        assert!(!FeedError::CircuitBreakerTripped { feed: "x".into() }.is_transient());
    }

    #[test]
    fn range_check() {
        let a = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert!(check_range(a, b).is_ok());
        assert!(check_range(a, a).is_ok());
        assert!(matches!(check_range(b, a), Err(ProviderError::InvalidRange { .. })));
    }
}
