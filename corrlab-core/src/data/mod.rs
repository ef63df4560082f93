//! Series acquisition: provider traits, live feeds, synthetic fallback, alignment.

pub mod align;
pub mod circuit_breaker;
pub mod http;
pub mod kma;
pub mod provider;
pub mod sources;
pub mod synthetic;
pub mod yahoo;

pub use align::{align, AlignedSample};
pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use http::{FeedClient, FeedSettings};
pub use kma::KmaWeatherFeed;
pub use provider::{FeedError, PriceFeed, ProviderError, SeriesProvider, WeatherFeed};
pub use sources::{LiveProvider, SyntheticProvider};
pub use synthetic::{SyntheticGenerator, WalkParams};
pub use yahoo::YahooFeed;

/// Round to cents.
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
