//! Concrete series providers.
//!
//! [`LiveProvider`] routes each source to its external feed and applies the
//! outage policy: market sources come back empty and marked
//! [`SeriesOrigin::Unavailable`], weather falls back to the synthetic curve,
//! and count sources are always synthetic. [`SyntheticProvider`] never
//! touches the network.

use super::provider::{check_range, PriceFeed, ProviderError, SeriesProvider, WeatherFeed};
use super::synthetic::SyntheticGenerator;
use crate::domain::{NamedSeries, SeriesOrigin, SourceId, SourceKind, TimeSeries};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct LiveProvider {
    price: Arc<dyn PriceFeed>,
    weather: Option<Arc<dyn WeatherFeed>>,
    synth: SyntheticGenerator,
}

impl LiveProvider {
    /// `weather` is optional: without a configured weather feed the weather
    /// source is synthesized.
    pub fn new(
        price: Arc<dyn PriceFeed>,
        weather: Option<Arc<dyn WeatherFeed>>,
        synth: SyntheticGenerator,
    ) -> Self {
        Self {
            price,
            weather,
            synth,
        }
    }

    fn market(&self, source: SourceId, ticker: &str, start: NaiveDate, end: NaiveDate) -> NamedSeries {
        match self.price.daily_closes(ticker, start, end) {
            Ok(points) => {
                let series = TimeSeries::canonicalize(points);
                if series.is_empty() {
                    warn!(%source, ticker, feed = self.price.name(), "market feed returned no closes");
                    return NamedSeries::unavailable(source);
                }
                debug!(%source, ticker, points = series.len(), "market series fetched");
                NamedSeries::new(source, SeriesOrigin::LiveFeed, series)
            }
            Err(e) => {
                warn!(%source, ticker, feed = self.price.name(), error = %e, "market feed unavailable");
                NamedSeries::unavailable(source)
            }
        }
    }

    fn weather(&self, source: SourceId, start: NaiveDate, end: NaiveDate) -> NamedSeries {
        let Some(feed) = &self.weather else {
            debug!(%source, "no weather feed configured, synthesizing");
            return self.synthetic(source, start, end);
        };

        match feed.daily_mean_temperature(start, end) {
            Ok(points) if !points.is_empty() => {
                let series = TimeSeries::canonicalize(points);
                debug!(%source, points = series.len(), "weather series fetched");
                NamedSeries::new(source, SeriesOrigin::LiveFeed, series)
            }
            Ok(_) => {
                warn!(%source, feed = feed.name(), "weather feed returned no observations, synthesizing");
                self.synthetic(source, start, end)
            }
            Err(e) => {
                warn!(%source, feed = feed.name(), error = %e, "weather feed unavailable, synthesizing");
                self.synthetic(source, start, end)
            }
        }
    }

    fn synthetic(&self, source: SourceId, start: NaiveDate, end: NaiveDate) -> NamedSeries {
        NamedSeries::new(
            source,
            SeriesOrigin::Synthetic,
            self.synth.series_for(source, start, end),
        )
    }
}

impl SeriesProvider for LiveProvider {
    fn name(&self) -> &str {
        "live"
    }

    fn fetch(
        &self,
        source: SourceId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<NamedSeries, ProviderError> {
        check_range(start, end)?;
        Ok(match source.kind() {
            SourceKind::Market { ticker } => self.market(source, ticker, start, end),
            SourceKind::Weather => self.weather(source, start, end),
            SourceKind::Count => self.synthetic(source, start, end),
        })
    }
}

/// Offline provider: every source is generated locally.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticProvider {
    synth: SyntheticGenerator,
}

impl SyntheticProvider {
    pub fn new(synth: SyntheticGenerator) -> Self {
        Self { synth }
    }
}

impl SeriesProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        source: SourceId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<NamedSeries, ProviderError> {
        check_range(start, end)?;
        Ok(NamedSeries::new(
            source,
            SeriesOrigin::Synthetic,
            self.synth.series_for(source, start, end),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::FeedError;
    use crate::domain::DataPoint;
    use crate::rng::SeedHierarchy;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    struct FixedPrices {
        calls: AtomicUsize,
    }

    impl PriceFeed for FixedPrices {
        fn name(&self) -> &str {
            "fixed"
        }

        fn daily_closes(
            &self,
            _ticker: &str,
            start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<DataPoint>, FeedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            // Deliberately out of order.
            Ok(vec![
                DataPoint::new(start.succ_opt().unwrap(), 101.0),
                DataPoint::new(start, 100.0),
            ])
        }
    }

    struct DownPrices;

    impl PriceFeed for DownPrices {
        fn name(&self) -> &str {
            "down"
        }

        fn daily_closes(&self, _: &str, _: NaiveDate, _: NaiveDate) -> Result<Vec<DataPoint>, FeedError> {
            Err(FeedError::Timeout("simulated".into()))
        }
    }

    struct EmptyPrices;

    impl PriceFeed for EmptyPrices {
        fn name(&self) -> &str {
            "empty"
        }

        fn daily_closes(&self, _: &str, _: NaiveDate, _: NaiveDate) -> Result<Vec<DataPoint>, FeedError> {
            Ok(Vec::new())
        }
    }

    struct StubWeather(Result<Vec<DataPoint>, ()>);

    impl WeatherFeed for StubWeather {
        fn name(&self) -> &str {
            "stub"
        }

        fn daily_mean_temperature(&self, _: NaiveDate, _: NaiveDate) -> Result<Vec<DataPoint>, FeedError> {
            self.0
                .clone()
                .map_err(|_| FeedError::NetworkUnreachable("simulated".into()))
        }
    }

    fn synth() -> SyntheticGenerator {
        SyntheticGenerator::new(SeedHierarchy::new(7))
    }

    fn live(price: Arc<dyn PriceFeed>, weather: Option<Arc<dyn WeatherFeed>>) -> LiveProvider {
        LiveProvider::new(price, weather, synth())
    }

    #[test]
    fn market_series_is_sorted_and_live() {
        let prices = Arc::new(FixedPrices { calls: AtomicUsize::new(0) });
        let provider = live(prices.clone(), None);

        let named = provider
            .fetch(SourceId::KospiIndex, date(2024, 1, 1), date(2024, 1, 31))
            .unwrap();
        assert_eq!(named.origin, SeriesOrigin::LiveFeed);
        assert_eq!(named.name, "KOSPI 지수");
        assert_eq!(named.series.values().collect::<Vec<_>>(), vec![100.0, 101.0]);
        assert_eq!(prices.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn market_outage_is_empty_not_error() {
        let provider = live(Arc::new(DownPrices), None);
        let named = provider
            .fetch(SourceId::BtcPrice, date(2024, 1, 1), date(2024, 1, 31))
            .unwrap();
        assert_eq!(named.origin, SeriesOrigin::Unavailable);
        assert!(named.series.is_empty());
    }

    #[test]
    fn empty_market_response_is_unavailable() {
        let provider = live(Arc::new(EmptyPrices), None);
        let named = provider
            .fetch(SourceId::KospiIndex, date(2024, 1, 1), date(2024, 1, 1))
            .unwrap();
        assert_eq!(named.origin, SeriesOrigin::Unavailable);
        assert!(named.series.is_empty());
    }

    #[test]
    fn weather_without_feed_is_synthetic() {
        let provider = live(Arc::new(DownPrices), None);
        let named = provider
            .fetch(SourceId::WeatherSeoul, date(2024, 1, 1), date(2024, 1, 31))
            .unwrap();
        assert_eq!(named.origin, SeriesOrigin::Synthetic);
        assert_eq!(named.series.len(), 31);
    }

    #[test]
    fn weather_outage_falls_back_to_synthetic() {
        let weather: Arc<dyn WeatherFeed> = Arc::new(StubWeather(Err(())));
        let provider = live(Arc::new(DownPrices), Some(weather));
        let named = provider
            .fetch(SourceId::WeatherSeoul, date(2024, 1, 1), date(2024, 1, 10))
            .unwrap();
        assert!(named.is_synthetic());
        assert_eq!(named.series.len(), 10);
    }

    #[test]
    fn empty_weather_response_falls_back_to_synthetic() {
        let weather: Arc<dyn WeatherFeed> = Arc::new(StubWeather(Ok(Vec::new())));
        let provider = live(Arc::new(DownPrices), Some(weather));
        let named = provider
            .fetch(SourceId::WeatherSeoul, date(2024, 1, 1), date(2024, 1, 10))
            .unwrap();
        assert!(named.is_synthetic());
    }

    #[test]
    fn live_weather_is_used_when_available() {
        let points = vec![DataPoint::new(date(2024, 1, 2), -3.1)];
        let weather: Arc<dyn WeatherFeed> = Arc::new(StubWeather(Ok(points)));
        let provider = live(Arc::new(DownPrices), Some(weather));
        let named = provider
            .fetch(SourceId::WeatherSeoul, date(2024, 1, 1), date(2024, 1, 10))
            .unwrap();
        assert_eq!(named.origin, SeriesOrigin::LiveFeed);
        assert_eq!(named.series.len(), 1);
    }

    #[test]
    fn counts_are_always_synthetic() {
        let prices = Arc::new(FixedPrices { calls: AtomicUsize::new(0) });
        let provider = live(prices.clone(), None);
        let named = provider
            .fetch(SourceId::CovidCases, date(2024, 1, 1), date(2024, 1, 5))
            .unwrap();
        assert!(named.is_synthetic());
        assert_eq!(named.series.len(), 5);
        assert_eq!(prices.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unknown_id_is_an_error() {
        let provider = SyntheticProvider::new(synth());
        let err = provider
            .fetch_by_id("gold_price", date(2024, 1, 1), date(2024, 1, 5))
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownSource(_)));
        assert_eq!(err.to_string(), "unknown data source: gold_price");
    }

    #[test]
    fn inverted_range_is_rejected() {
        let provider = SyntheticProvider::new(synth());
        let err = provider
            .fetch(SourceId::WeatherSeoul, date(2024, 2, 1), date(2024, 1, 1))
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidRange { .. }));
    }

    #[test]
    fn synthetic_provider_covers_every_source() {
        let provider = SyntheticProvider::new(synth());
        for source in SourceId::ALL {
            let named = provider
                .fetch(source, date(2024, 1, 1), date(2024, 1, 31))
                .unwrap();
            assert!(named.is_synthetic());
            assert_eq!(named.series.len(), 31, "{source}");
        }
    }
}
