//! Build the configured series provider.

use std::sync::Arc;

use tracing::info;

use corrlab_core::data::{
    CircuitBreaker, FeedClient, FeedError, KmaWeatherFeed, LiveProvider, PriceFeed,
    SeriesProvider, SyntheticGenerator, SyntheticProvider, WeatherFeed, YahooFeed,
};
use corrlab_core::rng::SeedHierarchy;

use crate::config::{CorrlabConfig, ProviderStrategy};

/// Construct the provider named by `config.providers.strategy`.
///
/// The live strategy only wires a weather feed when an API key is present.
pub fn build_provider(config: &CorrlabConfig) -> Result<Arc<dyn SeriesProvider>, FeedError> {
    let providers = &config.providers;
    let synth = SyntheticGenerator::new(SeedHierarchy::new(providers.seed));

    match providers.strategy {
        ProviderStrategy::Synthetic => {
            info!(seed = providers.seed, "using synthetic provider");
            Ok(Arc::new(SyntheticProvider::new(synth)))
        }
        ProviderStrategy::Live => {
            let settings = providers.feed_settings();
            let cooldown = providers.breaker_cooldown();

            let market_breaker = Arc::new(CircuitBreaker::new("yahoo_finance", cooldown));
            let price: Arc<dyn PriceFeed> = Arc::new(YahooFeed::new(
                FeedClient::new(market_breaker, settings)?,
                providers.market.base_url.clone(),
            ));

            let weather: Option<Arc<dyn WeatherFeed>> = match config.weather_api_key() {
                Some(key) => {
                    let breaker = Arc::new(CircuitBreaker::new("kma_asos", cooldown));
                    Some(Arc::new(KmaWeatherFeed::new(
                        FeedClient::new(breaker, settings)?,
                        providers.weather.base_url.clone(),
                        key,
                        providers.weather.station.clone(),
                    )))
                }
                None => None,
            };

            info!(
                timeout_secs = providers.timeout_secs,
                weather_feed = weather.is_some(),
                "using live provider"
            );
            Ok(Arc::new(LiveProvider::new(price, weather, synth)))
        }
    }
}
