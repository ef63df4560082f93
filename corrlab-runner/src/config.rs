//! Analysis configuration, loaded from TOML.
//!
//! Every section and field has a default, so an empty document (or no file
//! at all) yields a working live-feed configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use corrlab_core::data::http::{FeedSettings, MAX_RETRIES};
use corrlab_core::data::{kma, yahoo};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Which series provider serves requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStrategy {
    /// Live feeds first, with the outage fallback policy.
    #[default]
    Live,
    /// Never touch the network.
    Synthetic,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrlabConfig {
    pub providers: ProvidersConfig,
    pub validation: ValidationConfig,
    pub insight: InsightConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub strategy: ProviderStrategy,
    /// Per-call HTTP timeout.
    pub timeout_secs: u64,
    /// Retries for transient feed errors; values above 1 are capped.
    pub max_retries: u32,
    pub breaker_cooldown_secs: u64,
    /// Master seed for synthetic series.
    pub seed: u64,
    pub market: MarketFeedConfig,
    pub weather: WeatherFeedConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            strategy: ProviderStrategy::Live,
            timeout_secs: 10,
            max_retries: 1,
            breaker_cooldown_secs: 300,
            seed: 42,
            market: MarketFeedConfig::default(),
            weather: WeatherFeedConfig::default(),
        }
    }
}

impl ProvidersConfig {
    pub fn feed_settings(&self) -> FeedSettings {
        FeedSettings {
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries.min(MAX_RETRIES),
            ..FeedSettings::default()
        }
    }

    pub fn breaker_cooldown(&self) -> Duration {
        Duration::from_secs(self.breaker_cooldown_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketFeedConfig {
    pub base_url: String,
}

impl Default for MarketFeedConfig {
    fn default() -> Self {
        Self {
            base_url: yahoo::DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherFeedConfig {
    pub base_url: String,
    pub station: String,
    /// Service key. Without one the weather source is synthesized.
    pub api_key: Option<String>,
}

impl Default for WeatherFeedConfig {
    fn default() -> Self {
        Self {
            base_url: kma::DEFAULT_BASE_URL.to_string(),
            station: kma::DEFAULT_STATION.to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Longest accepted span between start and end date, in days.
    pub max_range_days: i64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { max_range_days: 365 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// When false the template generator is always used.
    pub enabled: bool,
    /// OpenAI-compatible chat-completions URL.
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f64,
    pub timeout_secs: u64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            temperature: 0.4,
            timeout_secs: 20,
        }
    }
}

impl CorrlabConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make every request fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.providers.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "providers.timeout_secs must be positive".into(),
            ));
        }
        if self.validation.max_range_days <= 0 {
            return Err(ConfigError::Invalid(
                "validation.max_range_days must be positive".into(),
            ));
        }
        if self.insight.enabled {
            if self.insight.timeout_secs == 0 {
                return Err(ConfigError::Invalid(
                    "insight.timeout_secs must be positive".into(),
                ));
            }
            if !(0.0..=2.0).contains(&self.insight.temperature) {
                return Err(ConfigError::Invalid(format!(
                    "insight.temperature must be in [0, 2], got {}",
                    self.insight.temperature
                )));
            }
        }
        Ok(())
    }

    /// Weather API key, treating a blank string as absent.
    pub fn weather_api_key(&self) -> Option<&str> {
        self.providers
            .weather
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
    }
}
