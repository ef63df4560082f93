//! The fixed catalogue of data sources a user can pick from.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier of one selectable data series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    WeatherSeoul,
    KospiIndex,
    BtcPrice,
    CovidCases,
}

/// How a source's values are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Daily mean temperature from a meteorological feed.
    Weather,
    /// Daily close from a historical-price feed.
    Market { ticker: &'static str },
    /// Daily case counts; only ever synthesized.
    Count,
}

/// Raised for an identifier outside the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown data source: {0}")]
pub struct UnknownSourceError(pub String);

impl SourceId {
    pub const ALL: [SourceId; 4] = [
        SourceId::WeatherSeoul,
        SourceId::KospiIndex,
        SourceId::BtcPrice,
        SourceId::CovidCases,
    ];

    /// Wire identifier, e.g. `weather_seoul`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::WeatherSeoul => "weather_seoul",
            SourceId::KospiIndex => "kospi_index",
            SourceId::BtcPrice => "btc_price",
            SourceId::CovidCases => "covid_cases",
        }
    }

    /// Human-readable name shown next to the chart axis.
    pub fn display_name(&self) -> &'static str {
        match self {
            SourceId::WeatherSeoul => "서울 날씨",
            SourceId::KospiIndex => "KOSPI 지수",
            SourceId::BtcPrice => "비트코인 가격",
            SourceId::CovidCases => "코로나19 확진자",
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            SourceId::WeatherSeoul => SourceKind::Weather,
            SourceId::KospiIndex => SourceKind::Market { ticker: "^KS11" },
            SourceId::BtcPrice => SourceKind::Market { ticker: "BTC-USD" },
            SourceId::CovidCases => SourceKind::Count,
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = UnknownSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownSourceError(s.to_string()))
    }
}
