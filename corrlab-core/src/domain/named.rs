//! NamedSeries: a time series tagged with its source and provenance.

use super::series::TimeSeries;
use super::source::SourceId;
use serde::{Deserialize, Serialize};

/// Where a series' values came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesOrigin {
    /// Fetched from a live external feed.
    LiveFeed,
    /// Generated locally.
    Synthetic,
    /// The feed failed; the series is empty.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedSeries {
    pub source: SourceId,
    pub name: String,
    pub origin: SeriesOrigin,
    pub series: TimeSeries,
}

impl NamedSeries {
    /// Wrap a series, using the source's catalogue display name.
    pub fn new(source: SourceId, origin: SeriesOrigin, series: TimeSeries) -> Self {
        Self {
            source,
            name: source.display_name().to_string(),
            origin,
            series,
        }
    }

    /// Empty placeholder for a source whose feed is down.
    pub fn unavailable(source: SourceId) -> Self {
        Self::new(source, SeriesOrigin::Unavailable, TimeSeries::empty())
    }

    pub fn is_synthetic(&self) -> bool {
        self.origin == SeriesOrigin::Synthetic
    }
}
