//! Domain types for CorrLab

pub mod named;
pub mod series;
pub mod source;

pub use named::{NamedSeries, SeriesOrigin};
pub use series::{DataPoint, SeriesError, SeriesSummary, TimeSeries};
pub use source::{SourceId, SourceKind, UnknownSourceError};
