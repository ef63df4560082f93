//! Analysis request parsing and validation.
//!
//! Validation runs entirely before any provider is called, in a fixed order:
//! missing field, same source, unknown source, bad date, inverted range,
//! range too long.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use corrlab_core::data::ProviderError;
use corrlab_core::domain::{SourceId, UnknownSourceError};

/// Wire request. Every field may be absent in the incoming document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub data_source1: Option<String>,
    #[serde(default)]
    pub data_source2: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// A request that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub source1: SourceId,
    pub source2: SourceId,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("the two data sources must be different")]
    SameSource,

    #[error(transparent)]
    UnknownSource(#[from] UnknownSourceError),

    #[error("invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("date range of {days} days exceeds the {max_days}-day limit")]
    RangeTooLong { days: i64, max_days: i64 },

    #[error("malformed request body: {0}")]
    MalformedBody(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AnalysisError {
    /// HTTP-style status for the wire response.
    pub fn status_code(&self) -> u16 {
        match self {
            AnalysisError::Internal(_) => 500,
            _ => 400,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

impl From<ProviderError> for AnalysisError {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::UnknownSource(e) => AnalysisError::UnknownSource(e),
            ProviderError::InvalidRange { start, end } => AnalysisError::InvalidRange { start, end },
        }
    }
}

/// `{ "error": "..." }` body for a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&AnalysisError> for ErrorResponse {
    fn from(e: &AnalysisError) -> Self {
        // Unexpected errors carry no detail over the wire; the caller logs it.
        let error = match e {
            AnalysisError::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        };
        Self { error }
    }
}

fn required<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, AnalysisError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(AnalysisError::MissingField(field))
}

fn parse_date(value: &str) -> Result<NaiveDate, AnalysisError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| AnalysisError::InvalidDate {
        value: value.to_string(),
    })
}

impl AnalysisRequest {
    pub fn new(source1: &str, source2: &str, start: &str, end: &str) -> Self {
        Self {
            data_source1: Some(source1.to_string()),
            data_source2: Some(source2.to_string()),
            start_date: Some(start.to_string()),
            end_date: Some(end.to_string()),
        }
    }

    pub fn validate(&self, max_range_days: i64) -> Result<ValidatedRequest, AnalysisError> {
        let source1 = required(&self.data_source1, "dataSource1")?;
        let source2 = required(&self.data_source2, "dataSource2")?;
        let start = required(&self.start_date, "startDate")?;
        let end = required(&self.end_date, "endDate")?;

        if source1 == source2 {
            return Err(AnalysisError::SameSource);
        }

        let source1: SourceId = source1.parse()?;
        let source2: SourceId = source2.parse()?;

        let start = parse_date(start)?;
        let end = parse_date(end)?;
        if start > end {
            return Err(AnalysisError::InvalidRange { start, end });
        }

        let days = (end - start).num_days();
        if days > max_range_days {
            return Err(AnalysisError::RangeTooLong {
                days,
                max_days: max_range_days,
            });
        }

        Ok(ValidatedRequest {
            source1,
            source2,
            start,
            end,
        })
    }
}
