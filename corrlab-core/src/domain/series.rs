//! TimeSeries: the fundamental unit every provider produces and the correlator consumes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// One daily observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl DataPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Errors raised by the strict [`TimeSeries::new`] constructor.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("non-finite value {value} on {date}")]
    NonFiniteValue { date: NaiveDate, value: f64 },

    #[error("duplicate entry for {date}")]
    DuplicateDate { date: NaiveDate },
}

/// Daily series with unique dates, stored in ascending date order.
///
/// Every stored value is finite. A day the source could not measure is
/// simply absent; there are no sentinel values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DataPoint>", into = "Vec<DataPoint>")]
pub struct TimeSeries {
    points: Vec<DataPoint>,
}

impl TimeSeries {
    /// Build a series, rejecting non-finite values and duplicate dates.
    ///
    /// Input order does not matter; the result is sorted ascending.
    pub fn new(mut points: Vec<DataPoint>) -> Result<Self, SeriesError> {
        if let Some(bad) = points.iter().find(|p| !p.value.is_finite()) {
            return Err(SeriesError::NonFiniteValue {
                date: bad.date,
                value: bad.value,
            });
        }
        points.sort_by_key(|p| p.date);
        if let Some(dup) = points.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(SeriesError::DuplicateDate { date: dup[0].date });
        }
        Ok(Self { points })
    }

    /// Build a series from untrusted feed records.
    ///
    /// Non-finite values are dropped, duplicate dates keep the last record
    /// seen, and the result is sorted ascending.
    pub fn canonicalize(points: impl IntoIterator<Item = DataPoint>) -> Self {
        let by_date: BTreeMap<NaiveDate, f64> = points
            .into_iter()
            .filter(|p| p.value.is_finite())
            .map(|p| (p.date, p.value))
            .collect();
        Self {
            points: by_date
                .into_iter()
                .map(|(date, value)| DataPoint { date, value })
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    /// Descriptive statistics, or `None` for an empty series.
    pub fn summary(&self) -> Option<SeriesSummary> {
        if self.points.is_empty() {
            return None;
        }
        let count = self.points.len();
        let n = count as f64;
        let mean = self.values().sum::<f64>() / n;
        let min = self.values().fold(f64::INFINITY, f64::min);
        let max = self.values().fold(f64::NEG_INFINITY, f64::max);
        let variance = self.values().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(SeriesSummary {
            count,
            mean,
            min,
            max,
            std_dev: variance.sqrt(),
        })
    }
}

impl TryFrom<Vec<DataPoint>> for TimeSeries {
    type Error = SeriesError;

    fn try_from(points: Vec<DataPoint>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<TimeSeries> for Vec<DataPoint> {
    fn from(series: TimeSeries) -> Self {
        series.points
    }
}

/// Summary statistics handed to the narrative service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSummary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn new_sorts_ascending() {
        let series = TimeSeries::new(vec![
            DataPoint::new(d("2024-01-03"), 3.0),
            DataPoint::new(d("2024-01-01"), 1.0),
            DataPoint::new(d("2024-01-02"), 2.0),
        ])
        .unwrap();

        let dates: Vec<_> = series.points().iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d("2024-01-01"), d("2024-01-02"), d("2024-01-03")]);
        assert_eq!(series.first_date(), Some(d("2024-01-01")));
        assert_eq!(series.last_date(), Some(d("2024-01-03")));
    }

    #[test]
    fn new_rejects_nan() {
        let err = TimeSeries::new(vec![DataPoint::new(d("2024-01-01"), f64::NAN)]).unwrap_err();
        assert!(matches!(err, SeriesError::NonFiniteValue { .. }));
    }

    #[test]
    fn new_rejects_infinity() {
        let err =
            TimeSeries::new(vec![DataPoint::new(d("2024-01-01"), f64::INFINITY)]).unwrap_err();
        assert!(matches!(err, SeriesError::NonFiniteValue { .. }));
    }

    #[test]
    fn new_rejects_duplicate_dates() {
        let err = TimeSeries::new(vec![
            DataPoint::new(d("2024-01-02"), 1.0),
            DataPoint::new(d("2024-01-01"), 2.0),
            DataPoint::new(d("2024-01-02"), 3.0),
        ])
        .unwrap_err();
        assert_eq!(err, SeriesError::DuplicateDate { date: d("2024-01-02") });
    }

    #[test]
    fn canonicalize_drops_non_finite_and_keeps_last_duplicate() {
        let series = TimeSeries::canonicalize(vec![
            DataPoint::new(d("2024-01-02"), 1.0),
            DataPoint::new(d("2024-01-01"), f64::NAN),
            DataPoint::new(d("2024-01-02"), 5.0),
            DataPoint::new(d("2024-01-03"), 7.0),
        ]);

        assert_eq!(series.len(), 2);
        assert_eq!(series.points()[0], DataPoint::new(d("2024-01-02"), 5.0));
        assert_eq!(series.points()[1], DataPoint::new(d("2024-01-03"), 7.0));
    }

    #[test]
    fn summary_of_empty_is_none() {
        assert!(TimeSeries::empty().summary().is_none());
    }

    #[test]
    fn summary_statistics() {
        let series = TimeSeries::new(vec![
            DataPoint::new(d("2024-01-01"), 2.0),
            DataPoint::new(d("2024-01-02"), 4.0),
            DataPoint::new(d("2024-01-03"), 4.0),
            DataPoint::new(d("2024-01-04"), 4.0),
            DataPoint::new(d("2024-01-05"), 5.0),
            DataPoint::new(d("2024-01-06"), 5.0),
            DataPoint::new(d("2024-01-07"), 7.0),
            DataPoint::new(d("2024-01-08"), 9.0),
        ])
        .unwrap();

        let s = series.summary().unwrap();
        assert_eq!(s.count, 8);
        assert!((s.mean - 5.0).abs() < 1e-12);
        assert_eq!(s.min, 2.0);
        assert_eq!(s.max, 9.0);
        assert!((s.std_dev - 2.0).abs() < 1e-12);
    }

    #[test]
    fn serializes_as_plain_point_array() {
        let series = TimeSeries::new(vec![DataPoint::new(d("2024-03-01"), 12.5)]).unwrap();
        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(json, r#"[{"date":"2024-03-01","value":12.5}]"#);
    }

    #[test]
    fn deserialization_validates() {
        let dup = r#"[{"date":"2024-03-01","value":1.0},{"date":"2024-03-01","value":2.0}]"#;
        assert!(serde_json::from_str::<TimeSeries>(dup).is_err());

        let ok = r#"[{"date":"2024-03-02","value":2.0},{"date":"2024-03-01","value":1.0}]"#;
        let series: TimeSeries = serde_json::from_str(ok).unwrap();
        assert_eq!(series.first_date(), Some(d("2024-03-01")));
    }
}
