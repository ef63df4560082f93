//! Request pipeline: validate, fetch both series concurrently, correlate.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use corrlab_core::domain::{DataPoint, NamedSeries, SeriesOrigin};
use corrlab_core::{correlate_named, CorrelationResult, Interpretation};
use corrlab_core::data::SeriesProvider;

use crate::insight::InsightResponse;
use crate::request::{AnalysisError, AnalysisRequest, ErrorResponse, ValidatedRequest};

/// Successful analysis, as sent over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub correlation: f64,
    pub data1: Vec<DataPoint>,
    pub data2: Vec<DataPoint>,
    pub data_source1_name: String,
    pub data_source2_name: String,
    pub aligned_count: usize,
    pub data_source1_origin: SeriesOrigin,
    pub data_source2_origin: SeriesOrigin,
}

impl From<CorrelationResult> for AnalysisResponse {
    fn from(result: CorrelationResult) -> Self {
        let CorrelationResult {
            correlation,
            aligned_count,
            series1,
            series2,
        } = result;
        Self {
            correlation,
            data1: series1.series.into(),
            data2: series2.series.into(),
            data_source1_name: series1.name,
            data_source2_name: series2.name,
            aligned_count,
            data_source1_origin: series1.origin,
            data_source2_origin: series2.origin,
        }
    }
}

/// Response plus the human-readable extras the CLI prints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(flatten)]
    pub response: AnalysisResponse,
    pub interpretation: Interpretation,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub insight: Option<InsightResponse>,
}

impl AnalysisReport {
    pub fn new(response: AnalysisResponse) -> Self {
        let interpretation = Interpretation::new(
            response.correlation,
            &response.data_source1_name,
            &response.data_source2_name,
        );
        Self {
            response,
            interpretation,
            insight: None,
        }
    }
}

/// Runs analyses against one provider. Cheap to clone and share.
#[derive(Clone)]
pub struct Analyzer {
    provider: Arc<dyn SeriesProvider>,
    max_range_days: i64,
}

impl Analyzer {
    pub fn new(provider: Arc<dyn SeriesProvider>, max_range_days: i64) -> Self {
        Self {
            provider,
            max_range_days,
        }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Validate, fetch both series in parallel, and correlate.
    pub fn analyze(&self, request: &AnalysisRequest) -> Result<CorrelationResult, AnalysisError> {
        let validated = request.validate(self.max_range_days)?;
        self.analyze_validated(validated)
    }

    pub fn analyze_validated(&self, req: ValidatedRequest) -> Result<CorrelationResult, AnalysisError> {
        info!(
            source1 = %req.source1,
            source2 = %req.source2,
            start = %req.start,
            end = %req.end,
            provider = self.provider.name(),
            "analysis started"
        );

        let (first, second) = self.fetch_both(req)?;
        let (first, second) = (first?, second?);
        let result = correlate_named(first, second);

        info!(
            correlation = result.correlation,
            aligned = result.aligned_count,
            "analysis finished"
        );
        if result.aligned_count < 2 {
            warn!(aligned = result.aligned_count, "too few shared dates, correlation reported as 0");
        }
        Ok(result)
    }

    pub fn respond(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, AnalysisError> {
        self.analyze(request).map(AnalysisResponse::from)
    }

    /// JSON body in, `(status, JSON body)` out.
    pub fn handle_json(&self, body: &str) -> (u16, String) {
        let outcome = serde_json::from_str::<AnalysisRequest>(body)
            .map_err(|e| AnalysisError::MalformedBody(e.to_string()))
            .and_then(|req| self.respond(&req))
            .and_then(|resp| {
                serde_json::to_string(&resp).map_err(|e| AnalysisError::Internal(e.to_string()))
            });

        match outcome {
            Ok(json) => (200, json),
            Err(e) => error_body(&e),
        }
    }

    // Fetches run on the rayon pool; a panicking provider becomes an
    // internal error instead of unwinding into the caller.
    fn fetch_both(
        &self,
        req: ValidatedRequest,
    ) -> Result<
        (
            Result<NamedSeries, AnalysisError>,
            Result<NamedSeries, AnalysisError>,
        ),
        AnalysisError,
    > {
        let provider = &self.provider;
        panic::catch_unwind(AssertUnwindSafe(|| {
            rayon::join(
                || provider.fetch(req.source1, req.start, req.end).map_err(AnalysisError::from),
                || provider.fetch(req.source2, req.start, req.end).map_err(AnalysisError::from),
            )
        }))
        .map_err(|_| AnalysisError::Internal("series provider panicked".into()))
    }
}

/// Log an error and render its wire body.
pub fn error_body(e: &AnalysisError) -> (u16, String) {
    let status = e.status_code();
    if e.is_client_error() {
        warn!(status, error = %e, "request rejected");
    } else {
        error!(status, error = %e, "request failed");
    }
    let body = serde_json::to_string(&ErrorResponse::from(e))
        .unwrap_or_else(|_| r#"{"error":"internal server error"}"#.to_string());
    (status, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use corrlab_core::data::SyntheticProvider;

    fn analyzer() -> Analyzer {
        Analyzer::new(Arc::new(SyntheticProvider::default()), 365)
    }

    #[test]
    fn synthetic_analysis_covers_full_range() {
        let req = AnalysisRequest::new("weather_seoul", "covid_cases", "2024-01-01", "2024-01-31");
        let resp = analyzer().respond(&req).unwrap();
        assert_eq!(resp.data1.len(), 31);
        assert_eq!(resp.data2.len(), 31);
        assert_eq!(resp.aligned_count, 31);
        assert_eq!(resp.data_source1_name, "서울 날씨");
        assert_eq!(resp.data_source2_name, "코로나19 확진자");
        assert!(resp.correlation.abs() <= 1.0 + 1e-9);
    }

    #[test]
    fn handle_json_success_shape() {
        let body = r#"{"dataSource1":"kospi_index","dataSource2":"btc_price","startDate":"2024-01-01","endDate":"2024-01-10"}"#;
        let (status, json) = analyzer().handle_json(body);
        assert_eq!(status, 200);
        let v: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(v["correlation"].is_number());
        assert_eq!(v["data1"][0]["date"], "2024-01-01");
        assert_eq!(v["dataSource2Name"], "비트코인 가격");
        assert_eq!(v["dataSource1Origin"], "synthetic");
        assert_eq!(v["alignedCount"], 10);
    }

    #[test]
    fn handle_json_validation_error() {
        let body = r#"{"dataSource1":"kospi_index","dataSource2":"kospi_index","startDate":"2024-01-01","endDate":"2024-01-10"}"#;
        let (status, json) = analyzer().handle_json(body);
        assert_eq!(status, 400);
        let err: ErrorResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(err.error, "the two data sources must be different");
    }

    #[test]
    fn handle_json_malformed_body() {
        let (status, json) = analyzer().handle_json("{not json");
        assert_eq!(status, 400);
        assert!(json.contains("malformed request body"));
    }

    #[test]
    fn report_carries_interpretation() {
        let req = AnalysisRequest::new("weather_seoul", "kospi_index", "2024-03-01", "2024-05-31");
        let report = AnalysisReport::new(analyzer().respond(&req).unwrap());
        assert_eq!(report.interpretation.correlation, report.response.correlation);
        let v = serde_json::to_value(&report).unwrap();
        assert!(v.get("correlation").is_some());
        assert!(v.get("interpretation").is_some());
        assert!(v.get("insight").is_none());
    }
}
