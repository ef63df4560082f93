//! Yahoo Finance historical-price feed.
//!
//! Reads daily closes from the v8 chart API. Yahoo has no official API and
//! may change its format without notice; callers treat any failure here as
//! an outage.

use super::http::FeedClient;
use super::provider::{FeedError, PriceFeed};
use super::round2;
use crate::domain::DataPoint;
use chrono::{DateTime, Days, NaiveDate, NaiveTime};
use reqwest::Url;
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    close: Vec<Option<f64>>,
}

pub struct YahooFeed {
    http: FeedClient,
    base_url: String,
}

impl YahooFeed {
    pub fn new(http: FeedClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn chart_url(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Url, FeedError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| FeedError::InvalidEndpoint(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| FeedError::InvalidEndpoint(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", ticker]);

        let period1 = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        // period2 is exclusive on Yahoo's side; ask for the whole end day.
        let period2 = end
            .checked_add_days(Days::new(1))
            .unwrap_or(end)
            .and_time(NaiveTime::MIN)
            .and_utc()
            .timestamp();
        url.query_pairs_mut()
            .append_pair("period1", &period1.to_string())
            .append_pair("period2", &period2.to_string())
            .append_pair("interval", "1d");
        Ok(url)
    }
}

/// Turn a chart response into cent-rounded daily closes within `[start, end]`.
fn parse_response(
    ticker: &str,
    resp: ChartResponse,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DataPoint>, FeedError> {
    let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
        Some(err) if err.code == "Not Found" => FeedError::SymbolNotFound {
            symbol: ticker.to_string(),
        },
        Some(err) => FeedError::ResponseFormatChanged(format!("{}: {}", err.code, err.description)),
        None => FeedError::ResponseFormatChanged("empty result with no error".into()),
    })?;

    let data = result
        .into_iter()
        .next()
        .ok_or_else(|| FeedError::ResponseFormatChanged("result array is empty".into()))?;

    // No timestamps means no trading days in range.
    let Some(timestamps) = data.timestamp else {
        return Ok(Vec::new());
    };
    let offset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);

    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| FeedError::ResponseFormatChanged("no quote data".into()))?;

    let mut points = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = DateTime::from_timestamp(ts + offset, 0)
            .map(|dt| dt.naive_utc().date())
            .ok_or_else(|| FeedError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))?;

        // Holidays and half-formed rows come through with a null close.
        let Some(close) = quote.close.get(i).copied().flatten() else {
            continue;
        };
        if date < start || date > end || !close.is_finite() {
            continue;
        }
        points.push(DataPoint::new(date, round2(close)));
    }

    Ok(points)
}

impl PriceFeed for YahooFeed {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn daily_closes(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DataPoint>, FeedError> {
        let url = self.chart_url(ticker, start, end)?;
        let chart: ChartResponse = self.http.get_json(&url)?;
        parse_response(ticker, chart, start, end)
    }
}
