//! Korea Meteorological Administration ASOS daily-observation feed.
//!
//! Reads the daily mean temperature (`avgTa`) for a single station. The feed
//! needs a service key; without one the weather source is synthesized.

use super::http::FeedClient;
use super::provider::{FeedError, WeatherFeed};
use crate::domain::DataPoint;
use chrono::NaiveDate;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

pub const DEFAULT_BASE_URL: &str =
    "https://apis.data.go.kr/1360000/AsosDalyInfoService/getWthrDataList";

/// Seoul.
pub const DEFAULT_STATION: &str = "108";

/// Result code the feed uses for "no observations in range".
const NO_DATA: &str = "03";

#[derive(Debug, Deserialize)]
struct AsosEnvelope {
    response: AsosResponse,
}

#[derive(Debug, Deserialize)]
struct AsosResponse {
    header: AsosHeader,
    body: Option<AsosBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AsosHeader {
    result_code: String,
    result_msg: String,
}

#[derive(Debug, Deserialize)]
struct AsosBody {
    items: Option<AsosItems>,
}

// An empty page comes back as `"items": ""` rather than an empty list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AsosItems {
    List { item: Vec<AsosItem> },
    Blank(serde::de::IgnoredAny),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AsosItem {
    tm: String,
    avg_ta: Option<Value>,
}

pub struct KmaWeatherFeed {
    http: FeedClient,
    base_url: String,
    api_key: String,
    station: String,
}

impl KmaWeatherFeed {
    pub fn new(
        http: FeedClient,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        station: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            station: station.into(),
        }
    }

    fn request_url(&self, start: NaiveDate, end: NaiveDate) -> Result<Url, FeedError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| FeedError::InvalidEndpoint(format!("{}: {e}", self.base_url)))?;
        let rows = (end - start).num_days().max(0) + 1;
        url.query_pairs_mut()
            .append_pair("serviceKey", &self.api_key)
            .append_pair("pageNo", "1")
            .append_pair("numOfRows", &rows.to_string())
            .append_pair("dataType", "JSON")
            .append_pair("dataCd", "ASOS")
            .append_pair("dateCd", "DAY")
            .append_pair("startDt", &start.format("%Y%m%d").to_string())
            .append_pair("endDt", &end.format("%Y%m%d").to_string())
            .append_pair("stnIds", &self.station);
        Ok(url)
    }
}

/// Readings arrive as strings (`"-1.2"`, `""`) or occasionally as numbers.
fn parse_reading(raw: Option<&Value>) -> Option<f64> {
    let value = match raw? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

fn parse_response(envelope: AsosEnvelope) -> Result<Vec<DataPoint>, FeedError> {
    let header = envelope.response.header;
    if header.result_code == NO_DATA {
        return Ok(Vec::new());
    }
    if header.result_code != "00" {
        return Err(FeedError::Rejected {
            code: header.result_code,
            message: header.result_msg,
        });
    }

    let items = match envelope.response.body.and_then(|b| b.items) {
        Some(AsosItems::List { item }) => item,
        Some(AsosItems::Blank(_)) | None => return Ok(Vec::new()),
    };

    let mut points = Vec::with_capacity(items.len());
    for item in items {
        let date = NaiveDate::parse_from_str(item.tm.trim(), "%Y-%m-%d")
            .map_err(|e| FeedError::ResponseFormatChanged(format!("bad date '{}': {e}", item.tm)))?;
        if let Some(value) = parse_reading(item.avg_ta.as_ref()) {
            points.push(DataPoint::new(date, value));
        }
    }
    Ok(points)
}

impl WeatherFeed for KmaWeatherFeed {
    fn name(&self) -> &str {
        "kma_asos"
    }

    fn daily_mean_temperature(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DataPoint>, FeedError> {
        let url = self.request_url(start, end)?;
        let envelope: AsosEnvelope = self.http.get_json(&url)?;
        parse_response(envelope)
    }
}
