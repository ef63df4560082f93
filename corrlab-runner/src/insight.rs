//! Supplementary narrative for a correlation result.
//!
//! A remote language model (any OpenAI-compatible chat-completions endpoint)
//! is asked for analysis angles that complement, rather than restate, the
//! statistical interpretation. Any remote failure falls back to a fixed
//! Korean template, so [`generate_insight`] always produces text.

use std::time::Duration;

use regex::Regex;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use corrlab_core::domain::SeriesSummary;
use corrlab_core::CorrelationResult;

use crate::config::InsightConfig;

/// Closing sentence every insight ends with.
pub const CLOSING_SENTENCE: &str = "추가 검증을 통해 해석의 견고성을 확보하는 것이 중요합니다.";

const MAX_CHARS: usize = 400;
const MAX_SENTENCES: usize = 3;
const MAX_BULLETS: usize = 3;

#[derive(Debug, Error)]
pub enum InsightError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("insight request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected insight response: {0}")]
    Format(String),

    #[error("invalid sanitizer pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Wire request. The four core fields are optional on the wire so a missing
/// one can be reported by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightRequest {
    #[serde(default)]
    pub source1: Option<String>,
    #[serde(default)]
    pub source2: Option<String>,
    #[serde(default)]
    pub r: Option<f64>,
    #[serde(default)]
    pub n: Option<usize>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub summary1: Option<SeriesSummary>,
    #[serde(default)]
    pub summary2: Option<SeriesSummary>,
}

/// Validated inputs for a generator.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightContext {
    pub source1: String,
    pub source2: String,
    pub r: f64,
    pub n: usize,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub summary1: Option<SeriesSummary>,
    pub summary2: Option<SeriesSummary>,
}

impl InsightRequest {
    /// Request describing a finished correlation over `[start, end]`.
    pub fn from_result(result: &CorrelationResult, start: &str, end: &str) -> Self {
        Self {
            source1: Some(result.series1.name.clone()),
            source2: Some(result.series2.name.clone()),
            r: Some(result.correlation),
            n: Some(result.aligned_count),
            start_date: Some(start.to_string()),
            end_date: Some(end.to_string()),
            summary1: result.series1.series.summary(),
            summary2: result.series2.series.summary(),
        }
    }

    pub fn validate(self) -> Result<InsightContext, InsightError> {
        Ok(InsightContext {
            source1: self.source1.ok_or(InsightError::MissingField("source1"))?,
            source2: self.source2.ok_or(InsightError::MissingField("source2"))?,
            r: self.r.ok_or(InsightError::MissingField("r"))?,
            n: self.n.ok_or(InsightError::MissingField("n"))?,
            start_date: self.start_date,
            end_date: self.end_date,
            summary1: self.summary1,
            summary2: self.summary2,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightOrigin {
    Remote,
    Template,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightResponse {
    pub llm_interpretation: String,
    pub origin: InsightOrigin,
}

pub trait InsightGenerator: Send + Sync {
    fn name(&self) -> &str;

    fn generate(&self, ctx: &InsightContext) -> Result<String, InsightError>;
}

// ── Prompts ──────────────────────────────────────────────────────────

pub fn system_prompt() -> &'static str {
    "역할: 통계 결과를 반복하지 말고, 보완적 인사이트만 제시하는 데이터 분석 조언자.

금지사항:
- 피어슨 상관계수(r) 수치·방향·강도의 재서술 절대 금지
- \"강한/중간/약한 상관관계\" 같은 기본 해석 반복 금지
- HTML/마크다운/코드/링크/이모지/표 금지

요구사항:
- 한국어, 사실 단정 지양. '가능성', '검토가 필요', '가설' 등의 어휘 사용
- 길이: 120~220자 한 문단 + 불릿 2~3개(각 1문장)
- 데이터 품질, 구간 분석, 교란요인, 모델링 제안 등 보완적 관점만 제시
- 마지막 불릿: \"추가 검증을 통해 해석의 견고성을 확보하는 것이 중요합니다.\"로 마무리"
}

fn summary_line(name: &str, summary: &SeriesSummary) -> String {
    format!(
        "{name} 요약: 평균 {:.2}, 표준편차 {:.2}, 범위 {:.2} ~ {:.2}\n",
        summary.mean, summary.std_dev, summary.min, summary.max
    )
}

pub fn user_prompt(ctx: &InsightContext) -> String {
    let mut prompt = format!(
        "분석 대상: {}와 {}\n표본 수: {}개, 기간: {} ~ {}\n상관계수: {:.3} (이 수치를 재서술하지 말고 참고만 하세요)\n",
        ctx.source1,
        ctx.source2,
        ctx.n,
        ctx.start_date.as_deref().unwrap_or("-"),
        ctx.end_date.as_deref().unwrap_or("-"),
        ctx.r,
    );
    if let Some(s) = &ctx.summary1 {
        prompt.push_str(&summary_line(&ctx.source1, s));
    }
    if let Some(s) = &ctx.summary2 {
        prompt.push_str(&summary_line(&ctx.source2, s));
    }
    prompt.push_str(
        "\n작성 지시:\n기존 통계 해석을 반복하지 말고, 데이터 품질·구간 분석·교란요인·모델링 관점에서 보완적 제안만 작성하세요.\n한 문단 요약 + 불릿 2~3개, '추정/가설/가능성' 톤 유지.",
    );
    prompt
}

// ── Post-processing ──────────────────────────────────────────────────

/// Remove HTML tags, fenced code, markdown links and bare URLs.
pub fn strip_unsafe(text: &str) -> Result<String, regex::Error> {
    let patterns = [
        Regex::new(r"<[^>]*>")?,
        Regex::new(r"(?s)```.*?```")?,
        Regex::new(r"\[[^\]]*\]\([^)]*\)")?,
        Regex::new(r"https?://\S+")?,
    ];
    let mut cleaned = text.to_string();
    for re in &patterns {
        cleaned = re.replace_all(&cleaned, "").into_owned();
    }
    Ok(cleaned.trim().to_string())
}

/// Keep only the first three sentences of an over-long text.
pub fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_CHARS {
        return text.to_string();
    }
    let sentences: Vec<&str> = text
        .split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(MAX_SENTENCES)
        .collect();
    format!("{}.", sentences.join(". "))
}

/// Append the closing sentence unless the text already makes that point.
pub fn ensure_closing(text: &str) -> String {
    if text.contains("추가 검증") || text.contains("견고성") {
        return text.to_string();
    }
    let mut out = text.to_string();
    if !out.ends_with('.') {
        out.push('.');
    }
    out.push(' ');
    out.push_str(CLOSING_SENTENCE);
    out
}

// ── Generators ───────────────────────────────────────────────────────

/// OpenAI-compatible chat-completions client.
pub struct RemoteInsight {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: f64,
}

impl RemoteInsight {
    pub fn from_config(config: &InsightConfig) -> Result<Self, InsightError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            temperature: config.temperature,
        })
    }
}

impl InsightGenerator for RemoteInsight {
    fn name(&self) -> &str {
        "remote"
    }

    fn generate(&self, ctx: &InsightContext) -> Result<String, InsightError> {
        let body = json!({
            "model": self.model,
            "temperature": self.temperature,
            "messages": [
                { "role": "system", "content": system_prompt() },
                { "role": "user", "content": user_prompt(ctx) },
            ],
        });

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let json: serde_json::Value = request.send()?.error_for_status()?.json()?;
        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| InsightError::Format("no choices[0].message.content".into()))?;

        let cleaned = strip_unsafe(content)?;
        if cleaned.is_empty() {
            return Err(InsightError::Format("empty completion".into()));
        }
        Ok(ensure_closing(&truncate(&cleaned)))
    }
}

/// Deterministic rule-based suggestions.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateInsight;

impl TemplateInsight {
    pub fn render(ctx: &InsightContext) -> String {
        let names = [ctx.source1.as_str(), ctx.source2.as_str()];
        let mut suggestions = Vec::with_capacity(4);

        suggestions.push(if ctx.n < 30 {
            "표본 크기가 작아 더 많은 데이터 수집이 필요할 가능성이 있습니다."
        } else if ctx.n < 100 {
            "구간별 안정성 검증을 위한 부분 샘플 분석을 고려해볼 수 있습니다."
        } else {
            "계절성이나 구간별 민감도 분석을 통한 세부 검증이 가능합니다."
        });

        if names.iter().any(|n| n.contains("날씨")) {
            suggestions.push("기상 데이터의 계절성 영향을 고려한 롤링 윈도우 분석을 검토해보세요.");
        }
        if names.iter().any(|n| n.contains("주가") || n.contains("지수")) {
            suggestions.push("금융 데이터의 변동성을 고려해 로그 변환 후 재분석이 권장됩니다.");
        }
        suggestions.push(CLOSING_SENTENCE);

        let mut out = format!(
            "{}와 {} 간의 관계 해석을 보완하기 위한 추가 분석 관점을 제안합니다.",
            ctx.source1, ctx.source2
        );
        for s in suggestions.into_iter().take(MAX_BULLETS) {
            out.push_str("\n- ");
            out.push_str(s);
        }
        out
    }
}

impl InsightGenerator for TemplateInsight {
    fn name(&self) -> &str {
        "template"
    }

    fn generate(&self, ctx: &InsightContext) -> Result<String, InsightError> {
        Ok(Self::render(ctx))
    }
}

/// Try the remote generator; fall back to the template on any failure.
pub fn generate_insight(remote: Option<&dyn InsightGenerator>, ctx: &InsightContext) -> InsightResponse {
    if let Some(generator) = remote {
        match generator.generate(ctx) {
            Ok(text) => {
                info!(generator = generator.name(), "insight generated");
                return InsightResponse {
                    llm_interpretation: text,
                    origin: InsightOrigin::Remote,
                };
            }
            Err(e) => {
                warn!(generator = generator.name(), error = %e, "insight generation failed, using template");
            }
        }
    }

    InsightResponse {
        llm_interpretation: TemplateInsight::render(ctx),
        origin: InsightOrigin::Template,
    }
}
