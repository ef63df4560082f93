//! CorrLab Runner: request handling on top of `corrlab-core`.
//!
//! This crate provides:
//! - TOML configuration and provider construction
//! - Request validation with client/server error classification
//! - The analysis pipeline (concurrent fetch, correlate, interpret)
//! - The supplementary narrative service with template fallback
//! - JSON and CSV export

pub mod analysis;
pub mod config;
pub mod export;
pub mod insight;
pub mod providers;
pub mod request;

pub use analysis::{error_body, AnalysisReport, AnalysisResponse, Analyzer};
pub use config::{ConfigError, CorrlabConfig, ProviderStrategy};
pub use insight::{
    generate_insight, InsightContext, InsightError, InsightGenerator, InsightOrigin,
    InsightRequest, InsightResponse, RemoteInsight, TemplateInsight,
};
pub use providers::build_provider;
pub use request::{AnalysisError, AnalysisRequest, ErrorResponse, ValidatedRequest};
