//! CorrLab CLI: correlate two daily series from the command line.
//!
//! Commands:
//! - `analyze`: validate a request, fetch both series, print the report JSON
//! - `insight`: produce the supplementary narrative for a finished analysis
//! - `sources`: list the selectable data sources
//!
//! Stdout carries only JSON; logs go to stderr (`RUST_LOG` overrides the
//! default filter). Client errors exit with 2, unexpected errors with 1.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use corrlab_core::domain::SourceId;
use corrlab_runner::export::{export_csv, export_json, write_export};
use corrlab_runner::{
    build_provider, error_body, generate_insight, AnalysisError, AnalysisReport,
    AnalysisRequest, AnalysisResponse, Analyzer, CorrlabConfig, ErrorResponse, InsightError,
    InsightGenerator, InsightRequest, ProviderStrategy, RemoteInsight,
};

const DEFAULT_LOG_FILTER: &str = "corrlab=info,corrlab_core=info,corrlab_runner=info";

#[derive(Parser)]
#[command(
    name = "corrlab",
    about = "CorrLab CLI: correlation between two daily time series"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Correlate two data sources over a date range.
    Analyze {
        /// First data source id (see `corrlab sources`).
        #[arg(long)]
        source1: Option<String>,

        /// Second data source id.
        #[arg(long)]
        source2: Option<String>,

        /// Start date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD), inclusive.
        #[arg(long)]
        end: Option<String>,

        /// JSON request file; flags override its fields.
        #[arg(long)]
        request: Option<PathBuf>,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Never touch the network.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Attach the supplementary narrative.
        #[arg(long, default_value_t = false)]
        insight: bool,

        /// Also write both series as CSV to this path.
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Pretty-print the JSON output.
        #[arg(long, default_value_t = false)]
        pretty: bool,

        /// Weather feed service key.
        #[arg(long, env = "CORRLAB_WEATHER_API_KEY", hide_env_values = true)]
        weather_api_key: Option<String>,

        /// Narrative endpoint API key.
        #[arg(long, env = "CORRLAB_INSIGHT_API_KEY", hide_env_values = true)]
        insight_api_key: Option<String>,
    },
    /// Generate the supplementary narrative from a JSON insight request.
    Insight {
        /// JSON file with source1, source2, r and n.
        #[arg(long)]
        request: PathBuf,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Narrative endpoint API key.
        #[arg(long, env = "CORRLAB_INSIGHT_API_KEY", hide_env_values = true)]
        insight_api_key: Option<String>,
    },
    /// List the selectable data sources.
    Sources,
}

fn main() -> ExitCode {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match run(cli.command) {
        Ok(code) => code,
        Err(e) => fail(&unexpected(&e)),
    }
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Analyze {
            source1,
            source2,
            start,
            end,
            request,
            config,
            synthetic,
            insight,
            csv,
            pretty,
            weather_api_key,
            insight_api_key,
        } => {
            let mut config = load_config(config.as_deref())?;
            if synthetic {
                config.providers.strategy = ProviderStrategy::Synthetic;
            }
            if weather_api_key.is_some() {
                config.providers.weather.api_key = weather_api_key;
            }
            if insight_api_key.is_some() {
                config.insight.api_key = insight_api_key;
            }

            let mut req = match request {
                Some(path) => match read_request(&path)? {
                    Ok(req) => req,
                    Err(e) => return Ok(fail(&e)),
                },
                None => AnalysisRequest::default(),
            };
            req.data_source1 = source1.or(req.data_source1);
            req.data_source2 = source2.or(req.data_source2);
            req.start_date = start.or(req.start_date);
            req.end_date = end.or(req.end_date);

            cmd_analyze(&config, &req, insight, csv.as_deref(), pretty)
        }
        Commands::Insight {
            request,
            config,
            insight_api_key,
        } => {
            let mut config = load_config(config.as_deref())?;
            if insight_api_key.is_some() {
                config.insight.api_key = insight_api_key;
            }
            cmd_insight(&config, &request)
        }
        Commands::Sources => cmd_sources(),
    }
}

fn load_config(path: Option<&Path>) -> Result<CorrlabConfig> {
    match path {
        Some(path) => CorrlabConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(CorrlabConfig::default()),
    }
}

/// Outer error: the file could not be read. Inner error: bad request JSON.
fn read_request(path: &Path) -> Result<Result<AnalysisRequest, AnalysisError>> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read request {}", path.display()))?;
    Ok(serde_json::from_str(&body).map_err(|e| AnalysisError::MalformedBody(e.to_string())))
}

/// Any failure outside request handling. Its detail is logged, never printed.
fn unexpected(e: &anyhow::Error) -> AnalysisError {
    AnalysisError::Internal(format!("{e:#}"))
}

/// Exit code and wire error body for a failed command.
fn failure(e: &AnalysisError) -> (u8, String) {
    let (status, body) = error_body(e);
    let code = if status < 500 { 2 } else { 1 };
    (code, body)
}

fn fail(e: &AnalysisError) -> ExitCode {
    let (code, body) = failure(e);
    println!("{body}");
    ExitCode::from(code)
}

fn insight_rejection(e: &InsightError) -> Result<String> {
    let response = ErrorResponse {
        error: e.to_string(),
    };
    serde_json::to_string(&response).context("failed to serialize error")
}

fn remote_generator(config: &CorrlabConfig) -> Option<RemoteInsight> {
    if !config.insight.enabled {
        return None;
    }
    match RemoteInsight::from_config(&config.insight) {
        Ok(remote) => Some(remote),
        Err(e) => {
            warn!(error = %e, "narrative client unavailable, using template");
            None
        }
    }
}

fn cmd_analyze(
    config: &CorrlabConfig,
    req: &AnalysisRequest,
    with_insight: bool,
    csv: Option<&Path>,
    pretty: bool,
) -> Result<ExitCode> {
    let provider = build_provider(config).context("failed to build series provider")?;
    let analyzer = Analyzer::new(provider, config.validation.max_range_days);

    let result = match analyzer.analyze(req) {
        Ok(result) => result,
        Err(e) => return Ok(fail(&e)),
    };

    let insight = with_insight.then(|| {
        let ctx = InsightRequest::from_result(
            &result,
            req.start_date.as_deref().unwrap_or_default(),
            req.end_date.as_deref().unwrap_or_default(),
        )
        .validate();
        let remote = remote_generator(config);
        ctx.map(|ctx| generate_insight(remote.as_ref().map(|r| r as &dyn InsightGenerator), &ctx))
    });

    let mut report = AnalysisReport::new(AnalysisResponse::from(result));
    if let Some(insight) = insight {
        report.insight = Some(insight.context("failed to build insight request")?);
    }

    if let Some(path) = csv {
        write_export(path, &export_csv(&report.response)?)?;
    }

    let json = if pretty {
        export_json(&report)?
    } else {
        serde_json::to_string(&report).context("failed to serialize report")?
    };
    println!("{json}");
    Ok(ExitCode::SUCCESS)
}

fn cmd_insight(config: &CorrlabConfig, path: &Path) -> Result<ExitCode> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read insight request {}", path.display()))?;

    let ctx = match serde_json::from_str::<InsightRequest>(&body) {
        Ok(req) => req.validate(),
        Err(e) => return Ok(fail(&AnalysisError::MalformedBody(e.to_string()))),
    };
    let ctx = match ctx {
        Ok(ctx) => ctx,
        Err(e) => {
            warn!(error = %e, "insight request rejected");
            println!("{}", insight_rejection(&e)?);
            return Ok(ExitCode::from(2));
        }
    };

    let remote = remote_generator(config);
    let response = generate_insight(remote.as_ref().map(|r| r as &dyn InsightGenerator), &ctx);
    println!(
        "{}",
        serde_json::to_string(&response).context("failed to serialize insight")?
    );
    Ok(ExitCode::SUCCESS)
}

fn cmd_sources() -> Result<ExitCode> {
    let sources: Vec<_> = SourceId::ALL
        .iter()
        .map(|s| serde_json::json!({ "id": s.as_str(), "name": s.display_name() }))
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&sources).context("failed to serialize sources")?
    );
    Ok(ExitCode::SUCCESS)
}
