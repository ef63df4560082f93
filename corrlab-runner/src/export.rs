//! Export: JSON and CSV renderings of an analysis.
//!
//! - **JSON**: the report exactly as the CLI prints it
//! - **CSV**: one row per date present in either series, suitable for a
//!   spreadsheet or plotting tool

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::analysis::{AnalysisReport, AnalysisResponse};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a report to pretty JSON.
pub fn export_json(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize AnalysisReport to JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export both series side by side.
///
/// Columns: date, <source 1 name>, <source 2 name>. Rows cover the union of
/// dates; a value missing from one series is an empty cell.
pub fn export_csv(response: &AnalysisResponse) -> Result<String> {
    let mut rows: BTreeMap<NaiveDate, (Option<f64>, Option<f64>)> = BTreeMap::new();
    for p in &response.data1 {
        rows.entry(p.date).or_default().0 = Some(p.value);
    }
    for p in &response.data2 {
        rows.entry(p.date).or_default().1 = Some(p.value);
    }

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        response.data_source1_name.as_str(),
        response.data_source2_name.as_str(),
    ])?;

    let cell = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
    for (date, (a, b)) in rows {
        wtr.write_record([date.to_string(), cell(a), cell(b)])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Write an export to disk, creating parent directories as needed.
pub fn write_export(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create export dir: {}", parent.display()))?;
    }
    std::fs::write(path, contents)
        .with_context(|| format!("failed to write export: {}", path.display()))
}
