//! Pearson correlation over date-aligned samples.
//!
//! Pure and synchronous: series in, scalar out. No I/O, no shared state.

use crate::data::align::{align, AlignedSample};
use crate::domain::{NamedSeries, TimeSeries};
use serde::{Deserialize, Serialize};

/// Outcome of correlating two named series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    /// Pearson's r, or `0.0` when fewer than two samples align or either
    /// side has zero variance over the aligned window.
    pub correlation: f64,
    /// Number of dates present in both series.
    pub aligned_count: usize,
    pub series1: NamedSeries,
    pub series2: NamedSeries,
}

/// Pearson's r from the single-pass sums formulation.
///
/// The sums are taken over offsets from the first aligned sample. Pearson is
/// shift invariant, and the offsets keep `n·Σx² − (Σx)²` from cancelling
/// away on large values with a narrow spread (cent-rounded prices). A
/// constant side produces all-zero offsets and so an exactly zero variance.
///
/// Returns `0.0` for `n < 2`, for a zero denominator, and when the sums
/// overflow. The result is not clamped, so it can stray past ±1 by rounding
/// error.
pub fn pearson(samples: &[AlignedSample]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let (x0, y0) = (samples[0].x, samples[0].y);

    let (mut sx, mut sy, mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for s in samples {
        let dx = s.x - x0;
        let dy = s.y - y0;
        sx += dx;
        sy += dy;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let n = samples.len() as f64;
    let var_x = n * sxx - sx * sx;
    let var_y = n * syy - sy * sy;
    // Rounding can push a mathematically-zero variance slightly negative.
    if var_x <= 0.0 || var_y <= 0.0 {
        return 0.0;
    }
    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 {
        return 0.0;
    }
    let r = (n * sxy - sx * sy) / denominator;
    if r.is_finite() {
        r
    } else {
        0.0
    }
}

/// Align two series by date and compute Pearson's r over the intersection.
pub fn correlate(a: &TimeSeries, b: &TimeSeries) -> f64 {
    pearson(&align(a, b))
}

/// Correlate two provider outputs, keeping both series for display.
pub fn correlate_named(series1: NamedSeries, series2: NamedSeries) -> CorrelationResult {
    let samples = align(&series1.series, &series2.series);
    CorrelationResult {
        correlation: pearson(&samples),
        aligned_count: samples.len(),
        series1,
        series2,
    }
}
