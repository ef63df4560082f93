//! Two-series date alignment.
//!
//! Pairs up the values two series recorded on the same calendar day. Only
//! the intersection of date keys survives; a date present in one series
//! alone contributes nothing (and is never zero-filled).

use crate::domain::TimeSeries;
use chrono::NaiveDate;
use std::collections::HashMap;

/// One `(x, y)` pair drawn from two series sharing a date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedSample {
    pub date: NaiveDate,
    pub x: f64,
    pub y: f64,
}

/// Align `a` against `b` by date.
///
/// Samples come out in `a`'s order, which for a [`TimeSeries`] is ascending
/// by date. `x` is always taken from `a` and `y` from `b`.
pub fn align(a: &TimeSeries, b: &TimeSeries) -> Vec<AlignedSample> {
    // Last write wins if a feed ever slipped a duplicate past canonicalization.
    let mut lookup: HashMap<NaiveDate, f64> = HashMap::with_capacity(b.len());
    for point in b.points() {
        lookup.insert(point.date, point.value);
    }

    a.points()
        .iter()
        .filter_map(|p| {
            lookup.get(&p.date).map(|&y| AlignedSample {
                date: p.date,
                x: p.value,
                y,
            })
        })
        .collect()
}
