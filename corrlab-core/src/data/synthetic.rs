//! Synthetic series generators.
//!
//! Stand-ins for feeds that are unavailable or unconfigured. Each generator
//! emits exactly one point per calendar day in the inclusive range, seeded
//! through [`SeedHierarchy`] so a request is reproducible.

use super::round2;
use crate::domain::{DataPoint, SourceId, SourceKind, TimeSeries};
use crate::rng::SeedHierarchy;
use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::Rng;
use std::f64::consts::PI;

const BASE_TEMPERATURE: f64 = 15.0;
const SEASONAL_AMPLITUDE: f64 = 10.0;
const TEMPERATURE_NOISE: f64 = 3.0;
const COUNT_SCALE: f64 = 100.0;
const COUNT_NOISE: f64 = 100.0;

/// Noise-free seasonal temperature curve.
///
/// Uses `month * 30 + day` as a cheap day-of-year approximation.
pub fn seasonal_temperature(date: NaiveDate) -> f64 {
    let day_of_year_approx = (date.month() * 30 + date.day()) as f64;
    BASE_TEMPERATURE + SEASONAL_AMPLITUDE * (2.0 * PI * day_of_year_approx / 365.0).sin()
}

/// Random-walk parameters for a market source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkParams {
    pub start_price: f64,
    pub floor: f64,
    /// Mean daily return.
    pub drift: f64,
    /// Standard deviation of the daily return.
    pub volatility: f64,
}

impl WalkParams {
    pub fn for_source(source: SourceId) -> Option<Self> {
        match source {
            SourceId::KospiIndex => Some(Self {
                start_price: 2500.0,
                floor: 1000.0,
                drift: 0.001,
                volatility: 0.02,
            }),
            SourceId::BtcPrice => Some(Self {
                start_price: 45_000.0,
                floor: 10_000.0,
                drift: 0.002,
                volatility: 0.05,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticGenerator {
    seeds: SeedHierarchy,
}

impl SyntheticGenerator {
    pub fn new(seeds: SeedHierarchy) -> Self {
        Self { seeds }
    }

    /// Synthesize whatever shape suits the source's kind.
    pub fn series_for(&self, source: SourceId, start: NaiveDate, end: NaiveDate) -> TimeSeries {
        match source.kind() {
            SourceKind::Weather => self.weather(source, start, end),
            SourceKind::Count => self.counts(source, start, end),
            SourceKind::Market { .. } => self.random_walk(source, start, end),
        }
    }

    /// Seasonal temperature plus uniform noise in `[-3, 3]`.
    pub fn weather(&self, source: SourceId, start: NaiveDate, end: NaiveDate) -> TimeSeries {
        let mut rng = self.seeds.rng_for(source, start);
        TimeSeries::canonicalize(days(start, end).map(|date| {
            DataPoint::new(date, round2(noisy_temperature(&mut rng, date)))
        }))
    }

    /// Integer-valued counts shaped like the temperature curve, floored at zero.
    pub fn counts(&self, source: SourceId, start: NaiveDate, end: NaiveDate) -> TimeSeries {
        let mut rng = self.seeds.rng_for(source, start);
        TimeSeries::canonicalize(days(start, end).map(|date| {
            let shape = noisy_temperature(&mut rng, date);
            let extra: f64 = rng.gen_range(0.0..COUNT_NOISE);
            DataPoint::new(date, (shape * COUNT_SCALE + extra).round().max(0.0))
        }))
    }

    /// Floored multiplicative random walk. Non-market sources fall back to
    /// the temperature generator.
    pub fn random_walk(&self, source: SourceId, start: NaiveDate, end: NaiveDate) -> TimeSeries {
        let Some(params) = WalkParams::for_source(source) else {
            return self.weather(source, start, end);
        };
        let mut rng = self.seeds.rng_for(source, start);
        // Uniform on [-a, a] has standard deviation a / sqrt(3).
        let spread = params.volatility * 3.0_f64.sqrt();
        let mut price = params.start_price;

        TimeSeries::canonicalize(days(start, end).map(|date| {
            let daily_return = params.drift + rng.gen_range(-spread..=spread);
            price = (price * (1.0 + daily_return)).max(params.floor);
            DataPoint::new(date, round2(price))
        }))
    }
}

fn noisy_temperature(rng: &mut StdRng, date: NaiveDate) -> f64 {
    seasonal_temperature(date) + rng.gen_range(-TEMPERATURE_NOISE..=TEMPERATURE_NOISE)
}

fn days(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn generator() -> SyntheticGenerator {
        SyntheticGenerator::new(SeedHierarchy::new(42))
    }

    #[test]
    fn one_point_per_day_inclusive() {
        let s = generator().weather(SourceId::WeatherSeoul, date(2024, 1, 1), date(2024, 1, 31));
        assert_eq!(s.len(), 31);
        assert_eq!(s.first_date(), Some(date(2024, 1, 1)));
        assert_eq!(s.last_date(), Some(date(2024, 1, 31)));
    }

    #[test]
    fn single_day_range() {
        let day = date(2024, 6, 15);
        let s = generator().counts(SourceId::CovidCases, day, day);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn inverted_range_is_empty() {
        let s = generator().weather(SourceId::WeatherSeoul, date(2024, 2, 1), date(2024, 1, 1));
        assert!(s.is_empty());
    }

    #[test]
    fn weather_noise_is_bounded() {
        let s = generator().weather(SourceId::WeatherSeoul, date(2023, 1, 1), date(2023, 12, 31));
        assert_eq!(s.len(), 365);
        for p in s.points() {
            let deviation = p.value - seasonal_temperature(p.date);
            // Rounding to cents can add at most half a cent.
            assert!(deviation.abs() <= 3.0 + 0.005, "{} deviates by {deviation}", p.date);
        }
    }

    #[test]
    fn counts_are_non_negative_integers() {
        let s = generator().counts(SourceId::CovidCases, date(2024, 1, 1), date(2024, 3, 31));
        assert_eq!(s.len(), 91);
        for p in s.points() {
            assert!(p.value >= 0.0);
            assert_eq!(p.value, p.value.round());
        }
    }

    #[test]
    fn random_walk_respects_floor() {
        let s = generator().random_walk(SourceId::KospiIndex, date(2020, 1, 1), date(2024, 12, 31));
        assert!(s.values().all(|v| v >= 1000.0));
        let btc = generator().random_walk(SourceId::BtcPrice, date(2020, 1, 1), date(2024, 12, 31));
        assert!(btc.values().all(|v| v >= 10_000.0));
    }

    #[test]
    fn random_walk_values_are_cent_rounded() {
        let s = generator().random_walk(SourceId::BtcPrice, date(2024, 1, 1), date(2024, 1, 10));
        for v in s.values() {
            assert!(((v * 100.0).round() - v * 100.0).abs() < 1e-6);
        }
    }

    #[test]
    fn same_seed_same_series() {
        let a = generator().series_for(SourceId::CovidCases, date(2024, 1, 1), date(2024, 2, 1));
        let b = generator().series_for(SourceId::CovidCases, date(2024, 1, 1), date(2024, 2, 1));
        assert_eq!(a, b);
    }

    #[test]
    fn different_sources_get_different_noise() {
        let g = generator();
        let a = g.weather(SourceId::WeatherSeoul, date(2024, 1, 1), date(2024, 1, 10));
        let b = g.weather(SourceId::CovidCases, date(2024, 1, 1), date(2024, 1, 10));
        assert_ne!(a, b);
    }

    #[test]
    fn seasonal_curve_uses_month_day_approximation() {
        // March 1st -> 3 * 30 + 1 = 91, not the true day-of-year 61.
        let expected = 15.0 + 10.0 * (2.0 * PI * 91.0 / 365.0).sin();
        assert!((seasonal_temperature(date(2024, 3, 1)) - expected).abs() < 1e-12);
    }
}
