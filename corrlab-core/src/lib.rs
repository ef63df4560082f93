//! CorrLab Core: daily series, providers, date alignment and Pearson correlation.
//!
//! This crate holds everything below the request layer:
//! - Domain types (data points, time series, the source catalogue)
//! - Series providers: live feeds with synthetic fallback, or fully synthetic
//! - Date alignment and the correlation coefficient
//! - Korean-language interpretation of the coefficient

pub mod correlation;
pub mod data;
pub mod domain;
pub mod interpret;
pub mod rng;

pub use correlation::{correlate, correlate_named, pearson, CorrelationResult};
pub use interpret::{Direction, Interpretation, Strength};
