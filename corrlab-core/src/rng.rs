//! Deterministic seeds for synthetic series.
//!
//! A master seed is expanded into a per-`(source, start date)` sub-seed via
//! BLAKE3, so the same request always synthesizes the same series no matter
//! which of the two concurrent fetches runs first.

use crate::domain::SourceId;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedHierarchy {
    master_seed: u64,
}

impl SeedHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive the sub-seed for one synthetic series.
    pub fn sub_seed(&self, source: SourceId, start: NaiveDate) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(source.as_str().as_bytes());
        hasher.update(start.to_string().as_bytes());
        *hasher.finalize().as_bytes()
    }

    pub fn rng_for(&self, source: SourceId, start: NaiveDate) -> StdRng {
        StdRng::from_seed(self.sub_seed(source, start))
    }
}

impl Default for SeedHierarchy {
    fn default() -> Self {
        Self::new(42)
    }
}
