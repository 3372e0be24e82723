//! Value sort.

use famafrench_primitives::{Bucket, BucketAssignment, Date, Symbol};
use famafrench_traits::BucketSorter;
use serde::Deserialize;

use crate::{
    SortError,
    rank::{ranked, tail_len},
};

/// Configuration for the value sort.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ValueConfig {
    /// Share of the ranked population in each of Value and Growth.
    pub fraction: f64,
    /// Minimum number of values on a date (after the positivity filter).
    pub min_population: usize,
    /// Drop non-positive price-to-book values before ranking.
    pub positive_only: bool,
}

impl Default for ValueConfig {
    fn default() -> Self {
        Self { fraction: 0.3, min_population: 100, positive_only: false }
    }
}

/// Three-way split by price-to-book into `Value`, `Neutral` and `Growth`.
///
/// Securities are ranked ascending by price-to-book, so Value holds the
/// cheapest `k = floor(fraction * N)` and Growth the most expensive `k`.
/// Neutral holds every security whose value lies strictly between the last
/// Value value and the first Growth value; securities tied with either
/// boundary are in no group.
#[derive(Debug, Clone)]
pub struct ValueSort {
    config: ValueConfig,
}

impl ValueSort {
    const BUCKETS: [Bucket; 3] = [Bucket::Value, Bucket::Neutral, Bucket::Growth];

    /// Create a new value sort with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self { config: ValueConfig::default() }
    }

    /// Value sort that ignores non-positive price-to-book.
    #[must_use]
    pub fn positive_only() -> Self {
        Self { config: ValueConfig { positive_only: true, ..ValueConfig::default() } }
    }

    /// Create a value sort with custom configuration.
    ///
    /// # Errors
    /// Returns [`SortError::InvalidFraction`] unless `0 < fraction <= 0.5`.
    pub fn with_config(config: ValueConfig) -> Result<Self, SortError> {
        if !(config.fraction > 0.0 && config.fraction <= 0.5) {
            return Err(SortError::InvalidFraction { sort: "value", fraction: config.fraction });
        }
        Ok(Self { config })
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &ValueConfig {
        &self.config
    }
}

impl Default for ValueSort {
    fn default() -> Self {
        Self::new()
    }
}

impl BucketSorter for ValueSort {
    fn name(&self) -> &str {
        "value"
    }

    fn buckets(&self) -> &[Bucket] {
        &Self::BUCKETS
    }

    fn min_population(&self) -> usize {
        self.config.min_population
    }

    fn assign(&self, date: Date, values: &[(Symbol, f64)]) -> Option<BucketAssignment> {
        let kept: Vec<(Symbol, f64)>;
        let values = if self.config.positive_only {
            kept = values.iter().filter(|(_, v)| *v > 0.0).cloned().collect();
            kept.as_slice()
        } else {
            values
        };

        let n = values.len();
        if n < self.config.min_population {
            return None;
        }

        let sorted = ranked(values);
        let k = tail_len(n, self.config.fraction);
        if k == 0 {
            return None;
        }
        let value = &sorted[..k];
        let growth = &sorted[n - k..];
        let low = value[k - 1].1;
        let high = growth[0].1;

        let symbols = |slice: &[&(Symbol, f64)]| slice.iter().map(|(s, _)| s.clone()).collect::<Vec<_>>();
        let neutral = sorted.iter().filter(|(_, v)| *v > low && *v < high).map(|(s, _)| s.clone());

        Some(
            BucketAssignment::new(date)
                .with_group(Bucket::Value, symbols(value))
                .with_group(Bucket::Neutral, neutral)
                .with_group(Bucket::Growth, symbols(growth)),
        )
    }
}
