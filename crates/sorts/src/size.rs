//! Size sort.

use famafrench_primitives::{Bucket, BucketAssignment, Date, Symbol};
use famafrench_traits::BucketSorter;
use serde::Deserialize;

use crate::{
    SortError,
    rank::{ranked, tail_len},
};

/// Configuration for the size sort.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SizeConfig {
    /// Share of the ranked population in each of Small and Big.
    pub fraction: f64,
    /// Minimum number of non-null values on a date.
    pub min_population: usize,
}

impl Default for SizeConfig {
    fn default() -> Self {
        Self { fraction: 0.5, min_population: 100 }
    }
}

/// Two-way size split into `Small` and `Big`.
///
/// Securities are ranked ascending by their capitalization proxy. With
/// `k = floor(fraction * N)` the first `k` form Small and the last `k` form
/// Big. At the default fraction of one half the split is an exact partition:
/// Small holds `floor(N / 2)` and Big the remaining `N - floor(N / 2)`, so for
/// odd `N` the median security is Big.
#[derive(Debug, Clone)]
pub struct SizeSort {
    config: SizeConfig,
}

impl SizeSort {
    const BUCKETS: [Bucket; 2] = [Bucket::Small, Bucket::Big];

    /// Create a new size sort with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self { config: SizeConfig::default() }
    }

    /// Create a size sort with custom configuration.
    ///
    /// # Errors
    /// Returns [`SortError::InvalidFraction`] unless `0 < fraction <= 0.5`.
    pub fn with_config(config: SizeConfig) -> Result<Self, SortError> {
        if !(config.fraction > 0.0 && config.fraction <= 0.5) {
            return Err(SortError::InvalidFraction { sort: "size", fraction: config.fraction });
        }
        Ok(Self { config })
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &SizeConfig {
        &self.config
    }
}

impl Default for SizeSort {
    fn default() -> Self {
        Self::new()
    }
}

impl BucketSorter for SizeSort {
    fn name(&self) -> &str {
        "size"
    }

    fn buckets(&self) -> &[Bucket] {
        &Self::BUCKETS
    }

    fn min_population(&self) -> usize {
        self.config.min_population
    }

    fn assign(&self, date: Date, values: &[(Symbol, f64)]) -> Option<BucketAssignment> {
        let n = values.len();
        if n < self.config.min_population {
            return None;
        }

        let sorted = ranked(values);
        let k = tail_len(n, self.config.fraction);
        let big_start = if self.config.fraction >= 0.5 { k } else { n - k };
        let symbols = |slice: &[&(Symbol, f64)]| slice.iter().map(|(s, _)| s.clone()).collect::<Vec<_>>();

        Some(
            BucketAssignment::new(date)
                .with_group(Bucket::Small, symbols(&sorted[..k]))
                .with_group(Bucket::Big, symbols(&sorted[big_start..])),
        )
    }
}
