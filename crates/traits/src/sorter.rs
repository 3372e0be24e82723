//! Bucket sorting trait definitions.

use famafrench_primitives::{Bucket, BucketAssignment, Date, Symbol};

/// Ranks one date's cross-section by a sort variable and partitions it into
/// named buckets.
pub trait BucketSorter: Send + Sync {
    /// Name of the sort (`size`, `value`).
    fn name(&self) -> &str;

    /// Buckets this sorter produces.
    fn buckets(&self) -> &[Bucket];

    /// Minimum number of non-null values needed to form buckets.
    fn min_population(&self) -> usize;

    /// Partition `(symbol, value)` pairs observed on `date`.
    ///
    /// Returns `None` when the population is below [`Self::min_population`].
    fn assign(&self, date: Date, values: &[(Symbol, f64)]) -> Option<BucketAssignment>;
}
