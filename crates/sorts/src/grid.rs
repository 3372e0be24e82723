//! 2x3 size / value grid.

use std::collections::BTreeSet;

use famafrench_primitives::{Bucket, BucketAssignment, Date, SortPanel};
use famafrench_traits::BucketSorter;
use tracing::debug;

use crate::{SizeSort, ValueSort};

/// Intersects size and value groups into the six cells `SV, SN, SG, BV, BN, BG`.
#[derive(Debug, Clone, Default)]
pub struct GridSort {
    size: SizeSort,
    value: ValueSort,
}

impl GridSort {
    const SIZE_BUCKETS: [Bucket; 2] = [Bucket::Small, Bucket::Big];
    const VALUE_BUCKETS: [Bucket; 3] = [Bucket::Value, Bucket::Neutral, Bucket::Growth];

    /// Create a grid from its two legs.
    #[must_use]
    pub const fn new(size: SizeSort, value: ValueSort) -> Self {
        Self { size, value }
    }

    /// Buckets produced.
    #[must_use]
    pub const fn buckets(&self) -> &[Bucket] {
        &Bucket::GRID
    }

    /// Size leg.
    #[must_use]
    pub const fn size_sort(&self) -> &SizeSort {
        &self.size
    }

    /// Value leg.
    #[must_use]
    pub const fn value_sort(&self) -> &ValueSort {
        &self.value
    }

    /// Cells of one date from a size and a value assignment.
    ///
    /// Cells may be empty.
    #[must_use]
    pub fn cells(date: Date, size: &BucketAssignment, value: &BucketAssignment) -> BucketAssignment {
        let empty = BTreeSet::new();
        let mut out = BucketAssignment::new(date);
        for s in Self::SIZE_BUCKETS {
            let size_members = size.members(s).unwrap_or(&empty);
            for v in Self::VALUE_BUCKETS {
                let value_members = value.members(v).unwrap_or(&empty);
                if let Some(cell) = Bucket::cell(s, v) {
                    out = out.with_group(cell, size_members.intersection(value_members).cloned());
                }
            }
        }
        out
    }

    /// Grid assignments over the union of both panels' dates.
    ///
    /// Dates start at the later of the two panels' first dates. Each leg
    /// re-sorts on every date it has enough values for and otherwise keeps
    /// its most recent groups; a date is emitted only once both legs have
    /// formed groups at least once.
    #[must_use]
    pub fn assignments(&self, size_panel: &SortPanel, value_panel: &SortPanel) -> Vec<BucketAssignment> {
        let (Some(size_first), Some(value_first)) = (size_panel.first_date(), value_panel.first_date())
        else {
            return Vec::new();
        };
        let start = size_first.max(value_first);
        let dates: BTreeSet<Date> =
            size_panel.dates().chain(value_panel.dates()).filter(|d| *d >= start).collect();

        let mut last_size: Option<BucketAssignment> = None;
        let mut last_value: Option<BucketAssignment> = None;
        let mut out = Vec::new();

        for date in dates {
            if let Some(a) = self.size.assign(date, size_panel.on(date)) {
                last_size = Some(a);
            }
            if let Some(a) = self.value.assign(date, value_panel.on(date)) {
                last_value = Some(a);
            }
            match (&last_size, &last_value) {
                (Some(size), Some(value)) => out.push(Self::cells(date, size, value)),
                _ => debug!(%date, "grid warm-up, skipping date"),
            }
        }
        out
    }
}
