//! Bucket assignments and holding periods.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::{Date, Symbol};

/// Named portfolio bucket.
///
/// `Small`/`Big` come from the size sort, `Value`/`Neutral`/`Growth` from the
/// price-to-book sort, and the six two-letter cells from their intersection.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Bucket {
    /// Bottom half by capitalization.
    Small,
    /// Top half by capitalization.
    Big,
    /// Cheapest 30% by price-to-book (high book-to-price).
    Value,
    /// Strictly between the value and growth boundaries.
    Neutral,
    /// Most expensive 30% by price-to-book.
    Growth,
    /// Small and value.
    SV,
    /// Small and neutral.
    SN,
    /// Small and growth.
    SG,
    /// Big and value.
    BV,
    /// Big and neutral.
    BN,
    /// Big and growth.
    BG,
}

impl Bucket {
    /// The six cells of the 2x3 grid in canonical order.
    pub const GRID: [Self; 6] = [Self::SV, Self::SN, Self::SG, Self::BV, Self::BN, Self::BG];

    /// Short label used as a column name.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Big => "big",
            Self::Value => "value",
            Self::Neutral => "neutral",
            Self::Growth => "growth",
            Self::SV => "SV",
            Self::SN => "SN",
            Self::SG => "SG",
            Self::BV => "BV",
            Self::BN => "BN",
            Self::BG => "BG",
        }
    }

    /// Grid cell formed by a size bucket and a value bucket.
    #[must_use]
    pub const fn cell(size: Self, value: Self) -> Option<Self> {
        match (size, value) {
            (Self::Small, Self::Value) => Some(Self::SV),
            (Self::Small, Self::Neutral) => Some(Self::SN),
            (Self::Small, Self::Growth) => Some(Self::SG),
            (Self::Big, Self::Value) => Some(Self::BV),
            (Self::Big, Self::Neutral) => Some(Self::BN),
            (Self::Big, Self::Growth) => Some(Self::BG),
            _ => None,
        }
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Partition of symbols into named buckets on one rebalancing date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketAssignment {
    /// Rebalancing date.
    pub date: Date,
    /// Members per bucket. A bucket may be present with no members.
    pub groups: BTreeMap<Bucket, BTreeSet<Symbol>>,
}

impl BucketAssignment {
    /// Create an assignment with no groups.
    #[must_use]
    pub const fn new(date: Date) -> Self {
        Self { date, groups: BTreeMap::new() }
    }

    /// Add or replace a group.
    #[must_use]
    pub fn with_group(mut self, bucket: Bucket, members: impl IntoIterator<Item = Symbol>) -> Self {
        self.groups.insert(bucket, members.into_iter().collect());
        self
    }

    /// Members of a bucket.
    #[must_use]
    pub fn members(&self, bucket: Bucket) -> Option<&BTreeSet<Symbol>> {
        self.groups.get(&bucket)
    }

    /// Buckets present in this assignment.
    pub fn buckets(&self) -> impl Iterator<Item = Bucket> + '_ {
        self.groups.keys().copied()
    }

    /// Total number of memberships across buckets.
    #[must_use]
    pub fn n_members(&self) -> usize {
        self.groups.values().map(BTreeSet::len).sum()
    }

    /// Swap the members of two buckets.
    #[must_use]
    pub fn swapped(mut self, a: Bucket, b: Bucket) -> Self {
        let ma = self.groups.remove(&a);
        let mb = self.groups.remove(&b);
        if let Some(m) = mb {
            self.groups.insert(a, m);
        }
        if let Some(m) = ma {
            self.groups.insert(b, m);
        }
        self
    }
}

/// Half-open interval `[start, end)` over which an assignment is held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoldingPeriod {
    /// Rebalancing date the assignment was formed on (inclusive).
    pub start: Date,
    /// Next rebalancing date (exclusive).
    pub end: Date,
    /// Bucket membership held over the interval.
    pub assignment: BucketAssignment,
}

impl HoldingPeriod {
    /// Create a holding period.
    #[must_use]
    pub const fn new(start: Date, end: Date, assignment: BucketAssignment) -> Self {
        Self { start, end, assignment }
    }

    /// Whether a date falls inside `[start, end)`.
    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date < self.end
    }
}
