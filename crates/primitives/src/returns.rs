//! Return type definitions.

use serde::{Deserialize, Serialize};

use crate::{Date, ShareBasis, Symbol};

/// Simple return of one security on one date, with the share counts used
/// for capitalization weighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnObservation {
    /// Security identifier.
    pub symbol: Symbol,
    /// Trading date.
    pub date: Date,
    /// `(v_t - v_{t-1}) / v_{t-1}`; `None` on the first observation.
    pub ret: Option<f64>,
    /// Total shares outstanding on the date.
    pub total_shares: Option<f64>,
    /// Free-float shares on the date.
    pub free_float_shares: Option<f64>,
}

impl ReturnObservation {
    /// Shares used as weight under the given basis.
    #[must_use]
    pub const fn shares(&self, basis: ShareBasis) -> Option<f64> {
        match basis {
            ShareBasis::Total => self.total_shares,
            ShareBasis::FreeFloat => self.free_float_shares,
        }
    }
}

/// Date-ordered return series of a single entity (fund, index).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    /// Entity identifier.
    pub symbol: Option<Symbol>,
    /// `(date, return)` pairs in ascending date order; the first return is `None`.
    pub points: Vec<(Date, Option<f64>)>,
}

impl ReturnSeries {
    /// Create a series from already-ordered points.
    #[must_use]
    pub const fn new(symbol: Option<Symbol>, points: Vec<(Date, Option<f64>)>) -> Self {
        Self { symbol, points }
    }

    /// Number of points, including the leading null.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterate over the defined returns only.
    pub fn defined(&self) -> impl Iterator<Item = (Date, f64)> + '_ {
        self.points.iter().filter_map(|&(d, r)| r.map(|r| (d, r)))
    }

    /// Return on a specific date.
    #[must_use]
    pub fn get(&self, date: Date) -> Option<f64> {
        self.points
            .binary_search_by(|(d, _)| d.cmp(&date))
            .ok()
            .and_then(|i| self.points[i].1)
    }
}
