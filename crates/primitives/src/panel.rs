//! Sparse sort-variable panel.

use std::collections::BTreeMap;

use crate::{Date, Symbol};

/// Sort variable (log-cap, price-to-book) per date and symbol.
///
/// Null observations are dropped on construction, so every stored value is
/// rankable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortPanel {
    by_date: BTreeMap<Date, Vec<(Symbol, f64)>>,
}

impl SortPanel {
    /// Build a panel from `(symbol, date, value)` observations.
    ///
    /// `None` and NaN values are skipped.
    #[must_use]
    pub fn from_observations(
        observations: impl IntoIterator<Item = (Symbol, Date, Option<f64>)>,
    ) -> Self {
        let mut by_date: BTreeMap<Date, Vec<(Symbol, f64)>> = BTreeMap::new();
        for (symbol, date, value) in observations {
            if let Some(v) = value.filter(|v| !v.is_nan()) {
                by_date.entry(date).or_default().push((symbol, v));
            }
        }
        Self { by_date }
    }

    /// Values observed on a date (empty when the date is absent).
    #[must_use]
    pub fn on(&self, date: Date) -> &[(Symbol, f64)] {
        self.by_date.get(&date).map_or(&[], Vec::as_slice)
    }

    /// Dates with at least one value, ascending.
    pub fn dates(&self) -> impl Iterator<Item = Date> + '_ {
        self.by_date.keys().copied()
    }

    /// Earliest date.
    #[must_use]
    pub fn first_date(&self) -> Option<Date> {
        self.by_date.keys().next().copied()
    }

    /// Number of dates.
    #[must_use]
    pub fn n_dates(&self) -> usize {
        self.by_date.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}
