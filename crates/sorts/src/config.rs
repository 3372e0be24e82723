//! Sort configuration shared by the single and grid sorts.

use serde::Deserialize;

use crate::{GridSort, SizeConfig, SizeSort, SortError, ValueConfig, ValueSort};

/// Configuration of every sort used in one factor-construction run.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    /// Minimum number of non-null values for a date to form groups.
    pub min_population: usize,
    /// Share of the population in each of Small and Big.
    pub size_fraction: f64,
    /// Share of the population in each of Value and Growth.
    pub value_fraction: f64,
    /// Drop non-positive price-to-book in the standalone value sort.
    pub positive_value_only: bool,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self { min_population: 100, size_fraction: 0.5, value_fraction: 0.3, positive_value_only: true }
    }
}

impl SortConfig {
    /// Size sort configuration.
    #[must_use]
    pub const fn size(&self) -> SizeConfig {
        SizeConfig { fraction: self.size_fraction, min_population: self.min_population }
    }

    /// Standalone value sort configuration.
    #[must_use]
    pub const fn value(&self) -> ValueConfig {
        ValueConfig {
            fraction: self.value_fraction,
            min_population: self.min_population,
            positive_only: self.positive_value_only,
        }
    }

    /// Build the size sort.
    ///
    /// # Errors
    /// Returns [`SortError`] on an invalid fraction.
    pub fn size_sort(&self) -> Result<SizeSort, SortError> {
        SizeSort::with_config(self.size())
    }

    /// Build the standalone value sort.
    ///
    /// # Errors
    /// Returns [`SortError`] on an invalid fraction.
    pub fn value_sort(&self) -> Result<ValueSort, SortError> {
        ValueSort::with_config(self.value())
    }

    /// Build the 2x3 grid sort. Its value leg ranks every price-to-book value.
    ///
    /// # Errors
    /// Returns [`SortError`] on an invalid fraction.
    pub fn grid_sort(&self) -> Result<GridSort, SortError> {
        let value = ValueSort::with_config(ValueConfig { positive_only: false, ..self.value() })?;
        Ok(GridSort::new(self.size_sort()?, value))
    }
}
