//! Data-access trait definitions.

use famafrench_primitives::{Bar, Date, Symbol};

/// Attribute filter on an instrument listing, e.g. `invest_type == "equity"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstrumentFilter {
    /// Attribute column.
    pub column: String,
    /// Required value.
    pub value: String,
}

impl InstrumentFilter {
    /// Create a new filter.
    #[must_use]
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self { column: column.into(), value: value.into() }
    }
}

/// Daily bars for one security over a date range.
pub trait BarSource {
    /// Error raised by the underlying store.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Bars of `symbol` with `start <= date <= end`, in ascending date order.
    ///
    /// An unknown symbol yields an empty vector, not an error.
    ///
    /// # Errors
    /// Returns the store's error when it cannot be read.
    fn bars(&self, symbol: &Symbol, start: Date, end: Date) -> Result<Vec<Bar>, Self::Error>;
}

/// Listing of tradable instruments.
pub trait InstrumentSource {
    /// Error raised by the underlying store.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Symbols matching the filter (all symbols when `None`), sorted.
    ///
    /// # Errors
    /// Returns the store's error when it cannot be read or the filter column
    /// does not exist.
    fn instruments(&self, filter: Option<&InstrumentFilter>) -> Result<Vec<Symbol>, Self::Error>;
}
