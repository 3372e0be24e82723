//! Flat-file data sources.

use std::{collections::BTreeMap, path::Path};

use famafrench_primitives::{Bar, Date, Symbol};
use famafrench_traits::{BarSource, InstrumentFilter, InstrumentSource};

use crate::{
    UtilsError,
    dates::DateRange,
    io::{load_bars, read_csv, text_values},
};

/// Bars of many securities or funds loaded from one CSV file.
#[derive(Debug, Clone, Default)]
pub struct CsvBarStore {
    bars: BTreeMap<Symbol, Vec<Bar>>,
}

impl CsvBarStore {
    /// Load a bar file whose value column is `value_column`.
    ///
    /// # Errors
    /// Returns `UtilsError` if the file cannot be loaded.
    pub fn open(path: &Path, value_column: &str, range: DateRange) -> Result<Self, UtilsError> {
        Ok(Self::from_bars(load_bars(path, value_column, range)?))
    }

    /// Index bars by symbol, each list in date order.
    #[must_use]
    pub fn from_bars(bars: Vec<Bar>) -> Self {
        let mut by_symbol: BTreeMap<Symbol, Vec<Bar>> = BTreeMap::new();
        for bar in bars {
            by_symbol.entry(bar.symbol.clone()).or_default().push(bar);
        }
        for list in by_symbol.values_mut() {
            list.sort_by_key(|b| b.date);
        }
        Self { bars: by_symbol }
    }

    /// Symbols with at least one bar, ascending.
    #[must_use]
    pub fn symbols(&self) -> Vec<Symbol> {
        self.bars.keys().cloned().collect()
    }

    /// Every bar, grouped by symbol.
    pub fn all(&self) -> impl Iterator<Item = &Bar> {
        self.bars.values().flatten()
    }
}

impl BarSource for CsvBarStore {
    type Error = UtilsError;

    fn bars(&self, symbol: &Symbol, start: Date, end: Date) -> Result<Vec<Bar>, UtilsError> {
        Ok(self
            .bars
            .get(symbol)
            .map(|list| list.iter().filter(|b| start <= b.date && b.date <= end).cloned().collect())
            .unwrap_or_default())
    }
}

/// Instrument listing: a `symbol` column plus arbitrary attribute columns.
#[derive(Debug, Clone)]
pub struct CsvInstruments {
    df: polars::prelude::DataFrame,
}

impl CsvInstruments {
    /// Load a listing file.
    ///
    /// # Errors
    /// Returns `UtilsError` if the file cannot be read or has no `symbol`
    /// column.
    pub fn open(path: &Path) -> Result<Self, UtilsError> {
        let df = read_csv(path)?;
        text_values(&df, "symbol")?;
        Ok(Self { df })
    }
}

impl InstrumentSource for CsvInstruments {
    type Error = UtilsError;

    fn instruments(&self, filter: Option<&InstrumentFilter>) -> Result<Vec<Symbol>, UtilsError> {
        let symbols = text_values(&self.df, "symbol")?;
        let keep: Vec<bool> = match filter {
            Some(f) => text_values(&self.df, &f.column)?
                .into_iter()
                .map(|v| v.as_deref().map(str::trim) == Some(f.value.as_str()))
                .collect(),
            None => vec![true; symbols.len()],
        };

        let mut out: Vec<Symbol> = symbols
            .into_iter()
            .zip(keep)
            .filter_map(|(s, k)| s.filter(|_| k).map(Symbol::new))
            .collect();
        out.sort();
        out.dedup();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn bar_store_filters_by_symbol_and_range() {
        let store = CsvBarStore::from_bars(vec![
            Bar::new(Symbol::new("F1"), ymd(2020, 1, 3), 1.01),
            Bar::new(Symbol::new("F1"), ymd(2020, 1, 2), 1.00),
            Bar::new(Symbol::new("F2"), ymd(2020, 1, 2), 2.00),
        ]);

        assert_eq!(store.symbols(), vec![Symbol::new("F1"), Symbol::new("F2")]);
        let bars = store.bars(&Symbol::new("F1"), ymd(2020, 1, 1), ymd(2020, 1, 31)).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, ymd(2020, 1, 2));

        let none = store.bars(&Symbol::new("F1"), ymd(2021, 1, 1), ymd(2021, 1, 31)).unwrap();
        assert!(none.is_empty());
        assert!(store.bars(&Symbol::new("XX"), ymd(2020, 1, 1), ymd(2020, 1, 31)).unwrap().is_empty());
    }

    #[test]
    fn instruments_filtered_by_attribute() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("funds.csv");
        std::fs::write(
            &path,
            "symbol,investment_type\n000011,Stock\n000001,Hybrid\n000003,Stock\n000011,Stock\n",
        )
        .unwrap();
        let listing = CsvInstruments::open(&path).unwrap();

        let stock = listing.instruments(Some(&InstrumentFilter::new("investment_type", "Stock"))).unwrap();
        assert_eq!(stock, vec![Symbol::new("000003"), Symbol::new("000011")]);
        assert_eq!(listing.instruments(None).unwrap().len(), 3);

        let err = listing.instruments(Some(&InstrumentFilter::new("style", "Growth"))).unwrap_err();
        assert!(matches!(err, UtilsError::MissingColumn(_)));
    }
}
