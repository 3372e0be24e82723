//! Batch regressions over many entities.

use famafrench_primitives::{Bar, Factor, FactorPanel, RegressionResult, Symbol};
use famafrench_traits::{BarSource, ExposureEstimator};
use famafrench_utils::{DateRange, simple_returns};
use tracing::{debug, info, warn};

use crate::{CrossSectionalRegressor, EntityError};

/// Successes and failures of one batch, in processing order.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// Fitted entities.
    pub results: Vec<RegressionResult>,
    /// Entities that could not be fitted.
    pub failures: Vec<EntityError>,
}

impl BatchOutcome {
    /// Record one entity's outcome.
    pub fn push(&mut self, outcome: Result<RegressionResult, EntityError>) {
        match outcome {
            Ok(result) => self.results.push(result),
            Err(err) => self.failures.push(err),
        }
    }

    /// Number of entities processed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len() + self.failures.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Results ordered by symbol.
    #[must_use]
    pub fn sorted_results(&self) -> Vec<RegressionResult> {
        let mut out = self.results.clone();
        out.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        out
    }
}

/// Market factor from index bars: `Rm` is the index's simple return.
#[must_use]
pub fn market_returns(index_bars: &[Bar]) -> FactorPanel {
    FactorPanel::from_series(Factor::Rm, simple_returns(index_bars).defined().map(|(d, r)| (d, Some(r))))
}

/// Replace the panel's `Rm` with an external market series.
///
/// Only dates present in both are kept.
#[must_use]
pub fn with_market(factors: &FactorPanel, market: &FactorPanel) -> FactorPanel {
    market.clone().inner_join(&factors.clone().without(Factor::Rm))
}

impl<E: ExposureEstimator> CrossSectionalRegressor<E> {
    /// Regress every symbol's returns over `range` on `factors`.
    ///
    /// Per-entity failures are logged and collected; they never stop the
    /// batch. `on_entity` is called after each entity, e.g. to tick a
    /// progress bar.
    pub fn run_batch<S, F>(
        &self,
        source: &S,
        symbols: &[Symbol],
        range: DateRange,
        factors: &FactorPanel,
        mut on_entity: F,
    ) -> BatchOutcome
    where
        S: BarSource,
        F: FnMut(&Symbol, &Result<RegressionResult, EntityError>),
    {
        info!(entities = symbols.len(), factor_dates = factors.len(), "starting regression batch");
        let mut outcome = BatchOutcome {
            results: Vec::with_capacity(symbols.len()),
            failures: Vec::new(),
        };

        for symbol in symbols {
            let result = match source.bars(symbol, range.start, range.end) {
                Ok(bars) if bars.is_empty() => Err(EntityError::MissingData { symbol: symbol.clone() }),
                Ok(bars) => self.regress(symbol, &simple_returns(&bars), factors),
                Err(e) => Err(EntityError::FitFailure { symbol: symbol.clone(), reason: e.to_string() }),
            };

            match &result {
                Ok(r) => debug!(%symbol, n_obs = r.n_obs, r_squared = r.r_squared, "fitted"),
                Err(err @ EntityError::FitFailure { .. }) => warn!(%symbol, kind = err.kind(), "{err}"),
                Err(err) => info!(%symbol, kind = err.kind(), "{err}"),
            }
            on_entity(symbol, &result);
            outcome.push(result);
        }

        info!(fitted = outcome.results.len(), failed = outcome.failures.len(), "regression batch complete");
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use famafrench_primitives::{Date, FactorValues};
    use famafrench_utils::CsvBarStore;

    fn date(i: usize) -> Date {
        Date::from_ymd_opt(2019, 1, 1).unwrap() + chrono::Duration::days(i as i64)
    }

    fn factors(n: usize) -> FactorPanel {
        (0..n)
            .map(|i| {
                let t = i as f64;
                (date(i), FactorValues {
                    rm: Some((0.41 * t).sin() * 0.02),
                    smb: Some((1.07 * t).cos() * 0.01),
                    hml: Some((2.3 * t).sin() * 0.008),
                })
            })
            .collect()
    }

    /// NAV path whose daily returns follow the factors.
    fn nav_bars(symbol: &str, panel: &FactorPanel, n: usize) -> Vec<Bar> {
        let mut nav = 1.0;
        let mut bars = vec![Bar::new(Symbol::new(symbol), date(0), nav)];
        for i in 1..n {
            let f = panel.get(date(i)).unwrap();
            let noise = (4.9 * i as f64).cos() * 1e-4;
            nav *= 1.0 + 0.9 * f.rm.unwrap() + 0.1 * f.smb.unwrap() + noise;
            bars.push(Bar::new(Symbol::new(symbol), date(i), nav));
        }
        bars
    }

    #[test]
    fn batch_collects_successes_and_failures() {
        let panel = factors(250);
        let mut bars = nav_bars("F2", &panel, 250);
        bars.extend(nav_bars("F1", &panel, 250));
        bars.extend(nav_bars("F3", &panel, 30));
        let store = CsvBarStore::from_bars(bars);

        let symbols: Vec<Symbol> = ["F2", "F1", "F3", "F4"].into_iter().map(Symbol::new).collect();
        let mut seen = 0;
        let outcome = CrossSectionalRegressor::new().run_batch(
            &store,
            &symbols,
            DateRange::default(),
            &panel,
            |_, _| seen += 1,
        );

        assert_eq!(seen, 4);
        assert_eq!(outcome.len(), 4);
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.sorted_results()[0].symbol.as_str(), "F1");
        assert!(matches!(outcome.failures[0], EntityError::InsufficientSample { actual: 29, .. }));
        assert!(matches!(&outcome.failures[1], EntityError::MissingData { symbol } if symbol.as_str() == "F4"));
        assert_relative_eq!(outcome.results[0].coefficient("Rm").unwrap(), 0.9, epsilon = 1e-2);
    }

    #[test]
    fn market_override_replaces_rm() {
        let index = vec![
            Bar::new(Symbol::new("000300"), date(0), 100.0),
            Bar::new(Symbol::new("000300"), date(1), 101.0),
            Bar::new(Symbol::new("000300"), date(2), 99.99),
        ];
        let market = market_returns(&index);
        assert_eq!(market.len(), 2);

        let panel = factors(2);
        let merged = with_market(&panel, &market);

        // date(2) has no SMB / HML in the panel
        assert_eq!(merged.len(), 1);
        let row = merged.get(date(1)).unwrap();
        assert_relative_eq!(row.rm.unwrap(), 0.01, epsilon = 1e-12);
        assert_eq!(row.smb, panel.get(date(1)).unwrap().smb);
    }
}
