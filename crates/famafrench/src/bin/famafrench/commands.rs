//! Steps of the batch job.

use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
    time::Duration,
};

use famafrench::{
    model::{CrossSectionalRegressor, FactorSynthesizer, ModelError, market_returns, with_market},
    primitives::{Bar, Factor, Symbol},
    traits::{InstrumentFilter, InstrumentSource},
    utils::{
        CsvBarStore, CsvInstruments, DateRange, load_bars, load_sort_panel, load_stock_returns,
        read_factor_panel, return_observations, returns_frame, stock_returns_file_name, write_factor_panel,
        write_regression_results, write_stock_returns,
    },
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::config::{RunConfig, required};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Symbols of a universe listing, or `None` when no listing is configured.
fn universe(path: Option<&Path>, filter: Option<InstrumentFilter>, what: &str) -> CliResult<Option<Vec<Symbol>>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let symbols = CsvInstruments::open(path)?.instruments(filter.as_ref())?;
    info!(path = %path.display(), symbols = symbols.len(), filter = ?filter, "{what} universe loaded");
    Ok(Some(symbols))
}

/// Dates naming the stock-return file: the configured bounds, with an
/// unbounded side taken from the bars.
fn file_span(config: &RunConfig, bars: &[Bar]) -> CliResult<DateRange> {
    let first = bars.iter().map(|b| b.date).min().ok_or_else(|| ModelError::NoData("no bars in range".into()))?;
    let last = bars.iter().map(|b| b.date).max().unwrap_or(first);
    Ok(DateRange::new(config.start.unwrap_or(first), config.end.unwrap_or(last))?)
}

/// Step 1: stock returns from price bars.
pub(crate) fn returns(config: &RunConfig) -> CliResult<PathBuf> {
    let range = config.range()?;
    let prices = required(config.paths.prices.as_ref(), "prices")?;
    let mut bars = load_bars(prices, &config.price_column, range)?;

    if let Some(symbols) = universe(config.paths.stock_instruments.as_deref(), config.stock_filter(), "stock")? {
        let wanted: BTreeSet<&Symbol> = symbols.iter().collect();
        bars.retain(|b| wanted.contains(&b.symbol));
        let present: BTreeSet<&Symbol> = bars.iter().map(|b| &b.symbol).collect();
        for symbol in symbols.iter().filter(|s| !present.contains(s)) {
            warn!(%symbol, "no bars in the given period, skipped");
        }
    }

    let span = file_span(config, &bars)?;
    let observations = return_observations(&bars);
    let path = config.out_dir().join(stock_returns_file_name(&span));
    write_stock_returns(&path, &observations)?;
    info!(rows = observations.len(), path = %path.display(), "stock returns written");
    Ok(path)
}

/// Step 2: Rm, SMB and HML from stock returns and the two sort panels.
pub(crate) fn factors(config: &RunConfig, returns: Option<PathBuf>) -> CliResult<PathBuf> {
    let range = config.range()?;
    let returns_path = returns.or_else(|| config.paths.returns.clone());
    let returns_path = required(returns_path.as_ref(), "returns")?;

    let observations = load_stock_returns(returns_path, range)?;
    let frame = returns_frame(&observations)?;
    drop(observations);

    let size = load_sort_panel(required(config.paths.cap.as_ref(), "cap")?, range)?;
    let value = load_sort_panel(required(config.paths.pb.as_ref(), "pb")?, range)?;
    info!(size_dates = size.n_dates(), value_dates = value.n_dates(), "sort panels loaded");

    let panel = FactorSynthesizer::with_config(config.factors).construct(&frame, &size, &value)?;
    if panel.is_empty() {
        return Err(ModelError::NoData("no factor dates; check the sort panels' populations".into()).into());
    }

    let path = config.paths.factors.clone().unwrap_or_else(|| config.out_dir().join("factors.csv"));
    write_factor_panel(&path, &panel)?;
    info!(dates = panel.len(), path = %path.display(), "factor panel written");
    Ok(path)
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Step 3: regress every fund on the factor panel.
pub(crate) fn regress(config: &RunConfig, factors: Option<PathBuf>) -> CliResult<PathBuf> {
    let range = config.range()?;
    let factors_path = factors.or_else(|| config.paths.factors.clone());
    let mut panel = read_factor_panel(required(factors_path.as_ref(), "factors")?)?;

    if let Some(index) = config.paths.index.as_deref() {
        let market = market_returns(&load_bars(index, &config.index_column, range)?);
        panel = with_market(&panel, &market);
        info!(path = %index.display(), dates = panel.len(), "market index replaces Rm");
    }
    for factor in Factor::ALL {
        if !panel.has(factor) {
            return Err(ModelError::MissingColumn(factor.name().to_string()).into());
        }
    }

    let store = CsvBarStore::open(required(config.paths.nav.as_ref(), "nav")?, &config.nav_column, range)?;
    let symbols = match universe(config.paths.instruments.as_deref(), config.instrument_filter(), "fund")? {
        Some(symbols) => symbols,
        None => store.symbols(),
    };

    let regressor = CrossSectionalRegressor::with_config(config.regression);
    let pb = progress_bar(symbols.len());
    let outcome = regressor.run_batch(&store, &symbols, range, &panel, |symbol, _| {
        pb.set_message(symbol.to_string());
        pb.inc(1);
    });
    pb.finish_with_message(format!("{} fitted, {} skipped", outcome.results.len(), outcome.failures.len()));

    if outcome.results.is_empty() {
        return Err(ModelError::NoData(format!("no fund could be fitted ({} failures)", outcome.failures.len())).into());
    }

    let path = config.out_dir().join("fund_exposures.csv");
    write_regression_results(&path, &outcome.results)?;
    info!(funds = outcome.results.len(), path = %path.display(), "regression results written");
    Ok(path)
}
