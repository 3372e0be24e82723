//! Run configuration loaded from JSON and overridden by flags.

use std::path::{Path, PathBuf};

use famafrench::{
    model::{FactorConfig, RegressionConfig},
    primitives::Date,
    traits::InstrumentFilter,
    utils::{DateRange, UtilsError},
};
use serde::Deserialize;

/// Input and output locations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Paths {
    /// Stock bars `date, symbol, <value>, total_shares, free_float_shares`.
    pub(crate) prices: Option<PathBuf>,
    /// Precomputed stock returns, the output of `returns`.
    pub(crate) returns: Option<PathBuf>,
    /// Capitalization sort panel.
    pub(crate) cap: Option<PathBuf>,
    /// Price-to-book sort panel.
    pub(crate) pb: Option<PathBuf>,
    /// Fund NAV bars.
    pub(crate) nav: Option<PathBuf>,
    /// Factor panel to regress on, calculated or downloaded.
    pub(crate) factors: Option<PathBuf>,
    /// Market index bars used as `Rm`.
    pub(crate) index: Option<PathBuf>,
    /// Fund listing narrowing the regression universe.
    pub(crate) instruments: Option<PathBuf>,
    /// Stock listing narrowing the return step's universe.
    pub(crate) stock_instruments: Option<PathBuf>,
    /// Directory receiving every output file.
    pub(crate) out_dir: Option<PathBuf>,
}

/// `column == value` on the instrument listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct UniverseFilter {
    pub(crate) column: String,
    pub(crate) value: String,
}

impl UniverseFilter {
    /// Parse `column=value`.
    pub(crate) fn parse(text: &str) -> Result<Self, String> {
        match text.split_once('=') {
            Some((column, value)) if !column.trim().is_empty() => {
                Ok(Self { column: column.trim().to_string(), value: value.trim().to_string() })
            }
            _ => Err(format!("expected COLUMN=VALUE, got {text:?}")),
        }
    }

    pub(crate) fn to_filter(&self) -> InstrumentFilter {
        InstrumentFilter::new(&self.column, &self.value)
    }
}

/// Everything one run needs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct RunConfig {
    /// First date of the run, inclusive.
    pub(crate) start: Option<Date>,
    /// Last date of the run, inclusive.
    pub(crate) end: Option<Date>,
    pub(crate) paths: Paths,
    /// Value column of the stock bars file.
    pub(crate) price_column: String,
    /// Value column of the fund bars file.
    pub(crate) nav_column: String,
    /// Value column of the index bars file.
    pub(crate) index_column: String,
    /// Filter on the fund listing.
    pub(crate) universe: Option<UniverseFilter>,
    /// Filter on the stock listing.
    pub(crate) stock_universe: Option<UniverseFilter>,
    pub(crate) factors: FactorConfig,
    pub(crate) regression: RegressionConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            start: None,
            end: None,
            paths: Paths::default(),
            price_column: "close".to_string(),
            nav_column: "adjusted_net_asset_value".to_string(),
            index_column: "close".to_string(),
            universe: None,
            stock_universe: None,
            // the command line builds cap-weighted factors unless told otherwise
            factors: FactorConfig { weighted: true, ..FactorConfig::default() },
            regression: RegressionConfig::default(),
        }
    }
}

impl RunConfig {
    /// Load a JSON configuration file.
    pub(crate) fn from_json_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Inclusive date range of the run.
    pub(crate) fn range(&self) -> Result<DateRange, UtilsError> {
        let unbounded = DateRange::unbounded();
        DateRange::new(self.start.unwrap_or(unbounded.start), self.end.unwrap_or(unbounded.end))
    }

    /// Output directory, `.` when unset.
    pub(crate) fn out_dir(&self) -> PathBuf {
        self.paths.out_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    pub(crate) fn instrument_filter(&self) -> Option<InstrumentFilter> {
        self.universe.as_ref().map(UniverseFilter::to_filter)
    }

    pub(crate) fn stock_filter(&self) -> Option<InstrumentFilter> {
        self.stock_universe.as_ref().map(UniverseFilter::to_filter)
    }
}

/// Look up a required path.
pub(crate) fn required<'a>(path: Option<&'a PathBuf>, what: &str) -> Result<&'a Path, String> {
    path.map(PathBuf::as_path).ok_or_else(|| format!("no {what} file given (flag or config paths.{what})"))
}
