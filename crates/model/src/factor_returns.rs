//! Factor construction: SMB, HML and the market return.

use std::collections::BTreeMap;

use famafrench_primitives::{
    Bucket, Date, Factor, FactorPanel, FactorValues, HoldingPeriod, ShareBasis, SortPanel, Weighting,
};
use famafrench_sorts::{SortConfig, holding_periods, sort_panel};
use polars::prelude::DataFrame;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{GroupReturnAggregator, ModelError};

/// How SMB and HML are built from the sorts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Construction {
    /// Independent size halves and value terciles; `SMB = Small - Big`,
    /// `HML = Value - Growth`.
    #[default]
    SimpleDivide,
    /// Six size / value cells; SMB and HML are averages across cells.
    Grid2x3,
}

/// Configuration for factor construction.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct FactorConfig {
    /// Construction method.
    pub construction: Construction,
    /// Capitalization-weight group returns (equal weights otherwise).
    pub weighted: bool,
    /// Shares used as weights.
    pub share_basis: ShareBasis,
    /// Bucket sort parameters.
    pub sorts: SortConfig,
}

impl Default for FactorConfig {
    fn default() -> Self {
        Self {
            construction: Construction::SimpleDivide,
            weighted: false,
            share_basis: ShareBasis::FreeFloat,
            sorts: SortConfig::default(),
        }
    }
}

impl FactorConfig {
    /// Weighting policy of group returns.
    #[must_use]
    pub const fn weighting(&self) -> Weighting {
        Weighting::from_flag(self.weighted, self.share_basis)
    }
}

/// `long - short` per date over the union of dates; null when a side is
/// missing.
#[must_use]
pub fn long_short(long: &[(Date, f64)], short: &[(Date, f64)]) -> BTreeMap<Date, Option<f64>> {
    let short_by_date: BTreeMap<Date, f64> = short.iter().copied().collect();
    let mut out: BTreeMap<Date, Option<f64>> = short.iter().map(|&(d, _)| (d, None)).collect();
    for &(date, l) in long {
        out.insert(date, short_by_date.get(&date).map(|s| l - s));
    }
    out
}

/// SMB and HML of one date from the six cell returns.
///
/// `SMB = ((SV + SN + SG) - (BV + BN + BG)) / 3`,
/// `HML = ((SV + BV) - (SG + BG)) / 2`; a missing cell makes the factor that
/// uses it `None`.
#[must_use]
pub fn grid_factors(cells: &BTreeMap<Bucket, f64>) -> (Option<f64>, Option<f64>) {
    let get = |b: Bucket| cells.get(&b).copied();
    let sum = |bs: &[Bucket]| bs.iter().map(|b| get(*b)).sum::<Option<f64>>();

    let small = sum(&[Bucket::SV, Bucket::SN, Bucket::SG]);
    let big = sum(&[Bucket::BV, Bucket::BN, Bucket::BG]);
    let value = sum(&[Bucket::SV, Bucket::BV]);
    let growth = sum(&[Bucket::SG, Bucket::BG]);

    let smb = small.zip(big).map(|(s, b)| (s - b) / 3.0);
    let hml = value.zip(growth).map(|(v, g)| (v - g) / 2.0);
    (smb, hml)
}

/// Builds the factor panel from a return panel and holding periods.
#[derive(Debug, Clone)]
pub struct FactorSynthesizer {
    config: FactorConfig,
    aggregator: GroupReturnAggregator,
}

impl FactorSynthesizer {
    /// Create a new synthesizer with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(FactorConfig::default())
    }

    /// Create a new synthesizer with custom configuration.
    #[must_use]
    pub fn with_config(config: FactorConfig) -> Self {
        Self { aggregator: GroupReturnAggregator::new(config.weighting()), config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &FactorConfig {
        &self.config
    }

    fn members_return(
        &self,
        frame: &DataFrame,
        period: &HoldingPeriod,
        bucket: Bucket,
    ) -> Result<Vec<(Date, f64)>, ModelError> {
        match period.assignment.members(bucket) {
            Some(members) => self.aggregator.group_returns(frame, Some(members)),
            None => Ok(Vec::new()),
        }
    }

    /// `Rm` and `SMB` over size holding periods.
    ///
    /// # Errors
    /// Returns `ModelError` if an aggregation fails.
    pub fn size_factors(&self, returns: &DataFrame, periods: &[HoldingPeriod]) -> Result<FactorPanel, ModelError> {
        let mut panel = FactorPanel::new();
        for period in periods {
            let frame = self.aggregator.period_frame(returns, period.start, period.end)?;
            let small = self.members_return(&frame, period, Bucket::Small)?;
            let big = self.members_return(&frame, period, Bucket::Big)?;
            let market = self.aggregator.market_returns(&frame)?;

            let smb = FactorPanel::from_series(Factor::Smb, long_short(&small, &big));
            let rm = FactorPanel::from_series(Factor::Rm, market.into_iter().map(|(d, r)| (d, Some(r))));
            panel.extend(smb.outer_join(rm));
            debug!(start = %period.start, end = %period.end, "size period done");
        }
        Ok(panel)
    }

    /// `HML` over value holding periods.
    ///
    /// # Errors
    /// Returns `ModelError` if an aggregation fails.
    pub fn value_factors(&self, returns: &DataFrame, periods: &[HoldingPeriod]) -> Result<FactorPanel, ModelError> {
        let mut panel = FactorPanel::new();
        for period in periods {
            let frame = self.aggregator.period_frame(returns, period.start, period.end)?;
            let value = self.members_return(&frame, period, Bucket::Value)?;
            let growth = self.members_return(&frame, period, Bucket::Growth)?;
            panel.extend(FactorPanel::from_series(Factor::Hml, long_short(&value, &growth)));
            debug!(start = %period.start, end = %period.end, "value period done");
        }
        Ok(panel)
    }

    /// `Rm`, `SMB` and `HML` over 2x3 grid holding periods.
    ///
    /// # Errors
    /// Returns `ModelError` if an aggregation fails.
    pub fn cell_factors(&self, returns: &DataFrame, periods: &[HoldingPeriod]) -> Result<FactorPanel, ModelError> {
        let mut panel = FactorPanel::new();
        for period in periods {
            let frame = self.aggregator.period_frame(returns, period.start, period.end)?;

            let mut by_date: BTreeMap<Date, BTreeMap<Bucket, f64>> = BTreeMap::new();
            for cell in Bucket::GRID {
                for (date, r) in self.members_return(&frame, period, cell)? {
                    by_date.entry(date).or_default().insert(cell, r);
                }
            }
            let market: BTreeMap<Date, f64> = self.aggregator.market_returns(&frame)?.into_iter().collect();
            for date in market.keys() {
                by_date.entry(*date).or_default();
            }

            let rows = by_date.into_iter().map(|(date, cells)| {
                let (smb, hml) = grid_factors(&cells);
                (date, FactorValues { rm: market.get(&date).copied(), smb, hml })
            });
            panel.extend(rows.collect());
        }
        Ok(panel)
    }

    /// Full construction from the return panel and the two sort panels.
    ///
    /// # Errors
    /// Returns `ModelError` on invalid sort configuration, a return panel
    /// without the needed columns, or a failed aggregation.
    pub fn construct(
        &self,
        returns: &DataFrame,
        size_panel: &SortPanel,
        value_panel: &SortPanel,
    ) -> Result<FactorPanel, ModelError> {
        self.aggregator.validate(returns)?;
        let sorts = &self.config.sorts;

        let panel = match self.config.construction {
            Construction::SimpleDivide => {
                let size_periods = holding_periods(sort_panel(&sorts.size_sort()?, size_panel));
                let value_periods = holding_periods(sort_panel(&sorts.value_sort()?, value_panel));
                info!(
                    size_periods = size_periods.len(),
                    value_periods = value_periods.len(),
                    weighting = ?self.config.weighting(),
                    "constructing factors by simple divide"
                );
                let size = self.size_factors(returns, &size_periods)?;
                let value = self.value_factors(returns, &value_periods)?;
                value.outer_join(size)
            }
            Construction::Grid2x3 => {
                let periods = holding_periods(sorts.grid_sort()?.assignments(size_panel, value_panel));
                info!(periods = periods.len(), weighting = ?self.config.weighting(), "constructing 2x3 factors");
                self.cell_factors(returns, &periods)?
            }
        };

        info!(dates = panel.len(), "factor panel built");
        Ok(panel)
    }
}

impl Default for FactorSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use famafrench_primitives::{BucketAssignment, ReturnObservation, Symbol};
    use famafrench_utils::returns_frame;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2020, 1, day).unwrap()
    }

    fn obs(symbol: &str, day: u32, ret: f64) -> ReturnObservation {
        ReturnObservation {
            symbol: Symbol::new(symbol),
            date: d(day),
            ret: Some(ret),
            total_shares: Some(10.0),
            free_float_shares: Some(10.0),
        }
    }

    fn period(groups: &[(Bucket, &[&str])]) -> HoldingPeriod {
        let mut a = BucketAssignment::new(d(2));
        for (bucket, names) in groups {
            a = a.with_group(*bucket, names.iter().map(|s| Symbol::new(*s)));
        }
        HoldingPeriod::new(d(2), d(10), a)
    }

    #[test]
    fn factor_config_defaults() {
        let config = FactorConfig::default();
        assert_eq!(config.construction, Construction::SimpleDivide);
        assert_eq!(config.weighting(), Weighting::Equal);
        assert_eq!(config.sorts.min_population, 100);
    }

    #[test]
    fn config_from_json() {
        let config: FactorConfig =
            serde_json::from_str(r#"{"construction": "grid2x3", "weighted": true, "share_basis": "total"}"#).unwrap();
        assert_eq!(config.construction, Construction::Grid2x3);
        assert_eq!(config.weighting(), Weighting::Capitalization(ShareBasis::Total));
    }

    #[test]
    fn grid_literal_example() {
        let cells: BTreeMap<Bucket, f64> = [
            (Bucket::SV, 0.02),
            (Bucket::SN, 0.01),
            (Bucket::SG, 0.03),
            (Bucket::BV, 0.00),
            (Bucket::BN, 0.01),
            (Bucket::BG, 0.02),
        ]
        .into_iter()
        .collect();
        let (smb, hml) = grid_factors(&cells);
        assert_relative_eq!(smb.unwrap(), 0.01, epsilon = 1e-12);
        assert_relative_eq!(hml.unwrap(), -0.015, epsilon = 1e-12);
    }

    #[test]
    fn grid_missing_cell_nulls_factor() {
        let cells: BTreeMap<Bucket, f64> =
            [(Bucket::SV, 0.02), (Bucket::SN, 0.01), (Bucket::SG, 0.03), (Bucket::BV, 0.0), (Bucket::BG, 0.02)]
                .into_iter()
                .collect();
        let (smb, hml) = grid_factors(&cells);
        assert_eq!(smb, None);
        assert_relative_eq!(hml.unwrap(), -0.015, epsilon = 1e-12);
    }

    #[test]
    fn long_short_outer_joins() {
        let out = long_short(&[(d(2), 0.03), (d(3), 0.01)], &[(d(2), 0.01), (d(6), 0.02)]);
        assert_relative_eq!(out[&d(2)].unwrap(), 0.02, epsilon = 1e-12);
        assert_eq!(out[&d(3)], None);
        assert_eq!(out[&d(6)], None);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn smb_is_antisymmetric() {
        let df = returns_frame(&[obs("A", 2, 0.03), obs("B", 2, 0.01), obs("A", 3, -0.01), obs("B", 3, 0.02)])
            .unwrap();
        let p = period(&[(Bucket::Small, &["A"]), (Bucket::Big, &["B"])]);
        let swapped = HoldingPeriod::new(p.start, p.end, p.assignment.clone().swapped(Bucket::Small, Bucket::Big));

        let synth = FactorSynthesizer::new();
        let a = synth.size_factors(&df, &[p]).unwrap();
        let b = synth.size_factors(&df, &[swapped]).unwrap();

        for date in [d(2), d(3)] {
            let x = a.get(date).unwrap().smb.unwrap();
            let y = b.get(date).unwrap().smb.unwrap();
            assert_relative_eq!(x, -y, epsilon = 1e-12);
        }
        assert_relative_eq!(a.get(d(2)).unwrap().smb.unwrap(), 0.02, epsilon = 1e-12);
        assert_relative_eq!(a.get(d(2)).unwrap().rm.unwrap(), 0.02, epsilon = 1e-12);
    }

    #[test]
    fn hml_is_antisymmetric() {
        let df = returns_frame(&[obs("V", 2, 0.04), obs("G", 2, 0.01)]).unwrap();
        let p = period(&[(Bucket::Value, &["V"]), (Bucket::Growth, &["G"])]);
        let swapped = HoldingPeriod::new(p.start, p.end, p.assignment.clone().swapped(Bucket::Value, Bucket::Growth));

        let synth = FactorSynthesizer::new();
        let a = synth.value_factors(&df, &[p]).unwrap().get(d(2)).unwrap().hml.unwrap();
        let b = synth.value_factors(&df, &[swapped]).unwrap().get(d(2)).unwrap().hml.unwrap();
        assert_relative_eq!(a, 0.03, epsilon = 1e-12);
        assert_relative_eq!(a, -b, epsilon = 1e-12);
    }

    #[test]
    fn grid_period_uses_cells_and_market() {
        let df = returns_frame(&[
            obs("sv", 2, 0.02),
            obs("sn", 2, 0.01),
            obs("sg", 2, 0.03),
            obs("bv", 2, 0.00),
            obs("bn", 2, 0.01),
            obs("bg", 2, 0.02),
        ])
        .unwrap();
        let p = period(&[
            (Bucket::SV, &["sv"]),
            (Bucket::SN, &["sn"]),
            (Bucket::SG, &["sg"]),
            (Bucket::BV, &["bv"]),
            (Bucket::BN, &["bn"]),
            (Bucket::BG, &["bg"]),
        ]);
        let config = FactorConfig { construction: Construction::Grid2x3, weighted: true, ..Default::default() };
        let panel = FactorSynthesizer::with_config(config).cell_factors(&df, &[p]).unwrap();

        let row = panel.get(d(2)).unwrap();
        assert_relative_eq!(row.smb.unwrap(), 0.01, epsilon = 1e-12);
        assert_relative_eq!(row.hml.unwrap(), -0.015, epsilon = 1e-12);
        assert_relative_eq!(row.rm.unwrap(), 0.09 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn weighted_with_equal_weights_matches_equal_mode() {
        let df = returns_frame(&[obs("A", 2, 0.03), obs("B", 2, 0.01), obs("C", 2, -0.02), obs("D", 2, 0.05)])
            .unwrap();
        let p = period(&[(Bucket::Small, &["A", "B"]), (Bucket::Big, &["C", "D"])]);

        let eq = FactorSynthesizer::new().size_factors(&df, std::slice::from_ref(&p)).unwrap();
        let cap = FactorSynthesizer::with_config(FactorConfig { weighted: true, ..Default::default() })
            .size_factors(&df, &[p])
            .unwrap();

        let (x, y) = (eq.get(d(2)).unwrap(), cap.get(d(2)).unwrap());
        assert_relative_eq!(x.smb.unwrap(), y.smb.unwrap(), epsilon = 1e-12);
        assert_relative_eq!(x.rm.unwrap(), y.rm.unwrap(), epsilon = 1e-12);
    }
}
