//! Group returns over holding periods.

use std::collections::BTreeSet;

use famafrench_primitives::{Date, Symbol, Weighting};
use famafrench_utils::{date_to_days, days_to_date};
use polars::prelude::*;

use crate::ModelError;

const RETURN_COLUMNS: [&str; 3] = ["date", "symbol", "return"];

/// Combines member returns into one return per date.
///
/// Works on the long return panel `date, symbol, return, total_shares,
/// free_float_shares` (see `famafrench_utils::returns_frame`).
///
/// - Equal: mean of member returns present on the date.
/// - Capitalization: `sum(w * r) / sum(w)` with shares as `w`.
///
/// A member is present when its return is non-null and, when weighted, its
/// weight is non-null. Dates without members, and weighted dates whose
/// weights sum to zero, produce no observation.
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupReturnAggregator {
    weighting: Weighting,
}

impl GroupReturnAggregator {
    /// Create an aggregator with the given weighting policy.
    #[must_use]
    pub const fn new(weighting: Weighting) -> Self {
        Self { weighting }
    }

    /// Get the weighting policy.
    #[must_use]
    pub const fn weighting(&self) -> Weighting {
        self.weighting
    }

    /// Check that a return panel carries the columns this policy needs.
    ///
    /// # Errors
    /// Returns [`ModelError::MissingColumn`] for the first absent column.
    pub fn validate(&self, panel: &DataFrame) -> Result<(), ModelError> {
        let weight = match self.weighting {
            Weighting::Equal => None,
            Weighting::Capitalization(basis) => Some(basis.column()),
        };
        let names = panel.get_column_names();
        for required in RETURN_COLUMNS.into_iter().chain(weight) {
            if !names.iter().any(|c| c.as_str() == required) {
                return Err(ModelError::MissingColumn(required.to_string()));
            }
        }
        Ok(())
    }

    /// Rows of the panel with `start <= date < end`.
    ///
    /// # Errors
    /// Returns `ModelError` if the filter fails.
    pub fn period_frame(&self, panel: &DataFrame, start: Date, end: Date) -> Result<DataFrame, ModelError> {
        let df = panel
            .clone()
            .lazy()
            .filter(
                col("date")
                    .gt_eq(lit(date_to_days(start)).cast(DataType::Date))
                    .and(col("date").lt(lit(date_to_days(end)).cast(DataType::Date))),
            )
            .collect()?;
        Ok(df)
    }

    /// Return per date of the given members, or of every row when `members`
    /// is `None` (the market group).
    ///
    /// # Errors
    /// Returns `ModelError` on missing columns or a failed aggregation.
    pub fn group_returns(
        &self,
        frame: &DataFrame,
        members: Option<&BTreeSet<Symbol>>,
    ) -> Result<Vec<(Date, f64)>, ModelError> {
        let mut lf = frame.clone().lazy();
        if let Some(members) = members {
            if members.is_empty() {
                return Ok(Vec::new());
            }
            let names: Vec<&str> = members.iter().map(Symbol::as_str).collect();
            let members_df = DataFrame::new(vec![Column::new("symbol".into(), names)])?;
            lf = lf.join(
                members_df.lazy(),
                [col("symbol")],
                [col("symbol")],
                JoinArgs::new(JoinType::Inner),
            );
        }
        lf = lf.filter(col("return").is_not_null());

        let grouped = match self.weighting {
            Weighting::Equal => {
                lf.group_by([col("date")]).agg([col("return").mean().alias("group_return")])
            }
            Weighting::Capitalization(basis) => {
                let w = basis.column();
                lf.filter(col(w).is_not_null())
                    .group_by([col("date")])
                    .agg([
                        (col("return") * col(w)).sum().alias("weighted_sum"),
                        col(w).sum().alias("weight_sum"),
                    ])
                    .filter(col("weight_sum").neq(lit(0.0)))
                    .select([col("date"), (col("weighted_sum") / col("weight_sum")).alias("group_return")])
            }
        };
        let df = grouped.sort(["date"], Default::default()).collect()?;

        let days = df.column("date")?.cast(&DataType::Int32)?;
        let values = df.column("group_return")?;
        let out = days
            .i32()?
            .into_iter()
            .zip(values.f64()?)
            .filter_map(|(d, v)| Some((days_to_date(d?), v.filter(|v| v.is_finite())?)))
            .collect();
        Ok(out)
    }

    /// Market return per date: every security in the frame.
    ///
    /// # Errors
    /// See [`Self::group_returns`].
    pub fn market_returns(&self, frame: &DataFrame) -> Result<Vec<(Date, f64)>, ModelError> {
        self.group_returns(frame, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use famafrench_primitives::{ReturnObservation, ShareBasis};
    use famafrench_utils::returns_frame;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2020, 1, day).unwrap()
    }

    fn obs(symbol: &str, day: u32, ret: Option<f64>, free: Option<f64>) -> ReturnObservation {
        ReturnObservation {
            symbol: Symbol::new(symbol),
            date: d(day),
            ret,
            total_shares: free.map(|f| f * 2.0),
            free_float_shares: free,
        }
    }

    fn members(names: &[&str]) -> BTreeSet<Symbol> {
        names.iter().map(|s| Symbol::new(*s)).collect()
    }

    fn panel() -> DataFrame {
        returns_frame(&[
            obs("A", 2, Some(0.01), Some(100.0)),
            obs("B", 2, Some(0.03), Some(300.0)),
            obs("C", 2, Some(-0.02), Some(100.0)),
            obs("A", 3, Some(0.02), Some(100.0)),
            obs("B", 3, None, Some(300.0)),
            obs("C", 3, Some(0.00), None),
            obs("A", 6, Some(0.05), Some(100.0)),
        ])
        .unwrap()
    }

    #[test]
    fn equal_weighted_mean() {
        let agg = GroupReturnAggregator::new(Weighting::Equal);
        let out = agg.group_returns(&panel(), Some(&members(&["A", "B"]))).unwrap();

        assert_eq!(out.len(), 3);
        assert_relative_eq!(out[0].1, 0.02, epsilon = 1e-12);
        // B has no return on day 3
        assert_relative_eq!(out[1].1, 0.02, epsilon = 1e-12);
        assert_eq!(out[2].0, d(6));
    }

    #[test]
    fn cap_weighted_mean_skips_null_weights() {
        let agg = GroupReturnAggregator::new(Weighting::Capitalization(ShareBasis::FreeFloat));
        let out = agg.group_returns(&panel(), Some(&members(&["A", "B", "C"]))).unwrap();

        // (100*0.01 + 300*0.03 + 100*-0.02) / 500
        assert_relative_eq!(out[0].1, 0.016, epsilon = 1e-12);
        // only A qualifies on day 3
        assert_relative_eq!(out[1].1, 0.02, epsilon = 1e-12);
    }

    #[test]
    fn equal_weights_match_equal_mode() {
        let df = returns_frame(&[
            obs("A", 2, Some(0.01), Some(5.0)),
            obs("B", 2, Some(0.04), Some(5.0)),
            obs("C", 2, Some(-0.02), Some(5.0)),
        ])
        .unwrap();
        let eq = GroupReturnAggregator::new(Weighting::Equal).market_returns(&df).unwrap();
        let cap = GroupReturnAggregator::new(Weighting::Capitalization(ShareBasis::Total))
            .market_returns(&df)
            .unwrap();
        assert_relative_eq!(eq[0].1, cap[0].1, epsilon = 1e-12);
    }

    #[test]
    fn zero_weight_date_dropped() {
        let df = returns_frame(&[obs("A", 2, Some(0.01), Some(0.0)), obs("A", 3, Some(0.01), Some(1.0))])
            .unwrap();
        let out = GroupReturnAggregator::new(Weighting::Capitalization(ShareBasis::FreeFloat))
            .market_returns(&df)
            .unwrap();
        assert_eq!(out, vec![(d(3), 0.01)]);
    }

    #[test]
    fn period_is_half_open() {
        let agg = GroupReturnAggregator::default();
        let frame = agg.period_frame(&panel(), d(2), d(6)).unwrap();
        let out = agg.market_returns(&frame).unwrap();
        assert_eq!(out.iter().map(|(d, _)| *d).collect::<Vec<_>>(), vec![d(2), d(3)]);
    }

    #[test]
    fn empty_members_give_no_rows() {
        let out = GroupReturnAggregator::default().group_returns(&panel(), Some(&BTreeSet::new())).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn validate_reports_weight_column() {
        let df = panel().drop("free_float_shares").unwrap();
        let agg = GroupReturnAggregator::new(Weighting::Capitalization(ShareBasis::FreeFloat));
        assert!(matches!(agg.validate(&df), Err(ModelError::MissingColumn(c)) if c == "free_float_shares"));
        assert!(GroupReturnAggregator::default().validate(&df).is_ok());
    }
}
