//! Simple returns from price and NAV bars.

use std::collections::BTreeMap;

use famafrench_primitives::{Bar, ReturnObservation, ReturnSeries, Symbol};
use polars::prelude::*;

use crate::{UtilsError, dates::date_to_days};

fn simple_return(prev: f64, curr: f64) -> Option<f64> {
    let r = (curr - prev) / prev;
    (prev != 0.0 && r.is_finite()).then_some(r)
}

/// Bars in date order.
fn ordered(bars: &[Bar]) -> Vec<&Bar> {
    let mut sorted: Vec<&Bar> = bars.iter().collect();
    sorted.sort_by_key(|b| b.date);
    sorted
}

/// Return series of a single entity.
///
/// Bars are ordered by date first. The first point is always `None`; a point
/// is also `None` when the previous value is zero.
#[must_use]
pub fn simple_returns(bars: &[Bar]) -> ReturnSeries {
    let sorted = ordered(bars);
    let symbol = sorted.first().map(|b| b.symbol.clone());

    let mut points = Vec::with_capacity(sorted.len());
    let mut prev: Option<f64> = None;
    for bar in sorted {
        points.push((bar.date, prev.and_then(|p| simple_return(p, bar.value))));
        prev = Some(bar.value);
    }

    ReturnSeries::new(symbol, points)
}

/// Per-security return observations, carrying share counts for weighting.
///
/// Bars may mix securities; each security's first observation has a `None`
/// return. Output is ordered by symbol then date.
#[must_use]
pub fn return_observations(bars: &[Bar]) -> Vec<ReturnObservation> {
    let mut by_symbol: BTreeMap<&Symbol, Vec<&Bar>> = BTreeMap::new();
    for bar in bars {
        by_symbol.entry(&bar.symbol).or_default().push(bar);
    }

    let mut out = Vec::with_capacity(bars.len());
    for (_, mut group) in by_symbol {
        group.sort_by_key(|b| b.date);
        let mut prev: Option<f64> = None;
        for bar in group {
            out.push(ReturnObservation {
                symbol: bar.symbol.clone(),
                date: bar.date,
                ret: prev.and_then(|p| simple_return(p, bar.value)),
                total_shares: bar.total_shares,
                free_float_shares: bar.free_float_shares,
            });
            prev = Some(bar.value);
        }
    }
    out
}

/// Long frame `date, symbol, return, total_shares, free_float_shares`.
///
/// # Errors
/// Returns `UtilsError` if the frame cannot be built.
pub fn returns_frame(observations: &[ReturnObservation]) -> Result<DataFrame, UtilsError> {
    let days: Vec<i32> = observations.iter().map(|o| date_to_days(o.date)).collect();
    let symbols: Vec<&str> = observations.iter().map(|o| o.symbol.as_str()).collect();
    let rets: Vec<Option<f64>> = observations.iter().map(|o| o.ret).collect();
    let total: Vec<Option<f64>> = observations.iter().map(|o| o.total_shares).collect();
    let free: Vec<Option<f64>> = observations.iter().map(|o| o.free_float_shares).collect();

    let df = DataFrame::new(vec![
        Series::new("date".into(), days).cast(&DataType::Date)?.into(),
        Series::new("symbol".into(), symbols).into(),
        Series::new("return".into(), rets).into(),
        Series::new("total_shares".into(), total).into(),
        Series::new("free_float_shares".into(), free).into(),
    ])?;
    Ok(df)
}
