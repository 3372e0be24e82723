//! CSV loaders and writers for bars, sort panels, returns, factors and
//! regression results.
//!
//! Every input file is read with all columns as text so that identifiers with
//! leading zeros survive; numeric columns are cast afterwards and dates go
//! through [`DateParser`].

use std::{fs::File, path::Path};

use famafrench_primitives::{
    Bar, Date, Factor, FactorPanel, FactorValues, RegressionResult, ReturnObservation, SortPanel,
    Symbol,
};
use polars::prelude::*;

use crate::{
    UtilsError,
    dates::{DateParser, DateRange, date_stamp},
};

/// Read a headed CSV file with every column as text.
///
/// # Errors
/// Returns `UtilsError` if the file cannot be opened or parsed.
pub fn read_csv(path: &Path) -> Result<DataFrame, UtilsError> {
    if !path.exists() {
        return Err(UtilsError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        )));
    }
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, UtilsError> {
    df.column(name).map_err(|_| UtilsError::MissingColumn(name.to_string()))
}

/// Text cells of a column.
///
/// # Errors
/// Returns [`UtilsError::MissingColumn`] if absent.
pub fn text_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, UtilsError> {
    let cast = column(df, name)?.cast(&DataType::String)?;
    Ok(cast.str()?.into_iter().map(|s| s.map(str::to_string)).collect())
}

/// Numeric cells of a column; empty and unparseable text become `None`.
///
/// # Errors
/// Returns [`UtilsError::MissingColumn`] if absent.
pub fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, UtilsError> {
    let cast = column(df, name)?.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().collect())
}

/// Date cells of a column.
///
/// # Errors
/// Returns [`UtilsError::InvalidDate`] on the first empty or unparseable cell.
pub fn date_values(df: &DataFrame, name: &str) -> Result<Vec<Date>, UtilsError> {
    text_values(df, name)?
        .into_iter()
        .map(|s| DateParser::parse(s.as_deref().unwrap_or_default()))
        .collect()
}

/// Numeric column if present, all `None` otherwise.
fn optional_floats(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, UtilsError> {
    if df.get_column_names().iter().any(|c| c.as_str() == name) {
        float_values(df, name)
    } else {
        Ok(vec![None; df.height()])
    }
}

fn symbols(df: &DataFrame) -> Result<Vec<Symbol>, UtilsError> {
    text_values(df, "symbol")?
        .into_iter()
        .map(|s| s.map(Symbol::new).ok_or_else(|| UtilsError::InvalidParameter("empty symbol".into())))
        .collect()
}

/// Load bars `date, symbol, <value_column>[, total_shares, free_float_shares]`.
///
/// Rows outside `range` or with a missing value are dropped.
///
/// # Errors
/// Returns `UtilsError` on I/O, missing columns or bad dates.
pub fn load_bars(path: &Path, value_column: &str, range: DateRange) -> Result<Vec<Bar>, UtilsError> {
    let df = read_csv(path)?;
    let dates = date_values(&df, "date")?;
    let symbols = symbols(&df)?;
    let values = float_values(&df, value_column)?;
    let total = optional_floats(&df, "total_shares")?;
    let free = optional_floats(&df, "free_float_shares")?;

    let bars = dates
        .into_iter()
        .zip(symbols)
        .zip(values)
        .zip(total.into_iter().zip(free))
        .filter(|(((date, _), value), _)| range.contains(*date) && value.is_some_and(f64::is_finite))
        .filter_map(|(((date, symbol), value), (total, free))| {
            value.map(|v| Bar::new(symbol, date, v).with_shares(total, free))
        })
        .collect();
    Ok(bars)
}

/// Load a sort panel `symbol, date, value`, restricted to `range`.
///
/// # Errors
/// Returns `UtilsError` on I/O, missing columns or bad dates.
pub fn load_sort_panel(path: &Path, range: DateRange) -> Result<SortPanel, UtilsError> {
    let df = read_csv(path)?;
    let dates = date_values(&df, "date")?;
    let symbols = symbols(&df)?;
    let values = float_values(&df, "value")?;

    Ok(SortPanel::from_observations(
        symbols
            .into_iter()
            .zip(dates)
            .zip(values)
            .filter(|((_, date), _)| range.contains(*date))
            .map(|((symbol, date), value)| (symbol, date, value)),
    ))
}

/// Load precomputed returns `date, symbol, return, total_shares, free_float_shares`.
///
/// # Errors
/// Returns `UtilsError` on I/O, missing columns or bad dates.
pub fn load_stock_returns(
    path: &Path,
    range: DateRange,
) -> Result<Vec<ReturnObservation>, UtilsError> {
    let df = read_csv(path)?;
    let dates = date_values(&df, "date")?;
    let symbols = symbols(&df)?;
    let rets = float_values(&df, "return")?;
    let total = optional_floats(&df, "total_shares")?;
    let free = optional_floats(&df, "free_float_shares")?;

    Ok(dates
        .into_iter()
        .zip(symbols)
        .zip(rets)
        .zip(total.into_iter().zip(free))
        .filter(|(((date, _), _), _)| range.contains(*date))
        .map(|(((date, symbol), ret), (total_shares, free_float_shares))| ReturnObservation {
            symbol,
            date,
            ret,
            total_shares,
            free_float_shares,
        })
        .collect())
}

fn iso(date: Date) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn write_frame(path: &Path, df: &mut DataFrame) -> Result<(), UtilsError> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;
    Ok(())
}

/// File name of the stock-return step's output.
#[must_use]
pub fn stock_returns_file_name(range: &DateRange) -> String {
    format!("stock_data{}to{}.csv", date_stamp(range.start), date_stamp(range.end))
}

/// Write return observations `date, symbol, return, total_shares, free_float_shares`.
///
/// # Errors
/// Returns `UtilsError` on I/O failure.
pub fn write_stock_returns(path: &Path, observations: &[ReturnObservation]) -> Result<(), UtilsError> {
    let mut df = DataFrame::new(vec![
        Column::new("date".into(), observations.iter().map(|o| iso(o.date)).collect::<Vec<_>>()),
        Column::new("symbol".into(), observations.iter().map(|o| o.symbol.as_str()).collect::<Vec<_>>()),
        Column::new("return".into(), observations.iter().map(|o| o.ret).collect::<Vec<_>>()),
        Column::new("total_shares".into(), observations.iter().map(|o| o.total_shares).collect::<Vec<_>>()),
        Column::new(
            "free_float_shares".into(),
            observations.iter().map(|o| o.free_float_shares).collect::<Vec<_>>(),
        ),
    ])?;
    write_frame(path, &mut df)
}

/// Write a factor panel `date, Rm, Rm2, SMB, SMB2, HML, HML2`.
///
/// A factor with no value on any date is left out together with its square.
///
/// # Errors
/// Returns `UtilsError` on I/O failure.
pub fn write_factor_panel(path: &Path, panel: &FactorPanel) -> Result<(), UtilsError> {
    let mut columns =
        vec![Column::new("date".into(), panel.dates().map(iso).collect::<Vec<_>>())];

    for factor in Factor::ALL.into_iter().filter(|f| panel.has(*f)) {
        let values: Vec<Option<f64>> = panel.iter().map(|(_, row)| row.get(factor)).collect();
        let squares: Vec<Option<f64>> = values.iter().map(|v| v.map(|x| x * x)).collect();
        columns.push(Column::new(factor.name().into(), values));
        columns.push(Column::new(factor.squared_name().into(), squares));
    }

    let mut df = DataFrame::new(columns)?;
    write_frame(path, &mut df)
}

/// Read a factor panel written by [`write_factor_panel`] or downloaded in the
/// same layout (`date` plus any of `Rm, SMB, HML`).
///
/// Squared columns are ignored; squares are derived from the factors.
///
/// # Errors
/// Returns `UtilsError` on I/O failure, bad dates or no factor column.
pub fn read_factor_panel(path: &Path) -> Result<FactorPanel, UtilsError> {
    let df = read_csv(path)?;
    let dates = date_values(&df, "date")?;
    let names = df.get_column_names();

    let present: Vec<Factor> =
        Factor::ALL.into_iter().filter(|f| names.iter().any(|c| c.as_str() == f.name())).collect();
    if present.is_empty() {
        return Err(UtilsError::MissingColumn("Rm | SMB | HML".to_string()));
    }

    let mut rows: Vec<FactorValues> = vec![FactorValues::default(); dates.len()];
    for factor in present {
        for (row, value) in rows.iter_mut().zip(float_values(&df, factor.name())?) {
            row.set(factor, value.filter(|v| v.is_finite()));
        }
    }

    Ok(dates.into_iter().zip(rows).collect())
}

/// Write regression rows sorted by symbol:
/// `symbol, const, Rm, ..., const_t, ..., const_p, ...`.
///
/// The column set is taken from the first row; rows are expected to share it.
///
/// # Errors
/// Returns `UtilsError` on I/O failure or mismatched row layouts.
pub fn write_regression_results(path: &Path, results: &[RegressionResult]) -> Result<(), UtilsError> {
    let mut sorted: Vec<&RegressionResult> = results.iter().collect();
    sorted.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    let names = sorted.first().map(|r| r.column_names()).unwrap_or_default();
    let mut values: Vec<Vec<f64>> = vec![Vec::with_capacity(sorted.len()); names.len()];
    for result in &sorted {
        let row = result.values();
        if row.len() != names.len() {
            return Err(UtilsError::InvalidParameter(format!(
                "{} has {} values, expected {}",
                result.symbol,
                row.len(),
                names.len()
            )));
        }
        for (col, v) in values.iter_mut().zip(row) {
            col.push(v);
        }
    }

    let mut columns =
        vec![Column::new("symbol".into(), sorted.iter().map(|r| r.symbol.as_str()).collect::<Vec<_>>())];
    columns.extend(names.iter().zip(values).map(|(name, col)| Column::new(name.as_str().into(), col)));

    let mut df = DataFrame::new(columns)?;
    write_frame(path, &mut df)
}
