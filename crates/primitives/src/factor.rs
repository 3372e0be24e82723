//! Factor panel type definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Date;

/// One of the three constructed factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Factor {
    /// Market return.
    Rm,
    /// Small minus big.
    Smb,
    /// High minus low (value minus growth).
    Hml,
}

impl Factor {
    /// All factors in panel column order.
    pub const ALL: [Self; 3] = [Self::Rm, Self::Smb, Self::Hml];

    /// Column name of the factor.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Rm => "Rm",
            Self::Smb => "SMB",
            Self::Hml => "HML",
        }
    }

    /// Column name of the squared factor.
    #[must_use]
    pub const fn squared_name(&self) -> &'static str {
        match self {
            Self::Rm => "Rm2",
            Self::Smb => "SMB2",
            Self::Hml => "HML2",
        }
    }
}

/// Regressor of the timing model: each factor and its square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Regressor {
    /// Underlying factor.
    pub factor: Factor,
    /// Whether the factor enters squared.
    pub squared: bool,
}

impl Regressor {
    /// Regressors in model order: `Rm, Rm2, HML, HML2, SMB, SMB2`.
    pub const MODEL: [Self; 6] = [
        Self::linear(Factor::Rm),
        Self::square(Factor::Rm),
        Self::linear(Factor::Hml),
        Self::square(Factor::Hml),
        Self::linear(Factor::Smb),
        Self::square(Factor::Smb),
    ];

    /// The factor itself.
    #[must_use]
    pub const fn linear(factor: Factor) -> Self {
        Self { factor, squared: false }
    }

    /// The squared factor.
    #[must_use]
    pub const fn square(factor: Factor) -> Self {
        Self { factor, squared: true }
    }

    /// Column name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        if self.squared { self.factor.squared_name() } else { self.factor.name() }
    }

    /// Evaluate on a factor row.
    #[must_use]
    pub fn eval(&self, row: &FactorValues) -> Option<f64> {
        row.get(self.factor).map(|v| if self.squared { v * v } else { v })
    }
}

/// Factor values on one date. Any factor may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorValues {
    /// Market return.
    pub rm: Option<f64>,
    /// Small minus big.
    pub smb: Option<f64>,
    /// High minus low.
    pub hml: Option<f64>,
}

impl FactorValues {
    /// Value of a factor.
    #[must_use]
    pub const fn get(&self, factor: Factor) -> Option<f64> {
        match factor {
            Factor::Rm => self.rm,
            Factor::Smb => self.smb,
            Factor::Hml => self.hml,
        }
    }

    /// Set a factor value.
    pub const fn set(&mut self, factor: Factor, value: Option<f64>) {
        match factor {
            Factor::Rm => self.rm = value,
            Factor::Smb => self.smb = value,
            Factor::Hml => self.hml = value,
        }
    }

    /// Fill missing fields from `other`.
    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        Self {
            rm: if self.rm.is_some() { self.rm } else { other.rm },
            smb: if self.smb.is_some() { self.smb } else { other.smb },
            hml: if self.hml.is_some() { self.hml } else { other.hml },
        }
    }

    /// Whether every factor is present.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.rm.is_some() && self.smb.is_some() && self.hml.is_some()
    }
}

/// Date-indexed factor panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorPanel {
    rows: BTreeMap<Date, FactorValues>,
}

impl FactorPanel {
    /// Create an empty panel.
    #[must_use]
    pub const fn new() -> Self {
        Self { rows: BTreeMap::new() }
    }

    /// Build a panel with one factor from `(date, value)` pairs.
    #[must_use]
    pub fn from_series(factor: Factor, series: impl IntoIterator<Item = (Date, Option<f64>)>) -> Self {
        let mut panel = Self::new();
        for (date, value) in series {
            panel.set(date, factor, value);
        }
        panel
    }

    /// Set one factor on one date, creating the row if needed.
    pub fn set(&mut self, date: Date, factor: Factor, value: Option<f64>) {
        self.rows.entry(date).or_default().set(factor, value);
    }

    /// Insert a full row, replacing any existing row.
    pub fn insert(&mut self, date: Date, values: FactorValues) {
        self.rows.insert(date, values);
    }

    /// Outer join by date: union of dates, values of `self` take precedence
    /// and gaps are filled from `other`.
    #[must_use]
    pub fn outer_join(mut self, other: Self) -> Self {
        for (date, values) in other.rows {
            let merged = self.rows.get(&date).map_or(values, |mine| mine.or(values));
            self.rows.insert(date, merged);
        }
        self
    }

    /// Inner join by date: keep dates present in both; values of `self` take
    /// precedence.
    #[must_use]
    pub fn inner_join(self, other: &Self) -> Self {
        let rows = self
            .rows
            .into_iter()
            .filter_map(|(date, mine)| other.rows.get(&date).map(|theirs| (date, mine.or(*theirs))))
            .collect();
        Self { rows }
    }

    /// Append rows of a later period; existing dates are kept.
    pub fn extend(&mut self, other: Self) {
        for (date, values) in other.rows {
            self.rows.entry(date).or_insert(values);
        }
    }

    /// Drop one factor from every row.
    #[must_use]
    pub fn without(mut self, factor: Factor) -> Self {
        for values in self.rows.values_mut() {
            values.set(factor, None);
        }
        self
    }

    /// Row for a date.
    #[must_use]
    pub fn get(&self, date: Date) -> Option<&FactorValues> {
        self.rows.get(&date)
    }

    /// Iterate over rows in date order.
    pub fn iter(&self) -> impl Iterator<Item = (&Date, &FactorValues)> {
        self.rows.iter()
    }

    /// Dates in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = Date> + '_ {
        self.rows.keys().copied()
    }

    /// Whether any row carries a value for the factor.
    #[must_use]
    pub fn has(&self, factor: Factor) -> bool {
        self.rows.values().any(|v| v.get(factor).is_some())
    }

    /// Number of dates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<(Date, FactorValues)> for FactorPanel {
    fn from_iter<T: IntoIterator<Item = (Date, FactorValues)>>(iter: T) -> Self {
        Self { rows: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2021, 6, day).unwrap()
    }

    #[test]
    fn regressor_names_in_model_order() {
        let names: Vec<&str> = Regressor::MODEL.iter().map(Regressor::name).collect();
        assert_eq!(names, vec!["Rm", "Rm2", "HML", "HML2", "SMB", "SMB2"]);
    }

    #[test]
    fn regressor_eval_squares() {
        let row = FactorValues { rm: Some(0.02), smb: Some(-0.1), hml: None };
        assert_eq!(Regressor::linear(Factor::Smb).eval(&row), Some(-0.1));
        assert!((Regressor::square(Factor::Rm).eval(&row).unwrap() - 0.0004).abs() < 1e-15);
        assert_eq!(Regressor::square(Factor::Hml).eval(&row), None);
    }

    #[test]
    fn outer_join_unions_dates() {
        let smb = FactorPanel::from_series(Factor::Smb, [(d(1), Some(0.1)), (d(2), Some(0.2))]);
        let hml = FactorPanel::from_series(Factor::Hml, [(d(2), Some(-0.1)), (d(3), Some(0.3))]);

        let joined = hml.outer_join(smb);

        assert_eq!(joined.len(), 3);
        assert_eq!(joined.get(d(1)).unwrap().hml, None);
        assert_eq!(joined.get(d(1)).unwrap().smb, Some(0.1));
        assert_eq!(joined.get(d(2)).unwrap().hml, Some(-0.1));
        assert_eq!(joined.get(d(2)).unwrap().smb, Some(0.2));
        assert_eq!(joined.get(d(3)).unwrap().smb, None);
    }

    #[test]
    fn inner_join_intersects_dates() {
        let rm = FactorPanel::from_series(Factor::Rm, [(d(1), Some(0.01)), (d(2), Some(0.02))]);
        let smb = FactorPanel::from_series(Factor::Smb, [(d(2), Some(0.2)), (d(3), Some(0.3))]);

        let joined = rm.inner_join(&smb);

        assert_eq!(joined.dates().collect::<Vec<_>>(), vec![d(2)]);
        assert!(joined.has(Factor::Rm) && joined.has(Factor::Smb));
        assert!(!joined.has(Factor::Hml));
    }

    #[test]
    fn extend_keeps_first_period() {
        let mut a = FactorPanel::from_series(Factor::Smb, [(d(1), Some(0.1))]);
        a.extend(FactorPanel::from_series(Factor::Smb, [(d(1), Some(9.0)), (d(2), Some(0.2))]));
        assert_eq!(a.get(d(1)).unwrap().smb, Some(0.1));
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn without_clears_factor() {
        let panel = FactorPanel::from_series(Factor::Rm, [(d(1), Some(0.01))]).without(Factor::Rm);
        assert!(!panel.has(Factor::Rm));
        assert_eq!(panel.len(), 1);
    }
}
