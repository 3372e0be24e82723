//! Per-entity exposure regressions on the factor panel.

use famafrench_primitives::{
    Date, FactorPanel, RegressionResult, Regressor, ReturnSeries, Symbol, TermEstimate,
};
use famafrench_traits::{EstimatorError, ExposureEstimator, LinearFit};
use ndarray::{Array1, Array2};
use serde::Deserialize;

use crate::{EntityError, GlsConfig, GlsExposureEstimator};

/// Configuration for the exposure regressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegressionConfig {
    /// Z-score the regressors over each entity's sample.
    pub normalize: bool,
    /// Minimum joined observations per entity.
    pub min_observations: usize,
    /// Log a coefficient table per entity.
    pub print_summary: bool,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self { normalize: false, min_observations: 100, print_summary: false }
    }
}

impl RegressionConfig {
    /// Estimator part of the configuration.
    #[must_use]
    pub const fn gls(&self) -> GlsConfig {
        GlsConfig { normalize: self.normalize, print_summary: self.print_summary }
    }
}

/// Returns and regressors of one entity aligned on date.
#[derive(Debug, Clone)]
pub struct Sample {
    /// Dates kept after the join.
    pub dates: Vec<Date>,
    /// Entity returns.
    pub y: Array1<f64>,
    /// Regressors in [`Regressor::MODEL`] order.
    pub x: Array2<f64>,
}

impl Sample {
    /// Inner-join a return series with the factor panel.
    ///
    /// A date is kept when the entity has a finite return and every model
    /// regressor is present.
    #[must_use]
    pub fn join(series: &ReturnSeries, factors: &FactorPanel) -> Self {
        let mut dates = Vec::new();
        let mut y = Vec::new();
        let mut rows: Vec<f64> = Vec::new();

        for (date, ret) in series.defined() {
            if !ret.is_finite() {
                continue;
            }
            let Some(values) = factors.get(date) else { continue };
            let row: Option<Vec<f64>> = Regressor::MODEL.iter().map(|r| r.eval(values)).collect();
            if let Some(row) = row.filter(|r| r.iter().all(|v| v.is_finite())) {
                dates.push(date);
                y.push(ret);
                rows.extend(row);
            }
        }

        let n = y.len();
        let x = Array2::from_shape_vec((n, Regressor::MODEL.len()), rows)
            .unwrap_or_else(|_| Array2::zeros((0, Regressor::MODEL.len())));
        Self { dates, y: Array1::from_vec(y), x }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.y.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }
}

/// Regresses entity returns on `const, Rm, Rm2, HML, HML2, SMB, SMB2`.
#[derive(Debug, Clone)]
pub struct CrossSectionalRegressor<E = GlsExposureEstimator> {
    estimator: E,
    min_observations: usize,
}

impl CrossSectionalRegressor {
    /// Create a regressor with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegressionConfig::default())
    }

    /// Create a GLS regressor from a configuration.
    #[must_use]
    pub fn with_config(config: RegressionConfig) -> Self {
        Self::from_estimator(GlsExposureEstimator::with_config(config.gls()), config.min_observations)
    }
}

impl Default for CrossSectionalRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ExposureEstimator> CrossSectionalRegressor<E> {
    /// Wrap any exposure estimator.
    #[must_use]
    pub const fn from_estimator(estimator: E, min_observations: usize) -> Self {
        Self { estimator, min_observations }
    }

    /// Minimum joined observations per entity.
    #[must_use]
    pub const fn min_observations(&self) -> usize {
        self.min_observations
    }

    /// Fit one entity.
    ///
    /// # Errors
    /// - [`EntityError::MissingData`] when the series has no return at all
    /// - [`EntityError::InsufficientSample`] below `min_observations` joined rows
    /// - [`EntityError::FitFailure`] when the estimator fails
    pub fn regress(
        &self,
        symbol: &Symbol,
        series: &ReturnSeries,
        factors: &FactorPanel,
    ) -> Result<RegressionResult, EntityError> {
        if series.defined().next().is_none() {
            return Err(EntityError::MissingData { symbol: symbol.clone() });
        }

        let sample = Sample::join(series, factors);
        if sample.len() < self.min_observations {
            return Err(EntityError::InsufficientSample {
                symbol: symbol.clone(),
                required: self.min_observations,
                actual: sample.len(),
            });
        }

        let names: Vec<&str> = Regressor::MODEL.iter().map(Regressor::name).collect();
        let fit = self.estimator.estimate_single(&sample.y, &sample.x, &names).map_err(|e| match e {
            EstimatorError::InsufficientData { required, actual } => {
                EntityError::InsufficientSample { symbol: symbol.clone(), required, actual }
            }
            other => EntityError::FitFailure { symbol: symbol.clone(), reason: other.to_string() },
        })?;

        Ok(to_result(symbol, fit))
    }
}

fn to_result(symbol: &Symbol, fit: LinearFit) -> RegressionResult {
    let terms = fit
        .names
        .into_iter()
        .enumerate()
        .map(|(j, name)| TermEstimate {
            name,
            coefficient: fit.coefficients[j],
            t_stat: fit.t_stats[j],
            p_value: fit.p_values[j],
        })
        .collect();
    RegressionResult { symbol: symbol.clone(), n_obs: fit.n_obs, r_squared: fit.r_squared, terms }
}
