//! Generalized least squares exposure estimation.

use famafrench_math::{MathError, ZScore, generalized_least_squares};
use famafrench_primitives::INTERCEPT;
use famafrench_traits::{EstimatorError, ExposureEstimator, LinearFit};
use ndarray::{Array1, Array2, s};
use serde::Deserialize;
use tracing::debug;

/// Configuration for the GLS estimator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GlsConfig {
    /// Z-score each regressor over the sample before adding the intercept.
    pub normalize: bool,
    /// Log a coefficient table for every fit.
    pub print_summary: bool,
}

/// Fits `y ~ const + x` by GLS with identity covariance.
#[derive(Debug, Clone, Default)]
pub struct GlsExposureEstimator {
    config: GlsConfig,
}

impl GlsExposureEstimator {
    /// Create a new estimator with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(GlsConfig::default())
    }

    /// Get whether regressors are normalized.
    #[must_use]
    pub const fn normalize(&self) -> bool {
        self.config.normalize
    }
}

/// Prepend a column of ones.
fn add_constant(x: &Array2<f64>) -> Array2<f64> {
    let mut design = Array2::ones((x.nrows(), x.ncols() + 1));
    design.slice_mut(s![.., 1..]).assign(x);
    design
}

fn estimator_error(err: MathError, names: &[&str]) -> EstimatorError {
    match err {
        MathError::ZeroVariance { column } => {
            EstimatorError::ZeroVariance(names.get(column).map_or_else(|| column.to_string(), |n| (*n).to_string()))
        }
        MathError::Singular(msg) => EstimatorError::Singular(msg),
        MathError::Underdetermined { n_obs, n_params } => {
            EstimatorError::InsufficientData { required: n_params + 1, actual: n_obs }
        }
        MathError::EmptyData => EstimatorError::InsufficientData { required: 1, actual: 0 },
        MathError::DimensionMismatch { expected, actual } => {
            EstimatorError::DimensionMismatch { expected, actual, context: "design matrix".to_string() }
        }
        MathError::NumericalInstability(msg) => EstimatorError::NonFinite(msg),
    }
}

impl ExposureEstimator for GlsExposureEstimator {
    type Config = GlsConfig;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn estimate_single(
        &self,
        y: &Array1<f64>,
        x: &Array2<f64>,
        names: &[&str],
    ) -> Result<LinearFit, EstimatorError> {
        let n = y.len();

        // Validate dimensions
        if x.nrows() != n {
            return Err(EstimatorError::DimensionMismatch {
                expected: n,
                actual: x.nrows(),
                context: "regressors".to_string(),
            });
        }
        if names.len() != x.ncols() {
            return Err(EstimatorError::DimensionMismatch {
                expected: x.ncols(),
                actual: names.len(),
                context: "regressor names".to_string(),
            });
        }

        let regressors = if self.config.normalize {
            ZScore::new().apply_columns(x).map_err(|e| estimator_error(e, names))?
        } else {
            x.clone()
        };

        let fit = generalized_least_squares(y, &add_constant(&regressors))
            .map_err(|e| estimator_error(e, names))?;

        let all_names: Vec<String> =
            std::iter::once(INTERCEPT).chain(names.iter().copied()).map(str::to_string).collect();

        for (name, (b, se)) in all_names.iter().zip(fit.coefficients.iter().zip(&fit.std_errors)) {
            if !(b.is_finite() && se.is_finite()) {
                return Err(EstimatorError::NonFinite(name.clone()));
            }
        }

        if self.config.print_summary {
            debug!(n_obs = n, r_squared = fit.r_squared, df_resid = fit.df_resid, "GLS fit");
            for (j, name) in all_names.iter().enumerate() {
                debug!(
                    term = %name,
                    coef = fit.coefficients[j],
                    std_err = fit.std_errors[j],
                    t = fit.t_stats[j],
                    p = fit.p_values[j],
                );
            }
        }

        Ok(LinearFit {
            names: all_names,
            coefficients: fit.coefficients,
            std_errors: fit.std_errors,
            t_stats: fit.t_stats,
            p_values: fit.p_values,
            r_squared: fit.r_squared,
            n_obs: n,
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;

    fn sample(n: usize) -> (Array1<f64>, Array2<f64>) {
        let x = Array2::from_shape_fn((n, 2), |(i, j)| {
            let t = i as f64;
            if j == 0 { (0.7 * t).sin() * 0.02 } else { (1.3 * t).cos() * 0.01 }
        });
        let noise = Array1::from_shape_fn(n, |i| (3.1 * i as f64).sin() * 1e-4);
        let y = x.column(0).mapv(|v| 0.9 * v) + x.column(1).mapv(|v| -0.4 * v) + 0.0005 + noise;
        (y, x)
    }

    #[test]
    fn gls_config_defaults() {
        let config = GlsConfig::default();
        assert!(!config.normalize);
        assert!(!config.print_summary);
    }

    #[test]
    fn recovers_coefficients() {
        let (y, x) = sample(200);
        let fit = GlsExposureEstimator::new().estimate_single(&y, &x, &["Rm", "SMB"]).unwrap();

        assert_eq!(fit.names, vec!["const", "Rm", "SMB"]);
        assert_relative_eq!(fit.coefficients[0], 0.0005, epsilon = 1e-4);
        assert_relative_eq!(fit.coefficients[1], 0.9, epsilon = 1e-2);
        assert_relative_eq!(fit.coefficients[2], -0.4, epsilon = 1e-2);
        assert!(fit.p_values[1] < 1e-6);
        assert!(fit.r_squared > 0.99);
        assert_eq!(fit.n_obs, 200);
    }

    #[test]
    fn normalized_slopes_scale_by_std() {
        let (y, x) = sample(200);
        let raw = GlsExposureEstimator::new().estimate_single(&y, &x, &["Rm", "SMB"]).unwrap();
        let normalized = GlsExposureEstimator::with_config(GlsConfig { normalize: true, print_summary: true })
            .estimate_single(&y, &x, &["Rm", "SMB"])
            .unwrap();

        let std0 = x.column(0).std(0.0);
        assert_relative_eq!(normalized.coefficients[1], raw.coefficients[1] * std0, epsilon = 1e-10);
        // t-statistics of slopes are invariant under rescaling
        assert_relative_eq!(normalized.t_stats[1], raw.t_stats[1], epsilon = 1e-6);
        assert_relative_eq!(normalized.coefficients[0], y.mean().unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn zero_variance_fails_with_normalization() {
        let (y, mut x) = sample(150);
        x.column_mut(1).fill(0.003);
        let estimator = GlsExposureEstimator::with_config(GlsConfig { normalize: true, ..Default::default() });

        let err = estimator.estimate_single(&y, &x, &["Rm", "HML"]).unwrap_err();
        assert!(matches!(err, EstimatorError::ZeroVariance(name) if name == "HML"));
    }

    #[test]
    fn zero_variance_fails_without_normalization() {
        let (y, mut x) = sample(150);
        x.column_mut(1).fill(0.003);

        let err = GlsExposureEstimator::new().estimate_single(&y, &x, &["Rm", "HML"]).unwrap_err();
        assert!(matches!(err, EstimatorError::Singular(_)));
    }

    #[test]
    fn dimension_mismatch() {
        let y = array![0.01, 0.02, 0.015];
        let x = Array2::zeros((2, 1));
        let result = GlsExposureEstimator::new().estimate_single(&y, &x, &["Rm"]);
        assert!(matches!(result, Err(EstimatorError::DimensionMismatch { .. })));

        let x = Array2::zeros((3, 1));
        let result = GlsExposureEstimator::new().estimate_single(&y, &x, &["Rm", "SMB"]);
        assert!(matches!(result, Err(EstimatorError::DimensionMismatch { .. })));
    }

    #[test]
    fn too_few_rows_is_insufficient() {
        let y = array![0.01, 0.02];
        let x = array![[0.1, 0.2], [0.3, 0.1]];
        let result = GlsExposureEstimator::new().estimate_single(&y, &x, &["Rm", "SMB"]);
        assert!(matches!(result, Err(EstimatorError::InsufficientData { .. })));
    }
}
