//! Exposure estimation trait definitions.

use ndarray::{Array1, Array2};

/// Errors that can occur during estimation.
#[derive(Debug, thiserror::Error)]
pub enum EstimatorError {
    /// Dimension mismatch in input data.
    #[error("dimension mismatch for {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
        /// Context description.
        context: String,
    },

    /// Insufficient data for estimation.
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations.
        required: usize,
        /// Actual number of observations.
        actual: usize,
    },

    /// A regressor column has no variation.
    #[error("regressor {0} has zero variance")]
    ZeroVariance(String),

    /// Singular or near-singular design matrix.
    #[error("singular design matrix: {0}")]
    Singular(String),

    /// NaN or infinite estimate.
    #[error("non-finite estimate for {0}")]
    NonFinite(String),
}

impl EstimatorError {
    /// Returns whether this error is recoverable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}

/// Fitted linear model with inference statistics.
#[derive(Debug, Clone)]
pub struct LinearFit {
    /// Term names, intercept first.
    pub names: Vec<String>,
    /// Coefficients.
    pub coefficients: Array1<f64>,
    /// Standard errors.
    pub std_errors: Array1<f64>,
    /// t-statistics.
    pub t_stats: Array1<f64>,
    /// Two-sided p-values.
    pub p_values: Array1<f64>,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// Number of observations.
    pub n_obs: usize,
}

/// Trait for estimating an entity's factor exposures from a time series.
pub trait ExposureEstimator: Send + Sync {
    /// Configuration type for this estimator.
    type Config: Default + Clone + Send + Sync;

    /// Create a new estimator with the given configuration.
    fn with_config(config: Self::Config) -> Self;

    /// Fit `y ~ const + x` for one entity.
    ///
    /// # Arguments
    /// * `y` - Entity returns (n_obs,)
    /// * `x` - Regressor matrix without intercept (n_obs x n_regressors)
    /// * `names` - Regressor names (n_regressors,)
    ///
    /// # Errors
    /// Returns `EstimatorError` if dimensions mismatch, the sample is too
    /// small or the design matrix cannot be inverted.
    fn estimate_single(
        &self,
        y: &Array1<f64>,
        x: &Array2<f64>,
        names: &[&str],
    ) -> Result<LinearFit, EstimatorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimator_error_is_recoverable() {
        let err = EstimatorError::InsufficientData { required: 100, actual: 5 };
        assert!(err.is_recoverable());

        let err = EstimatorError::ZeroVariance("SMB".to_string());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn estimator_error_display() {
        let err = EstimatorError::DimensionMismatch {
            expected: 100,
            actual: 50,
            context: "returns".to_string(),
        };
        assert_eq!(err.to_string(), "dimension mismatch for returns: expected 100, got 50");
        assert_eq!(
            EstimatorError::ZeroVariance("HML".into()).to_string(),
            "regressor HML has zero variance"
        );
    }
}
