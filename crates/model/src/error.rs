//! Error types for factor construction and exposure regressions.

use famafrench_math::MathError;
use famafrench_primitives::Symbol;
use famafrench_sorts::SortError;
use famafrench_traits::EstimatorError;
use famafrench_utils::UtilsError;

/// Errors that abort a factor-construction or regression run.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Estimator error.
    #[error("estimator error: {0}")]
    Estimator(#[from] EstimatorError),

    /// Math error.
    #[error("math error: {0}")]
    Math(#[from] MathError),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Loading or writing data failed.
    #[error("data error: {0}")]
    Utils(#[from] UtilsError),

    /// Sort configuration error.
    #[error("sort error: {0}")]
    Sort(#[from] SortError),

    /// Missing required column.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// A run produced no rows.
    #[error("no data: {0}")]
    NoData(String),
}

impl ModelError {
    /// Returns whether this error is recoverable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::NoData(_))
    }
}

/// Failure of one entity in a regression batch. The batch continues.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EntityError {
    /// No observation in the requested range.
    #[error("{symbol}: no data in period")]
    MissingData {
        /// Entity.
        symbol: Symbol,
    },

    /// Fewer joined observations than required.
    #[error("{symbol}: {actual} observations, need at least {required}")]
    InsufficientSample {
        /// Entity.
        symbol: Symbol,
        /// Required observations.
        required: usize,
        /// Observations available after the join.
        actual: usize,
    },

    /// The model could not be fitted.
    #[error("{symbol}: fit failed: {reason}")]
    FitFailure {
        /// Entity.
        symbol: Symbol,
        /// Solver message.
        reason: String,
    },
}

impl EntityError {
    /// Entity the error belongs to.
    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        match self {
            Self::MissingData { symbol }
            | Self::InsufficientSample { symbol, .. }
            | Self::FitFailure { symbol, .. } => symbol,
        }
    }

    /// Short category used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MissingData { .. } => "missing_data",
            Self::InsufficientSample { .. } => "insufficient_sample",
            Self::FitFailure { .. } => "fit_failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ModelError::MissingColumn("returns".to_string());
        assert!(err.to_string().contains("returns"));
    }

    #[test]
    fn error_is_recoverable() {
        let err = ModelError::NoData("factor panel".to_string());
        assert!(err.is_recoverable());

        let err = ModelError::MissingColumn("test".to_string());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn entity_error_symbol_and_kind() {
        let err = EntityError::InsufficientSample { symbol: Symbol::new("F1"), required: 100, actual: 12 };
        assert_eq!(err.symbol().as_str(), "F1");
        assert_eq!(err.kind(), "insufficient_sample");
        assert_eq!(err.to_string(), "F1: 12 observations, need at least 100");

        let err = EntityError::FitFailure { symbol: Symbol::new("F2"), reason: "singular".into() };
        assert!(err.to_string().contains("singular"));
    }
}
