//! Error types for mathematical operations.

/// Errors that can occur during mathematical operations.
#[derive(Debug, thiserror::Error)]
pub enum MathError {
    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// Fewer observations than parameters plus one.
    #[error("underdetermined system: {n_obs} observations for {n_params} parameters")]
    Underdetermined {
        /// Number of observations.
        n_obs: usize,
        /// Number of parameters.
        n_params: usize,
    },

    /// Singular or near-singular matrix.
    #[error("singular matrix: {0}")]
    Singular(String),

    /// A column has zero standard deviation.
    #[error("column {column} has zero variance")]
    ZeroVariance {
        /// Column index.
        column: usize,
    },

    /// Empty data.
    #[error("empty data provided")]
    EmptyData,

    /// Numerical instability (NaN or Inf).
    #[error("numerical instability: {0}")]
    NumericalInstability(String),
}
