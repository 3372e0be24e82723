//! Error types for data utilities.

/// Errors that can occur while loading, converting or writing panels.
#[derive(Debug, thiserror::Error)]
pub enum UtilsError {
    /// Polars error.
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Missing column.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// Date text that matches none of the accepted formats.
    #[error("invalid date: {0:?}")]
    InvalidDate(String),

    /// Invalid parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

impl UtilsError {
    /// Whether the run can continue past this error.
    ///
    /// Schema and I/O problems abort a run; only a bad parameter at a call
    /// site that can pick another is worth retrying.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::InvalidParameter(_))
    }
}
