//! Error types for bucket sorts.

/// Errors that can occur while configuring or running bucket sorts.
#[derive(Debug, thiserror::Error)]
pub enum SortError {
    /// A split fraction outside `(0, 0.5]`.
    #[error("invalid fraction for {sort} sort: {fraction}")]
    InvalidFraction {
        /// Sort the fraction belongs to.
        sort: &'static str,
        /// Offending value.
        fraction: f64,
    },
}

impl SortError {
    /// Check if this error is recoverable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        false
    }
}
