//! Security identifiers and raw bar observations.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::Date;

/// Ticker or fund code, e.g. `000001.SZ`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    /// Create a new symbol.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// One price or NAV observation for one security on one trading date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Security identifier.
    pub symbol: Symbol,
    /// Trading date.
    pub date: Date,
    /// Close price or adjusted net asset value.
    pub value: f64,
    /// Total shares outstanding.
    pub total_shares: Option<f64>,
    /// Free-float shares.
    pub free_float_shares: Option<f64>,
}

impl Bar {
    /// Create a bar without share counts (funds, indices).
    #[must_use]
    pub const fn new(symbol: Symbol, date: Date, value: f64) -> Self {
        Self { symbol, date, value, total_shares: None, free_float_shares: None }
    }

    /// Attach share counts.
    #[must_use]
    pub const fn with_shares(mut self, total: Option<f64>, free_float: Option<f64>) -> Self {
        self.total_shares = total;
        self.free_float_shares = free_float;
        self
    }
}
