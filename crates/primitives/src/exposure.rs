//! Regression output type definitions.

use serde::{Deserialize, Serialize};

use crate::Symbol;

/// Name of the intercept term.
pub const INTERCEPT: &str = "const";

/// Estimate for one model term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermEstimate {
    /// Term name (`const`, `Rm`, `Rm2`, ...).
    pub name: String,
    /// Fitted coefficient.
    pub coefficient: f64,
    /// t-statistic.
    pub t_stat: f64,
    /// Two-sided p-value.
    pub p_value: f64,
}

/// Fitted factor exposures of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    /// Entity the model was fitted for.
    pub symbol: Symbol,
    /// Number of observations used in the fit.
    pub n_obs: usize,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// Terms in model order, intercept first.
    pub terms: Vec<TermEstimate>,
}

impl RegressionResult {
    /// Look up a term by name.
    #[must_use]
    pub fn term(&self, name: &str) -> Option<&TermEstimate> {
        self.terms.iter().find(|t| t.name == name)
    }

    /// Coefficient of a term.
    #[must_use]
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.term(name).map(|t| t.coefficient)
    }

    /// Output column names: coefficients, then `_t`, then `_p` variants.
    #[must_use]
    pub fn column_names(&self) -> Vec<String> {
        let names = self.terms.iter().map(|t| t.name.clone());
        let t_names = self.terms.iter().map(|t| format!("{}_t", t.name));
        let p_names = self.terms.iter().map(|t| format!("{}_p", t.name));
        names.chain(t_names).chain(p_names).collect()
    }

    /// Values matching [`Self::column_names`].
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        let coefs = self.terms.iter().map(|t| t.coefficient);
        let ts = self.terms.iter().map(|t| t.t_stat);
        let ps = self.terms.iter().map(|t| t.p_value);
        coefs.chain(ts).chain(ps).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RegressionResult {
        RegressionResult {
            symbol: Symbol::new("F1"),
            n_obs: 120,
            r_squared: 0.8,
            terms: vec![
                TermEstimate { name: INTERCEPT.into(), coefficient: 0.001, t_stat: 1.2, p_value: 0.23 },
                TermEstimate { name: "Rm".into(), coefficient: 0.9, t_stat: 15.0, p_value: 0.0 },
            ],
        }
    }

    #[test]
    fn term_lookup() {
        let res = sample();
        assert_eq!(res.coefficient("Rm"), Some(0.9));
        assert!(res.term("SMB").is_none());
    }

    #[test]
    fn columns_and_values_align() {
        let res = sample();
        let cols = res.column_names();
        assert_eq!(cols, vec!["const", "Rm", "const_t", "Rm_t", "const_p", "Rm_p"]);
        assert_eq!(res.values().len(), cols.len());
        assert_eq!(res.values()[3], 15.0);
    }
}
