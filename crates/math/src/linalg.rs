//! Least squares with coefficient inference.

use ndarray::{Array1, Array2};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::MathError;

/// Relative pivot threshold below which a matrix is treated as singular.
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Result of a least squares regression.
#[derive(Debug, Clone)]
pub struct WlsResult {
    /// Estimated coefficients.
    pub coefficients: Array1<f64>,
    /// Standard errors of the coefficients.
    pub std_errors: Array1<f64>,
    /// t-statistics.
    pub t_stats: Array1<f64>,
    /// Two-sided p-values from Student's t with `df_resid` degrees of freedom.
    pub p_values: Array1<f64>,
    /// Residuals on the original scale.
    pub residuals: Array1<f64>,
    /// R-squared of the whitened model.
    pub r_squared: f64,
    /// Residual degrees of freedom.
    pub df_resid: usize,
}

/// Perform weighted least squares regression.
///
/// Solves: argmin_beta sum((w_i * (y_i - X_i * beta))^2)
///
/// Rows are scaled by `weights` before fitting, so passing
/// `1 / sigma_i` gives GLS with a diagonal error covariance.
///
/// # Arguments
/// * `y` - Response vector (n,)
/// * `x` - Design matrix (n x p), including any intercept column
/// * `weights` - Row multipliers (n,)
///
/// # Errors
/// Returns error if dimensions mismatch, `n <= p`, or `X'X` is singular.
pub fn weighted_least_squares(
    y: &Array1<f64>,
    x: &Array2<f64>,
    weights: &Array1<f64>,
) -> Result<WlsResult, MathError> {
    let n = y.len();
    let p = x.ncols();

    if x.nrows() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: x.nrows() });
    }
    if weights.len() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: weights.len() });
    }
    if n == 0 || p == 0 {
        return Err(MathError::EmptyData);
    }
    if n <= p {
        return Err(MathError::Underdetermined { n_obs: n, n_params: p });
    }

    // Whiten
    let y_w: Array1<f64> = y * weights;
    let mut x_w = x.clone();
    for (mut row, &w) in x_w.rows_mut().into_iter().zip(weights.iter()) {
        row *= w;
    }

    let xtx = x_w.t().dot(&x_w);
    let xty = x_w.t().dot(&y_w);
    let xtx_inv = invert_symmetric(&xtx)?;
    let coefficients = xtx_inv.dot(&xty);

    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(MathError::NumericalInstability("non-finite coefficient".to_string()));
    }

    let resid_w = &y_w - &x_w.dot(&coefficients);
    let ss_res: f64 = resid_w.iter().map(|r| r * r).sum();
    let df_resid = n - p;
    let sigma2 = ss_res / df_resid as f64;

    let std_errors: Array1<f64> =
        xtx_inv.diag().iter().map(|&v| (sigma2 * v.max(0.0)).sqrt()).collect();
    let t_stats: Array1<f64> = coefficients
        .iter()
        .zip(std_errors.iter())
        .map(|(&b, &se)| if se > 0.0 { b / se } else { t_without_error(b) })
        .collect();

    let dist = StudentsT::new(0.0, 1.0, df_resid as f64)
        .map_err(|e| MathError::NumericalInstability(e.to_string()))?;
    let p_values: Array1<f64> =
        t_stats.iter().map(|&t| (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0)).collect();

    let residuals = y - &x.dot(&coefficients);

    let y_mean = y_w.mean().unwrap_or(0.0);
    let ss_tot: f64 = y_w.iter().map(|yi| (yi - y_mean).powi(2)).sum();
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

    Ok(WlsResult { coefficients, std_errors, t_stats, p_values, residuals, r_squared, df_resid })
}

/// Generalized least squares with identity error covariance.
///
/// # Errors
/// See [`weighted_least_squares`].
pub fn generalized_least_squares(y: &Array1<f64>, x: &Array2<f64>) -> Result<WlsResult, MathError> {
    weighted_least_squares(y, x, &Array1::ones(y.len()))
}

/// An exact fit has zero standard error; report an infinite t for non-zero
/// coefficients.
fn t_without_error(b: f64) -> f64 {
    if b == 0.0 { 0.0 } else { b.signum() * f64::INFINITY }
}

/// Invert a symmetric positive semi-definite matrix.
///
/// The matrix is scaled to unit diagonal first so the singularity test is
/// independent of column scale, then inverted by Gauss-Jordan elimination
/// with partial pivoting.
fn invert_symmetric(a: &Array2<f64>) -> Result<Array2<f64>, MathError> {
    let n = a.nrows();
    if n == 0 {
        return Err(MathError::EmptyData);
    }
    if a.ncols() != n {
        return Err(MathError::Singular("matrix must be square".to_string()));
    }

    let mut scale = Array1::zeros(n);
    for i in 0..n {
        let d = a[[i, i]];
        if !(d.is_finite() && d > 0.0) {
            return Err(MathError::Singular(format!("column {i} is identically zero")));
        }
        scale[i] = d.sqrt();
    }

    // Augmented matrix [B | I] with B = D^-1 A D^-1
    let mut aug = Array2::zeros((n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = a[[i, j]] / (scale[i] * scale[j]);
        }
        aug[[i, n + i]] = 1.0;
    }

    for col in 0..n {
        // Find pivot
        let mut max_row = col;
        let mut max_val = aug[[col, col]].abs();
        for row in (col + 1)..n {
            if aug[[row, col]].abs() > max_val {
                max_val = aug[[row, col]].abs();
                max_row = row;
            }
        }

        if !max_val.is_finite() || max_val < SINGULAR_TOLERANCE {
            return Err(MathError::Singular(format!("column {col} is linearly dependent")));
        }

        if max_row != col {
            for j in 0..2 * n {
                aug.swap([col, j], [max_row, j]);
            }
        }

        let pivot = aug[[col, col]];
        for j in 0..2 * n {
            aug[[col, j]] /= pivot;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = aug[[row, col]];
            if factor == 0.0 {
                continue;
            }
            for j in 0..2 * n {
                aug[[row, j]] -= factor * aug[[col, j]];
            }
        }
    }

    let mut inv = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            inv[[i, j]] = aug[[i, n + j]] / (scale[i] * scale[j]);
        }
    }

    Ok(inv)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::{Axis, array};

    use super::*;

    fn with_intercept(x: &Array1<f64>) -> Array2<f64> {
        let mut design = Array2::ones((x.len(), 2));
        design.column_mut(1).assign(x);
        design
    }

    #[test]
    fn gls_simple_regression() {
        let x = array![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = array![1.1, 2.0, 2.9, 4.1, 5.0, 5.9];

        let result = generalized_least_squares(&y, &with_intercept(&x)).unwrap();

        // Closed form: slope = cov(x, y) / var(x), intercept = ybar - slope * xbar
        let xbar = x.mean().unwrap();
        let ybar = y.mean().unwrap();
        let sxy: f64 = x.iter().zip(y.iter()).map(|(a, b)| (a - xbar) * (b - ybar)).sum();
        let sxx: f64 = x.iter().map(|a| (a - xbar).powi(2)).sum();
        let slope = sxy / sxx;

        assert_relative_eq!(result.coefficients[1], slope, epsilon = 1e-10);
        assert_relative_eq!(result.coefficients[0], ybar - slope * xbar, epsilon = 1e-10);
        assert_eq!(result.df_resid, 4);
        assert!(result.r_squared > 0.99);
    }

    #[test]
    fn standard_errors_match_closed_form() {
        let x = array![0.5, 1.5, 1.0, 3.0, 2.5, 4.0, 3.5, 5.0];
        let y = array![1.0, 2.2, 1.4, 3.9, 3.1, 5.2, 4.1, 6.3];

        let result = generalized_least_squares(&y, &with_intercept(&x)).unwrap();

        let n = x.len() as f64;
        let xbar = x.mean().unwrap();
        let sxx: f64 = x.iter().map(|a| (a - xbar).powi(2)).sum();
        let ssr: f64 = result.residuals.iter().map(|r| r * r).sum();
        let sigma2 = ssr / (n - 2.0);
        let se_slope = (sigma2 / sxx).sqrt();
        let se_intercept = (sigma2 * (1.0 / n + xbar * xbar / sxx)).sqrt();

        assert_relative_eq!(result.std_errors[1], se_slope, epsilon = 1e-10);
        assert_relative_eq!(result.std_errors[0], se_intercept, epsilon = 1e-10);
        assert_relative_eq!(result.t_stats[1], result.coefficients[1] / se_slope, epsilon = 1e-8);
        assert!(result.p_values[1] < 0.001);
    }

    #[test]
    fn p_value_of_zero_t_is_one() {
        // y symmetric around its mean with no trend in x
        let x = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = array![1.0, -1.0, 0.0, -1.0, 1.0];

        let result = generalized_least_squares(&y, &with_intercept(&x)).unwrap();

        assert_relative_eq!(result.coefficients[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(result.p_values[1], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn wls_weighted_regression() {
        let y = array![1.0, 2.0, 3.0, 4.0, 100.0, 6.0];
        let x = with_intercept(&array![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        // Very low weight on the outlier
        let weights = array![1.0, 1.0, 1.0, 1.0, 0.001, 1.0];

        let result = weighted_least_squares(&y, &x, &weights).unwrap();

        assert_relative_eq!(result.coefficients[1], 1.0, epsilon = 0.1);
    }

    #[test]
    fn constant_regressor_is_singular() {
        let y = array![0.1, 0.2, 0.3, 0.1, 0.5];
        let x = with_intercept(&array![2.0, 2.0, 2.0, 2.0, 2.0]);

        let err = generalized_least_squares(&y, &x).unwrap_err();
        assert!(matches!(err, MathError::Singular(_)));
    }

    #[test]
    fn zero_column_is_singular() {
        let y = array![0.1, 0.2, 0.3, 0.1, 0.5];
        let x = with_intercept(&array![0.0, 0.0, 0.0, 0.0, 0.0]);

        assert!(matches!(generalized_least_squares(&y, &x), Err(MathError::Singular(_))));
    }

    #[test]
    fn small_scale_columns_are_not_singular() {
        // Squared daily returns live around 1e-4; scaling must not trip the pivot test.
        let r = array![0.01, -0.02, 0.015, 0.003, -0.007, 0.012, -0.011, 0.004];
        let mut x = Array2::ones((r.len(), 3));
        x.column_mut(1).assign(&r);
        x.column_mut(2).assign(&r.mapv(|v| v * v));
        let y = &r * 0.8 + &r.mapv(|v| v * v) * 2.0 + 0.0005;

        let result = generalized_least_squares(&y, &x).unwrap();

        assert_relative_eq!(result.coefficients[1], 0.8, epsilon = 1e-8);
        assert_relative_eq!(result.coefficients[2], 2.0, epsilon = 1e-6);
    }

    #[test]
    fn underdetermined_rejected() {
        let y = array![1.0, 2.0];
        let x = with_intercept(&array![1.0, 2.0]);
        assert!(matches!(
            generalized_least_squares(&y, &x),
            Err(MathError::Underdetermined { n_obs: 2, n_params: 2 })
        ));
    }

    #[test]
    fn dimension_mismatch_rejected() {
        let y = array![1.0, 2.0, 3.0];
        let x = Array2::ones((4, 1));
        assert!(matches!(
            generalized_least_squares(&y, &x),
            Err(MathError::DimensionMismatch { expected: 3, actual: 4 })
        ));
    }

    #[test]
    fn inverse_roundtrip() {
        let a = array![[4.0, 1.0, 0.5], [1.0, 3.0, 0.2], [0.5, 0.2, 2.0]];
        let inv = invert_symmetric(&a).unwrap();
        let eye = a.dot(&inv);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(eye[[i, j]], expected, epsilon = 1e-12);
            }
        }
        assert_eq!(eye.len_of(Axis(0)), 3);
    }
}
