//! Sample standardization.

use ndarray::{Array1, Array2, Axis};

use crate::MathError;

/// Z-score transform using the population standard deviation (ddof = 0).
#[derive(Debug, Clone, Copy, Default)]
pub struct ZScore;

impl ZScore {
    /// Create a new z-score transform.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Standardize one vector.
    ///
    /// # Errors
    /// Returns `EmptyData` for an empty vector and `ZeroVariance` when all
    /// values are equal.
    pub fn apply(&self, data: &Array1<f64>) -> Result<Array1<f64>, MathError> {
        let mean = data.mean().ok_or(MathError::EmptyData)?;
        let std = population_std(data, mean);
        let constant = data.iter().all(|v| *v == data[0]);
        if constant || !(std.is_finite() && std > 0.0) {
            return Err(MathError::ZeroVariance { column: 0 });
        }
        Ok(data.mapv(|v| (v - mean) / std))
    }

    /// Standardize each column of a matrix independently.
    ///
    /// # Errors
    /// Returns `EmptyData` for a matrix without rows and `ZeroVariance` with
    /// the index of the first constant column.
    pub fn apply_columns(&self, data: &Array2<f64>) -> Result<Array2<f64>, MathError> {
        if data.nrows() == 0 {
            return Err(MathError::EmptyData);
        }
        let mut out = data.clone();
        for (j, mut column) in out.axis_iter_mut(Axis(1)).enumerate() {
            let owned = column.to_owned();
            let standardized =
                self.apply(&owned).map_err(|_| MathError::ZeroVariance { column: j })?;
            column.assign(&standardized);
        }
        Ok(out)
    }
}

fn population_std(data: &Array1<f64>, mean: f64) -> f64 {
    let n = data.len() as f64;
    let variance: f64 = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;
    use rstest::rstest;

    use super::*;

    #[test]
    fn zscore_has_zero_mean_unit_population_std() {
        let data = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let z = ZScore::new().apply(&data).unwrap();

        assert_relative_eq!(z.mean().unwrap(), 0.0, epsilon = 1e-12);
        let var: f64 = z.iter().map(|v| v * v).sum::<f64>() / z.len() as f64;
        assert_relative_eq!(var, 1.0, epsilon = 1e-12);
        // Population std of 1..5 is sqrt(2)
        assert_relative_eq!(z[0], -2.0 / 2f64.sqrt(), epsilon = 1e-12);
    }

    #[rstest]
    #[case(array![3.0, 3.0, 3.0])]
    #[case(array![0.0])]
    #[case(Array1::from_elem(150, 0.001))]
    fn constant_vector_rejected(#[case] data: Array1<f64>) {
        assert!(matches!(ZScore::new().apply(&data), Err(MathError::ZeroVariance { .. })));
    }

    #[test]
    fn empty_vector_rejected() {
        let empty: Array1<f64> = array![];
        assert!(matches!(ZScore::new().apply(&empty), Err(MathError::EmptyData)));
    }

    #[test]
    fn columns_standardized_independently() {
        let data = array![[1.0, 10.0], [2.0, 30.0], [3.0, 20.0]];
        let z = ZScore::new().apply_columns(&data).unwrap();

        for j in 0..2 {
            assert_relative_eq!(z.column(j).mean().unwrap(), 0.0, epsilon = 1e-12);
        }
        assert_relative_eq!(z[[1, 1]], 10.0 / (200.0f64 / 3.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn constant_column_reports_index() {
        let data = array![[1.0, 5.0, 0.1], [2.0, 5.0, 0.2], [3.0, 5.0, 0.3]];
        assert!(matches!(
            ZScore::new().apply_columns(&data),
            Err(MathError::ZeroVariance { column: 1 })
        ));
    }
}
