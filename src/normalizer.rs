use crate::{KMeansError, Matrix, Primitive, Result};

/// Standard deviations at or below this value are treated as zero variance.
const STD_EPSILON: f64 = 1e-12;

/// Per-column mean and (population) standard deviation, computed once from a training matrix.
///
/// ## Fields
/// - **mean**: Mean of each column
/// - **std**: Standard deviation of each column, as measured (`0` for constant columns)
/// - **scale**: Divisor applied to each column. Equal to **std**, or `1` for columns whose standard deviation
///   is zero or negligible, which maps them to all-zeros
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizationParams<T: Primitive> {
    pub mean: Vec<T>,
    pub std: Vec<T>,
    pub scale: Vec<T>
}
impl<T: Primitive> NormalizationParams<T> {
    pub fn dims(&self) -> usize { self.mean.len() }

    /// Apply these parameters to another matrix of the same width.
    ///
    /// Fails with [`KMeansError::InvalidInput`] if the width does not match, or if a value leaves the
    /// representable range of `T` when rescaled.
    pub fn transform(&self, matrix: &Matrix<T>) -> Result<Matrix<T>> {
        self.map_columns(matrix, |v, c| (v - self.mean[c]) / self.scale[c])
    }

    /// Map normalized values (e.g. centroids) back into the original units.
    pub fn inverse_transform(&self, matrix: &Matrix<T>) -> Result<Matrix<T>> {
        self.map_columns(matrix, |v, c| v * self.scale[c] + self.mean[c])
    }

    fn map_columns(&self, matrix: &Matrix<T>, f: impl Fn(T, usize) -> T) -> Result<Matrix<T>> {
        if matrix.cols() != self.dims() {
            return Err(KMeansError::InvalidInput(format!(
                "matrix has {} columns, normalization was fitted on {}", matrix.cols(), self.dims())));
        }
        let data = matrix.iter_rows()
            .flat_map(|row| row.iter().enumerate().map(|(c, v)| f(*v, c)))
            .collect();
        // Matrix::new rejects results that overflowed to a non-finite value
        Matrix::new(data, matrix.rows(), matrix.cols())
    }
}


/// Rescales each column to zero mean and unit variance.
pub struct Normalizer;
impl Normalizer {
    /// Compute per-column mean and standard deviation over all rows of **matrix**, and return the
    /// normalized matrix together with the parameters used.
    ///
    /// A [`Matrix`] can only be constructed with at least one row and no ragged rows, so use
    /// [`Normalizer::fit_transform_rows`] or [`crate::normalize`] when starting from raw rows.
    /// Columns whose spread exceeds the range of `T` fail with [`KMeansError::InvalidInput`].
    pub fn fit_transform<T: Primitive>(matrix: &Matrix<T>) -> Result<(Matrix<T>, NormalizationParams<T>)> {
        let params = Self::fit(matrix)?;
        let normalized = params.transform(matrix)?;
        Ok((normalized, params))
    }

    pub fn fit_transform_rows<T: Primitive>(rows: Vec<Vec<T>>) -> Result<(Matrix<T>, NormalizationParams<T>)> {
        Self::fit_transform(&Matrix::from_rows(rows)?)
    }

    fn fit<T: Primitive>(matrix: &Matrix<T>) -> Result<NormalizationParams<T>> {
        let cols = matrix.cols();
        let std_epsilon = T::from(STD_EPSILON).unwrap_or_else(T::epsilon);

        // Running mean and sum of squared deviations (Welford), the mean of a constant column stays exactly its value
        let mut mean = vec![T::zero(); cols];
        let mut m2 = vec![T::zero(); cols];
        for (i, row) in matrix.iter_rows().enumerate() {
            let cnt = T::from(i + 1).unwrap_or_else(T::one);
            row.iter().zip(mean.iter_mut().zip(m2.iter_mut()))
                .for_each(|(v, (m, acc))| {
                    let delta = *v - *m;
                    *m += delta / cnt;
                    *acc += delta * (*v - *m);
                });
        }

        let row_cnt = T::from(matrix.rows()).unwrap_or_else(T::one);
        let std: Vec<T> = m2.into_iter().map(|acc| (acc / row_cnt).sqrt()).collect();
        if let Some(c) = (0..cols).find(|&c| !mean[c].is_finite() || !std[c].is_finite()) {
            return Err(KMeansError::InvalidInput(format!(
                "column {} is out of range for normalization (mean {:?}, std {:?})", c, mean[c], std[c])));
        }

        let scale = std.iter().map(|&s| if s > std_epsilon { s } else { T::one() }).collect();
        Ok(NormalizationParams { mean, std, scale })
    }
}



#[cfg(test)]
mod tests {
    use super::*;

    fn column(m: &Matrix<f64>, c: usize) -> Vec<f64> {
        m.iter_rows().map(|r| r[c]).collect()
    }

    #[test]
    fn normalized_columns_have_zero_mean_and_unit_std() {
        let rows = vec![vec![1.0, 100.0], vec![2.0, 250.0], vec![4.0, 175.0], vec![9.0, 20.0], vec![-3.0, 60.0]];
        let (normalized, params) = Normalizer::fit_transform_rows(rows).unwrap();
        assert_eq!((normalized.rows(), normalized.cols()), (5, 2));

        for c in 0..2 {
            let col = column(&normalized, c);
            let mean = col.iter().sum::<f64>() / col.len() as f64;
            let std = (col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / col.len() as f64).sqrt();
            assert_approx_eq!(mean, 0.0, 1e-12);
            assert_approx_eq!(std, 1.0, 1e-12);
        }
        assert_approx_eq!(params.mean[0], 2.6, 1e-12);
        assert_approx_eq!(params.mean[1], 121.0, 1e-12);
    }

    #[test]
    fn constant_column_becomes_zeros() {
        let rows = vec![vec![7.0f32, 1.0], vec![7.0, 2.0], vec![7.0, 3.0]];
        let (normalized, params) = Normalizer::fit_transform_rows(rows).unwrap();
        assert_eq!(params.std[0], 0.0);
        assert_eq!(params.scale[0], 1.0);
        assert!(normalized.iter_rows().all(|r| r[0] == 0.0));
        assert!(normalized.as_slice().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn large_constant_column_becomes_zeros() {
        // 1234567.1 is not exactly representable, a summed mean would not reproduce it
        let rows = (0..7).map(|i| vec![1234567.1f64, i as f64]).collect();
        let (normalized, params) = Normalizer::fit_transform_rows(rows).unwrap();
        assert_eq!(params.mean[0], 1234567.1);
        assert_eq!(params.std[0], 0.0);
        assert_eq!(params.scale[0], 1.0);
        assert!(normalized.iter_rows().all(|r| r[0] == 0.0));

        let (normalized, _) = Normalizer::fit_transform_rows(vec![vec![1e6f32 + 0.1]; 5]).unwrap();
        assert!(normalized.as_slice().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn overflowing_columns_are_rejected() {
        let err = Normalizer::fit_transform_rows(vec![vec![1e308f64, 1.0], vec![1.5e308, 2.0]]).unwrap_err();
        assert!(matches!(err, KMeansError::InvalidInput(ref msg) if msg.starts_with("column 0")));
        assert!(matches!(Normalizer::fit_transform_rows(vec![vec![-1e308f64], vec![1e308]]),
            Err(KMeansError::InvalidInput(_))));

        // std 0.5 doubles every value, which pushes f64::MAX out of range
        let (_, params) = Normalizer::fit_transform_rows(vec![vec![0.0f64], vec![1.0]]).unwrap();
        let far = Matrix::from_rows(vec![vec![f64::MAX]]).unwrap();
        assert!(matches!(params.transform(&far), Err(KMeansError::InvalidInput(_))));
    }

    #[test]
    fn single_row_normalizes_to_zeros() {
        let (normalized, _) = Normalizer::fit_transform_rows(vec![vec![3.0f64, -4.0]]).unwrap();
        assert_eq!(normalized.as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn fit_transform_is_deterministic() {
        let rows = vec![vec![0.3f64, 1.7], vec![2.2, 0.1], vec![5.9, 9.4]];
        let first = Normalizer::fit_transform_rows(rows.clone()).unwrap();
        let second = Normalizer::fit_transform_rows(rows).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn inverse_transform_restores_original_units() {
        let raw = Matrix::from_rows(vec![vec![1.0f64, 10.0], vec![3.0, 30.0], vec![8.0, 5.0]]).unwrap();
        let (normalized, params) = Normalizer::fit_transform(&raw).unwrap();
        let restored = params.inverse_transform(&normalized).unwrap();
        raw.as_slice().iter().zip(restored.as_slice().iter())
            .for_each(|(r, s)| assert_approx_eq!(*r, *s, 1e-12));
    }

    #[test]
    fn transform_rejects_width_mismatch() {
        let (_, params) = Normalizer::fit_transform_rows(vec![vec![1.0f64, 2.0], vec![2.0, 3.0]]).unwrap();
        let other = Matrix::from_rows(vec![vec![1.0f64, 2.0, 3.0]]).unwrap();
        assert!(matches!(params.transform(&other), Err(KMeansError::InvalidInput(_))));
    }

    #[test]
    fn malformed_input_is_rejected() {
        assert!(matches!(Normalizer::fit_transform_rows::<f64>(vec![]), Err(KMeansError::InvalidInput(_))));
        assert!(matches!(Normalizer::fit_transform_rows(vec![vec![1.0f64, 2.0], vec![1.0]]),
            Err(KMeansError::InvalidInput(_))));
    }
}
