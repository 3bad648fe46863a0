use crate::{KMeansError, Result};
use num::{NumCast, Zero, Float};
use std::{
    fmt::{Debug, Display, LowerExp}, iter::Sum, ops::{Add, AddAssign, Sub, SubAssign}
};
use rand::distributions::uniform::SampleUniform;

pub trait Primitive: Add + AddAssign + Sum + Sub + SubAssign + Zero + Float + NumCast + SampleUniform
                + PartialOrd + Copy + Default + Display + Debug + Sync + Send + LowerExp + 'static
                + for<'a> AddAssign<&'a Self> {}
impl Primitive for f32 {}
impl Primitive for f64 {}


/// Dense row-major matrix, as consumed and produced by this crate's API.
///
/// The shape is fixed at construction: every row has exactly [`Matrix::cols`] elements,
/// and there is at least one row and one column.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix<T: Primitive> {
    pub(crate) data: Vec<T>,
    pub(crate) rows: usize,
    pub(crate) cols: usize
}
impl<T: Primitive> Matrix<T> {
    /// Create a matrix from a flat buffer.
    ///
    /// ## Arguments
    /// - **samples**: Vector of samples [row-major] = [<sample0>,<sample1>,<sample2>,...]
    /// - **rows**: Amount of samples, contained in the passed **samples** vector
    /// - **cols**: Amount of dimensions each sample from the **samples** vector has
    pub fn new(samples: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(KMeansError::InvalidInput(format!("matrix must not be empty (got {}x{})", rows, cols)));
        }
        let len = rows.checked_mul(cols).ok_or_else(|| KMeansError::InvalidInput(format!(
            "shape {}x{} exceeds the addressable size", rows, cols)))?;
        if samples.len() != len {
            return Err(KMeansError::InvalidInput(format!(
                "buffer of length {} does not match shape {}x{}", samples.len(), rows, cols)));
        }
        if let Some(pos) = samples.iter().position(|v| !v.is_finite()) {
            return Err(KMeansError::InvalidInput(format!(
                "non-finite value at row {}, column {}", pos / cols, pos % cols)));
        }
        Ok(Self { data: samples, rows, cols })
    }

    /// Create a matrix from a list of rows. Fails on zero rows, zero-width rows or ragged rows.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(KMeansError::InvalidInput(format!(
                "ragged matrix: row {} has {} elements, expected {}", idx, row.len(), cols)));
        }
        let row_cnt = rows.len();
        Self::new(rows.into_iter().flatten().collect(), row_cnt, cols)
    }

    /// Zero-filled matrix. Only used internally, where the shape is known to be valid.
    pub(crate) fn zeros(rows: usize, cols: usize) -> Self {
        Self { data: vec![T::zero(); rows * cols], rows, cols }
    }

    pub fn rows(&self) -> usize { self.rows }
    pub fn cols(&self) -> usize { self.cols }
    pub fn as_slice(&self) -> &[T] { &self.data }
    pub fn into_vec(self) -> Vec<T> { self.data }

    pub fn row(&self, idx: usize) -> &[T] {
        &self.data[idx * self.cols..(idx + 1) * self.cols]
    }
    pub(crate) fn row_mut(&mut self, idx: usize) -> &mut [T] {
        &mut self.data[idx * self.cols..(idx + 1) * self.cols]
    }
    pub fn iter_rows(&self) -> std::slice::ChunksExact<'_, T> {
        self.data.chunks_exact(self.cols)
    }
    pub(crate) fn set_row_from_iter(&mut self, idx: usize, src: impl Iterator<Item = T>) {
        self.row_mut(idx).iter_mut()
            .zip(src)
            .for_each(|(c,s)| *c = s);
    }

    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.iter_rows().map(|r| r.to_vec()).collect()
    }
}
