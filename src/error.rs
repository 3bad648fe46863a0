use thiserror::Error;

/// Errors reported synchronously by the normalizer and the clustering engine.
///
/// Degenerate-but-valid numeric conditions (constant columns, clusters that lose all their
/// samples) are handled internally and never surface as an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KMeansError {
    /// Malformed matrix (no rows, ragged or zero-width rows, non-finite values), or a cluster
    /// count outside of `1..=sample_cnt`.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Invalid calculation parameter, such as `max_iter == 0` or a negative tolerance.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String)
}

pub type Result<T> = std::result::Result<T, KMeansError>;
