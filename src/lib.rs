//! # kmeans-elbow - API documentation
//!
//! kmeans-elbow is a small rust library that partitions tabular numeric data into groups of similar
//! rows using k-means clustering, and produces the inertia-vs-k curve used to choose the group count
//! (the "elbow method").
//!
//! ## Data flow
//! raw rows → [`normalize`] → normalized [`Matrix`] → [`cluster`] (single run) or [`sweep`] (one run per k)
//! → labels / inertia curve.
//!
//! ## Reproducibility
//! There is no process-wide random state. Every run creates its own generator from the seed in its
//! [`KMeansConfig`], so a fixed matrix, k and configuration always yield identical centroids, labels
//! and inertia - also when the runs of a [`sweep`] are calculated in parallel.
//!
//! ## Supported primitive types
//! - [`f32`]
//! - [`f64`]
//!
//! ## Example
//! ```rust
//! use kmeans_elbow::*;
//!
//! fn main() -> Result<()> {
//!     let rows = vec![vec![0.0f64, 0.0], vec![0.0, 1.0], vec![10.0, 10.0], vec![10.0, 11.0]];
//!
//!     let (samples, params) = normalize(rows)?;
//!     let result = cluster(&samples, 2, &KMeansConfig::default())?;
//!
//!     println!("Centroids: {:?}", params.inverse_transform(&result.centroids)?.to_rows());
//!     println!("Labels: {:?}", result.labels);
//!     println!("Inertia: {}", result.inertia);
//!
//!     for (k, inertia) in sweep(&samples, 1..=4, &KMeansConfig::default())? {
//!         println!("k = {}: {}", k, inertia);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Example (inspecting how a run ended)
//! ```rust
//! use kmeans_elbow::*;
//!
//! fn main() -> Result<()> {
//!     let samples = Matrix::new((0..2000).map(|v| (v as f64 * 0.1).sin()).collect(), 1000, 2)?;
//!
//!     let conf = KMeansConfig::build()
//!         .seed(42)
//!         .max_iter(50)
//!         .init_method(InitMethod::KMeansPlusPlus)
//!         .build();
//!
//!     let result = cluster(&samples, 4, &conf)?;
//!     println!("Inertia: {} after {} iterations (converged: {})", result.inertia, result.iterations, result.converged);
//!     Ok(())
//! }
//! ```
//!
//! ## Short API-Overview / Description
//! The free functions [`normalize`], [`cluster`] and [`sweep`] are the crate's entry points. The latter two
//! are shorthands for the instance-methods of the [`KMeans`] struct, which borrows the (normalized) samples
//! without mutating them, so multiple calculations can be done in parallel on the same data.
//! Internally, a new instance of [`KMeansState`] is used to store the state of each calculation, and is finally
//! turned into the immutable [`RunResult`].
//!
//! All failures (malformed input, invalid k, invalid parameters) are reported as [`KMeansError`] at call time.
//! Log output is emitted through `tracing`; installing a subscriber is left to the application. Every
//! iteration of a run is reported as a `debug` event, the outcome of a run as an `info` event.

#[macro_use] mod helpers;
mod memory;
mod error;
mod api;
mod normalizer;
mod variants;
mod inits;
mod abort_strategy;

pub use abort_strategy::AbortStrategy;
pub use api::{KMeansState, KMeansConfig, KMeansConfigBuilder, KMeans, RunResult};
pub use error::{KMeansError, Result};
pub use inits::InitMethod;
pub use memory::{Matrix, Primitive};
pub use normalizer::{NormalizationParams, Normalizer};

/// Rescale every column of **rows** to zero mean and unit variance.
///
/// Fails with [`KMeansError::InvalidInput`] if there are no rows, or the rows are ragged.
/// Constant columns are mapped to all-zeros.
pub fn normalize<T: Primitive>(rows: Vec<Vec<T>>) -> Result<(Matrix<T>, NormalizationParams<T>)> {
    Normalizer::fit_transform_rows(rows)
}

/// Partition the rows of **samples** into **k** clusters. See [`KMeans::kmeans_lloyd`].
pub fn cluster<T: Primitive>(samples: &Matrix<T>, k: usize, config: &KMeansConfig<T>) -> Result<RunResult<T>> {
    KMeans::new(samples).kmeans_lloyd(k, config)
}

/// Calculate the inertia for every cluster count in **k_range**. See [`KMeans::sweep`].
pub fn sweep<T: Primitive>(samples: &Matrix<T>, k_range: impl IntoIterator<Item = usize>, config: &KMeansConfig<T>)
        -> Result<Vec<(usize, T)>> {
    KMeans::new(samples).sweep(k_range, config)
}
