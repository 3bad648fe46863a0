use crate::{helpers, memory::*, AbortStrategy, InitMethod, KMeansError, Result};
use rayon::prelude::*;
use tracing::debug;

/// This is a structure holding the configuration options for k-means calculations, such as
/// the seed for the initialization, the iteration limit or the abort-strategy.
/// Progress of a running calculation is reported through `tracing` events.
///
/// For a more detailed information about all possible options, have a look at [`KMeansConfigBuilder`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KMeansConfig<T: Primitive> {
    /// Seed for the random number generator each run constructs for itself
    pub(crate) seed: u64,
    /// Upper bound for the amount of assignment/update iterations per run
    pub(crate) max_iter: usize,
    /// Amount of independently initialized runs, of which the one with the lowest inertia is kept
    pub(crate) n_init: usize,
    /// Centroid initialization method
    pub(crate) init: InitMethod,
    /// The abort-strategy to use for the running calculation
    pub(crate) abort_strategy: AbortStrategy<T>
}
impl<T: Primitive> Default for KMeansConfig<T> {
    fn default() -> Self {
        Self {
            seed: 0,
            max_iter: 300,
            n_init: 1,
            init: InitMethod::RandomSample,
            abort_strategy: AbortStrategy::default()
        }
    }
}
impl<T: Primitive> KMeansConfig<T> {
    /// Use the [`KMeansConfigBuilder`] to build a [`KMeansConfig`] instance.
    pub fn build() -> KMeansConfigBuilder<T> {
        KMeansConfigBuilder { config: KMeansConfig::default() }
    }

    pub fn seed(&self) -> u64 { self.seed }
    pub fn max_iter(&self) -> usize { self.max_iter }
    pub fn n_init(&self) -> usize { self.n_init }
    pub fn init_method(&self) -> InitMethod { self.init }
    pub fn abort_strategy(&self) -> AbortStrategy<T> { self.abort_strategy }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_iter == 0 {
            return Err(KMeansError::InvalidParameter("max_iter must be positive".to_string()));
        }
        if self.n_init == 0 {
            return Err(KMeansError::InvalidParameter("n_init must be positive".to_string()));
        }
        self.abort_strategy.validate()
    }
}
pub struct KMeansConfigBuilder<T: Primitive> {
    config: KMeansConfig<T>
}
impl<T: Primitive> KMeansConfigBuilder<T> {
    /// Set the seed that is used for the centroid initialization.
    /// Identical seeds on identical input lead to identical results.
    /// ## Default
    /// `0`
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed; self
    }
    /// Set the maximum amount of assignment/update iterations of a single run.
    /// ## Default
    /// `300`
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.config.max_iter = max_iter; self
    }
    /// Set the amount of independently initialized runs. Run `i` uses the seed `seed + i`,
    /// and the run with the lowest inertia is returned.
    /// ## Default
    /// `1`
    pub fn n_init(mut self, n_init: usize) -> Self {
        self.config.n_init = n_init; self
    }
    /// Set the centroid initialization method. For more information, see documentation of [`InitMethod`].
    /// ## Default
    /// [`InitMethod::RandomSample`]
    pub fn init_method(mut self, init: InitMethod) -> Self {
        self.config.init = init; self
    }
    /// Shorthand for [`AbortStrategy::CentroidShift`] with the given **tolerance**.
    pub fn tolerance(mut self, tolerance: T) -> Self {
        self.config.abort_strategy = AbortStrategy::CentroidShift { tolerance }; self
    }
    /// Set the abort-strategy to use during a running k-means calculation. For more information,
    /// see documentation of [`AbortStrategy`].
    /// ## Default
    /// [`AbortStrategy::CentroidShift`] `{ tolerance: 1e-4 }`
    pub fn abort_strategy(mut self, abort_strategy: AbortStrategy<T>) -> Self {
        self.config.abort_strategy = abort_strategy; self
    }
    /// Return the internally built configuration structure.
    pub fn build(self) -> KMeansConfig<T> { self.config }
}


/// This is the internally used data-structure, storing the current state during calculation.
/// All mutations are done in this structure, making [`KMeans`] immutable, and therefore allowing
/// it to be used in parallel, without having to duplicate the input-data.
///
/// ## Fields
/// - **k**: The amount of clusters that were requested for this calculation
/// - **inertia**: The total sum of squared distances from all samples to their respective centroids
/// - **centroids**: Current cluster centers, one row per cluster
/// - **centroid_frequency**: Amount of samples in each cluster
/// - **labels**: Vector mapping each sample to its respective nearest cluster
/// - **centroid_distances**: Vector containing each sample's squared distance to its centroid
/// - **iterations**: Amount of finished assignment/update iterations
/// - **converged**: Whether the abort-strategy stopped the calculation before `max_iter` was hit
#[derive(Clone, Debug)]
pub struct KMeansState<T: Primitive> {
    pub k: usize,
    pub inertia: T,
    pub centroids: Matrix<T>,
    pub centroid_frequency: Vec<usize>,
    pub labels: Vec<usize>,
    pub centroid_distances: Vec<T>,
    pub iterations: usize,
    pub converged: bool
}
impl<T: Primitive> KMeansState<T> {
    pub(crate) fn new(sample_cnt: usize, sample_dims: usize, k: usize) -> Self {
        Self {
            k,
            inertia: T::infinity(),
            centroids: Matrix::zeros(k, sample_dims),
            centroid_frequency: vec![0usize;k],
            labels: vec![0usize;sample_cnt],
            centroid_distances: vec![T::infinity();sample_cnt],
            iterations: 0,
            converged: false
        }
    }
}


/// Immutable result of a k-means calculation.
///
/// ## Fields
/// - **k**: The amount of clusters that were requested
/// - **centroids**: Final cluster centers (`k` rows, same width as the input)
/// - **labels**: Cluster index in `0..k` of every input row
/// - **inertia**: Sum of squared distances from every row to its assigned centroid
/// - **centroid_frequency**: Amount of rows assigned to each cluster
/// - **iterations**: Amount of assignment/update iterations that were run
/// - **converged**: `false` if the calculation was stopped by the `max_iter` limit
#[derive(Clone, Debug, PartialEq)]
pub struct RunResult<T: Primitive> {
    pub k: usize,
    pub centroids: Matrix<T>,
    pub labels: Vec<usize>,
    pub inertia: T,
    pub centroid_frequency: Vec<usize>,
    pub iterations: usize,
    pub converged: bool
}
impl<T: Primitive> From<KMeansState<T>> for RunResult<T> {
    fn from(state: KMeansState<T>) -> Self {
        Self {
            k: state.k,
            centroids: state.centroids,
            labels: state.labels,
            inertia: state.inertia,
            centroid_frequency: state.centroid_frequency,
            iterations: state.iterations,
            converged: state.converged
        }
    }
}




/// Entrypoint of this crate's clustering API-Surface.
///
/// Create an instance of this struct, giving the (normalized) samples you want to operate on. The primitive type
/// of the passed matrix will be the type used internaly for all calculations, as well as the result
/// as stored in the returned [`RunResult`] structure.
///
/// ## Supported operations
/// - k-Means clustering (Lloyd) [`KMeans::kmeans_lloyd`]
/// - Inertia sweep over multiple cluster counts (elbow curve) [`KMeans::sweep`]
///
/// ## Supported initialization methods
/// See [`InitMethod`].
pub struct KMeans<'a, T: Primitive> {
    pub(crate) samples: &'a Matrix<T>
}
impl<'a, T: Primitive> KMeans<'a, T> {
    /// Create a new instance of the [`KMeans`] structure, operating on **samples**.
    pub fn new(samples: &'a Matrix<T>) -> Self {
        Self { samples }
    }

    #[inline(always)] pub(crate) fn sample_cnt(&self) -> usize { self.samples.rows() }
    #[inline(always)] pub(crate) fn sample_dims(&self) -> usize { self.samples.cols() }

    pub(crate) fn validate_k(&self, k: usize) -> Result<()> {
        if k < 1 || k > self.sample_cnt() {
            return Err(KMeansError::InvalidInput(format!(
                "cluster count must be within 1..={}, got {}", self.sample_cnt(), k)));
        }
        Ok(())
    }

    pub(crate) fn update_cluster_assignments(&self, state: &mut KMeansState<T>, limit_k: Option<usize>) {
        let centroids = state.centroids.as_slice();
        let (sample_dims, k) = (self.sample_dims(), limit_k.unwrap_or(state.k));

        // Every sample writes only its own slots, so the result does not depend on scheduling
        self.samples.as_slice().par_chunks_exact(sample_dims)
            .zip(state.labels.par_iter_mut())
            .zip(state.centroid_distances.par_iter_mut())
            .for_each(|((s, label), centroid_dist)| {
                let (best_idx, best_dist) = helpers::nearest_centroid(s, centroids, sample_dims, k);
                *label = best_idx;
                *centroid_dist = best_dist;
            });
    }

    pub(crate) fn update_cluster_frequencies(&self, labels: &[usize], centroid_frequency: &mut [usize]) -> usize {
        centroid_frequency.iter_mut().for_each(|v| *v = 0);
        let mut used_centroids_cnt = 0;
        labels.iter().cloned()
            .for_each(|centroid_id| {
                if centroid_frequency[centroid_id] == 0 {
                    used_centroids_cnt += 1; // Count the amount of centroids with more than 0 samples
                }
                centroid_frequency[centroid_id] += 1;
            });
        used_centroids_cnt
    }

    /// Sum of the squared distances currently stored in **state**, summed in sample order.
    pub(crate) fn inertia(state: &KMeansState<T>) -> T {
        state.centroid_distances.iter().cloned().sum()
    }



    /// Normal K-Means algorithm implementation (Lloyd's algorithm).
    ///
    /// Alternates between assigning each sample to its nearest centroid and moving each centroid
    /// to the mean of its assigned samples, until the configured [`AbortStrategy`] reports convergence,
    /// or `max_iter` iterations were done. A cluster that loses all of its samples keeps its previous centroid.
    ///
    /// ## Arguments
    /// - **k**: Amount of clusters to search for (`1 <= k <= sample_cnt`)
    /// - **config**: [`KMeansConfig`] instance, containing several configuration options for the calculation.
    ///
    /// ## Returns
    /// Instance of [`RunResult`], containing the final centroids, labels and inertia.
    ///
    /// ## Example
    /// ```rust
    /// use kmeans_elbow::*;
    ///
    /// let samples = Matrix::from_rows(vec![
    ///     vec![0.0f64, 0.0], vec![0.0, 1.0], vec![10.0, 10.0], vec![10.0, 11.0]
    /// ]).unwrap();
    /// let result = KMeans::new(&samples).kmeans_lloyd(2, &KMeansConfig::default()).unwrap();
    ///
    /// assert_eq!(result.labels[0], result.labels[1]);
    /// assert_ne!(result.labels[0], result.labels[2]);
    /// ```
    pub fn kmeans_lloyd(&self, k: usize, config: &KMeansConfig<T>) -> Result<RunResult<T>> {
        config.validate()?;
        self.validate_k(k)?;
        Ok(self.best_of_n_init(k, config))
    }

    /// Runs [`KMeans::kmeans_lloyd`] once per cluster count in **k_range**, and reports each run's inertia.
    ///
    /// The runs are independent of each other and are calculated in parallel, the returned
    /// `(k, inertia)` pairs are in the same order as **k_range**. All cluster counts are validated before
    /// any calculation starts.
    ///
    /// ## Example
    /// ```rust
    /// use kmeans_elbow::*;
    ///
    /// let samples = Matrix::from_rows(vec![
    ///     vec![0.0f64, 0.0], vec![0.0, 1.0], vec![10.0, 10.0], vec![10.0, 11.0]
    /// ]).unwrap();
    /// let curve = KMeans::new(&samples).sweep(1..=4, &KMeansConfig::default()).unwrap();
    ///
    /// assert_eq!(curve.iter().map(|(k, _)| *k).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    /// assert_eq!(curve[3].1, 0.0);
    /// ```
    pub fn sweep(&self, k_range: impl IntoIterator<Item = usize>, config: &KMeansConfig<T>) -> Result<Vec<(usize, T)>> {
        let k_range: Vec<usize> = k_range.into_iter().collect();
        crate::variants::Sweep::calculate(self, &k_range, config)
    }

    /// Runs `n_init` seeded calculations and keeps the one with the lowest inertia. Parameters must be validated.
    pub(crate) fn best_of_n_init(&self, k: usize, config: &KMeansConfig<T>) -> RunResult<T> {
        let mut best = crate::variants::Lloyd::calculate(self, k, config.seed, config);
        for i in 1..config.n_init {
            let seed = config.seed.wrapping_add(i as u64);
            let candidate = crate::variants::Lloyd::calculate(self, k, seed, config);
            debug!(k, seed, inertia = %candidate.inertia, best = %best.inertia, "finished restart");
            if candidate.inertia < best.inertia {
                best = candidate;
            }
        }
        best.into()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::testing;
    use rand::prelude::*;

    #[test]
    fn cluster_assignments_match_naive_calculation() {
        calculate_cluster_assignments::<f64>(1, 1e-10f64);
        calculate_cluster_assignments::<f64>(3, 1e-10f64);
        calculate_cluster_assignments::<f32>(2, 1e-5f32);
        calculate_cluster_assignments::<f32>(17, 1e-5f32);
    }

    fn calculate_cluster_assignments<T: Primitive>(sample_dims: usize, max_diff: T) {
        let (sample_cnt, k) = (500, 5);
        let mut rnd = StdRng::seed_from_u64(1337);

        let mut samples = vec![T::zero();sample_cnt * sample_dims];
        samples.iter_mut().for_each(|i| *i = rnd.gen_range(T::zero()..T::one()));
        let matrix = Matrix::new(samples, sample_cnt, sample_dims).unwrap();
        let kmean = KMeans::new(&matrix);

        let mut state = KMeansState::new(sample_cnt, sample_dims, k);
        (0..k).for_each(|ci| state.centroids.set_row_from_iter(ci, matrix.row(ci * 7).iter().cloned()));

        // calculate distances using method that (hopefully) works.
        let mut should_labels = state.labels.clone();
        let mut should_centroid_distances = state.centroid_distances.clone();
        matrix.iter_rows()
            .zip(should_labels.iter_mut())
            .zip(should_centroid_distances.iter_mut())
            .for_each(|((s, label), centroid_dist)| {
                let (best_idx, best_dist) = state.centroids.iter_rows()
                    .map(|c| {
                        s.iter().cloned().zip(c.iter().cloned())
                            .map(|(sv,cv)| sv - cv)
                            .map(|v| v * v)
                            .sum::<T>()
                    })
                    .enumerate()
                    .min_by(|(_,d0), (_,d1)| d0.partial_cmp(d1).unwrap())
                    .unwrap();
                *label = best_idx;
                *centroid_dist = best_dist;
            });

        kmean.update_cluster_assignments(&mut state, None);

        for i in 0..should_labels.len() {
            assert_approx_eq!(state.centroid_distances[i], should_centroid_distances[i], max_diff);
        }
        assert_eq!(state.labels, should_labels);
    }

    #[test]
    fn cluster_frequencies_count_used_centroids() {
        let matrix = Matrix::from_rows(vec![vec![0.0f64]; 5]).unwrap();
        let kmean = KMeans::new(&matrix);
        let mut freq = vec![9usize; 4];
        let used = kmean.update_cluster_frequencies(&[0, 2, 2, 0, 2], &mut freq);
        assert_eq!(used, 2);
        assert_eq!(freq, vec![2, 0, 3, 0]);
    }

    #[test]
    fn invalid_k_is_rejected() {
        let matrix = Matrix::from_rows(vec![vec![0.0f64, 0.0], vec![1.0, 1.0], vec![2.0, 2.0]]).unwrap();
        let kmean = KMeans::new(&matrix);
        let conf = KMeansConfig::default();
        assert!(matches!(kmean.kmeans_lloyd(0, &conf), Err(KMeansError::InvalidInput(_))));
        assert!(matches!(kmean.kmeans_lloyd(4, &conf), Err(KMeansError::InvalidInput(_))));
        assert!(kmean.kmeans_lloyd(3, &conf).is_ok());
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let matrix = Matrix::from_rows(vec![vec![0.0f64, 0.0], vec![1.0, 1.0]]).unwrap();
        let kmean = KMeans::new(&matrix);

        let conf = KMeansConfig::build().max_iter(0).build();
        assert!(matches!(kmean.kmeans_lloyd(1, &conf), Err(KMeansError::InvalidParameter(_))));
        let conf = KMeansConfig::build().tolerance(-1.0).build();
        assert!(matches!(kmean.kmeans_lloyd(1, &conf), Err(KMeansError::InvalidParameter(_))));
        let conf = KMeansConfig::build().n_init(0).build();
        assert!(matches!(kmean.kmeans_lloyd(1, &conf), Err(KMeansError::InvalidParameter(_))));
    }

    #[test]
    fn n_init_never_returns_worse_than_single_run() {
        let matrix = testing::blobs::<f64>(&[[0.0, 0.0], [4.0, 0.0], [2.0, 3.0], [8.0, 8.0]], 25, 1.5, 3);
        let kmean = KMeans::new(&matrix);
        let single = kmean.kmeans_lloyd(4, &KMeansConfig::build().seed(11).build()).unwrap();
        let multi = kmean.kmeans_lloyd(4, &KMeansConfig::build().seed(11).n_init(8).build()).unwrap();
        assert!(multi.inertia <= single.inertia);
    }

    #[test]
    fn config_defaults() {
        let conf = KMeansConfig::<f64>::default();
        assert_eq!(conf.seed(), 0);
        assert_eq!(conf.max_iter(), 300);
        assert_eq!(conf.n_init(), 1);
        assert_eq!(conf.init_method(), InitMethod::RandomSample);
        assert_eq!(conf.abort_strategy(), AbortStrategy::CentroidShift { tolerance: 1e-4 });
    }

    #[test]
    fn config_is_plain_data_shared_across_threads() {
        let conf = KMeansConfig::<f64>::build().seed(9).max_iter(20).build();
        let copy = conf;
        assert_eq!(conf, copy);

        let matrix = testing::blobs::<f64>(&[[0.0, 0.0], [5.0, 5.0]], 20, 1.0, 2);
        let results: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..2)
                .map(|_| s.spawn(|| KMeans::new(&matrix).kmeans_lloyd(2, &conf).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(results[0], results[1]);
        assert!(results[0].iterations <= copy.max_iter());
    }
}
