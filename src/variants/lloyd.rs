use crate::{helpers, KMeans, KMeansState, KMeansConfig, Matrix, memory::*};
use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info};

pub(crate) struct Lloyd<T: Primitive> {
	_p: std::marker::PhantomData<T>
}
impl<T: Primitive> Lloyd<T> {
    /// Moves every centroid to the mean of its assigned samples and returns the largest distance any centroid moved.
    fn update_centroids(data: &KMeans<'_, T>, state: &mut KMeansState<T>) -> T {
        // Sum all samples in a cluster together into new_centroids, in sample order
        let mut new_centroids = Matrix::zeros(state.k, data.sample_dims());
        let used_centroids_cnt = data.update_cluster_frequencies(&state.labels, &mut state.centroid_frequency);
        data.samples.iter_rows()
            .zip(state.labels.iter().cloned())
            .for_each(|(s, centroid_id)| {
                new_centroids.row_mut(centroid_id).iter_mut()
                    .zip(s.iter())
                    .for_each(|(c, sv)| *c += sv);
            });

        if used_centroids_cnt != state.k {
            debug!(k = state.k, empty = state.k - used_centroids_cnt, "keeping centroids of empty clusters in place");
        }

        // Calculate new centroids from the sums, empty clusters keep their previous position
        let mut max_shift = T::zero();
        for (ci, cfreq) in state.centroid_frequency.iter().cloned().enumerate() {
            if cfreq == 0 {
                continue;
            }
            let cfreq = T::from(cfreq).unwrap_or_else(T::one);
            new_centroids.row_mut(ci).iter_mut().for_each(|c| *c = *c / cfreq);
            let shift = helpers::squared_distance(state.centroids.row(ci), new_centroids.row(ci)).sqrt();
            if shift > max_shift {
                max_shift = shift;
            }
            state.centroids.set_row_from_iter(ci, new_centroids.row(ci).iter().cloned());
        }
        max_shift
    }

    /// One complete, seeded k-means run. **k** and **config** have to be validated by the caller.
    pub fn calculate(data: &KMeans<'_, T>, k: usize, seed: u64, config: &KMeansConfig<T>) -> KMeansState<T> {
        debug_assert!(k >= 1 && k <= data.sample_cnt());

        let mut state = KMeansState::new(data.sample_cnt(), data.sample_dims(), k);
        let mut rnd = StdRng::seed_from_u64(seed);

        config.init.initialize(data, &mut state, &mut rnd);
        debug!(k, seed, init = ?config.init, "initialized centroids");
        let mut abort_strategy = config.abort_strategy.create_logic();

        for i in 1..=config.max_iter {
            data.update_cluster_assignments(&mut state, None);
            let new_inertia = KMeans::inertia(&state);
            let max_shift = Self::update_centroids(data, &mut state);
            state.iterations = i;
            debug!(k, iteration = i, inertia = %new_inertia, max_shift = %max_shift, "finished iteration");
            state.inertia = new_inertia;
            if !abort_strategy.next(max_shift, new_inertia) {
                state.converged = true;
                break;
            }
        }

        // Labels and inertia have to describe the final centroid positions
        data.update_cluster_assignments(&mut state, None);
        data.update_cluster_frequencies(&state.labels, &mut state.centroid_frequency);
        state.inertia = KMeans::inertia(&state);

        if state.converged {
            info!(k, seed, iterations = state.iterations, inertia = %state.inertia, "k-means converged");
        } else {
            info!(k, seed, iterations = state.iterations, inertia = %state.inertia, "k-means stopped at iteration limit");
        }
        state
    }
}
