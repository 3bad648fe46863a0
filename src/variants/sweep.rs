use crate::{KMeans, KMeansConfig, Result, memory::*};
use rayon::prelude::*;
use tracing::{debug, info};

/// Inertia-vs-k curve, used to pick a cluster count with the elbow method.
pub(crate) struct Sweep<T: Primitive> {
	_p: std::marker::PhantomData<T>
}
impl<T: Primitive> Sweep<T> {
	pub fn calculate(data: &KMeans<'_, T>, k_range: &[usize], config: &KMeansConfig<T>) -> Result<Vec<(usize, T)>> {
		// Fail before doing any work, if any of the requested runs is invalid
		config.validate()?;
		k_range.iter().try_for_each(|&k| data.validate_k(k))?;
		debug!(runs = k_range.len(), "starting inertia sweep");

		// Runs share nothing but the immutable input, collect() keeps the order of k_range
		let curve: Vec<(usize, T)> = k_range.par_iter()
			.map(|&k| {
				let res = data.best_of_n_init(k, config);
				(k, res.inertia)
			})
			.collect();

		info!(curve = ?curve, "finished inertia sweep");
		Ok(curve)
	}
}
