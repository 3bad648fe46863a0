use crate::{KMeans, KMeansState, Primitive};
use rand::{rngs::StdRng, seq::index};

#[inline(always)] pub fn calculate<T: Primitive>(kmean: &KMeans<'_, T>, state: &mut KMeansState<T>, rnd: &mut StdRng) {
	index::sample(rnd, kmean.sample_cnt(), state.k).iter()
		.enumerate()
		.for_each(|(ci, sample_id)| { // Copy randomly chosen samples into state.centroids
			state.centroids.set_row_from_iter(ci, kmean.samples.row(sample_id).iter().cloned());
		});
}
