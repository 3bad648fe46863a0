use crate::{KMeans, KMeansState, Primitive};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;

#[inline(always)]
pub fn calculate<T: Primitive>(kmean: &KMeans<'_, T>, state: &mut KMeansState<T>, rnd: &mut StdRng) {
    {
        // Randomly select first centroid
        let first_idx = rnd.gen_range(0..kmean.sample_cnt());
        state.centroids.set_row_from_iter(0, kmean.samples.row(first_idx).iter().cloned());
    }
    for k in 1..state.k {
        // For each following centroid...
        // Calculate distances & update cluster-assignments
        kmean.update_cluster_assignments(state, Some(k));

        // Use rand's WeightedIndex to randomly draw a centroid, weighted by the squared distance to its nearest centroid.
        // When all samples coincide with a chosen centroid, there is nothing to weight -> draw uniformly
        let sampled_centroid_id = match WeightedIndex::new(state.centroid_distances.iter().cloned()) {
            Ok(centroid_index) => centroid_index.sample(rnd),
            Err(_) => rnd.gen_range(0..kmean.sample_cnt())
        };
        state.centroids.set_row_from_iter(k, kmean.samples.row(sampled_centroid_id).iter().cloned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Matrix;

    fn init(matrix: &Matrix<f64>, k: usize, seed: u64) -> KMeansState<f64> {
        let mut state = KMeansState::new(matrix.rows(), matrix.cols(), k);
        calculate(&KMeans::new(matrix), &mut state, &mut StdRng::seed_from_u64(seed));
        state
    }

    #[test]
    fn spreads_centroids_over_separated_groups() {
        // two samples per far-apart location: kmeans++ can never draw an already covered location
        let matrix = Matrix::from_rows(vec![
            vec![0.0, 0.0], vec![0.0, 0.0], vec![100.0, 0.0], vec![100.0, 0.0], vec![0.0, 100.0], vec![0.0, 100.0]
        ]).unwrap();
        for seed in 0..10 {
            let state = init(&matrix, 3, seed);
            let mut centroids = state.centroids.to_rows();
            centroids.sort_by(|a, b| a.partial_cmp(b).unwrap());
            assert_eq!(centroids, vec![vec![0.0, 0.0], vec![0.0, 100.0], vec![100.0, 0.0]]);
        }
    }

    #[test]
    fn identical_samples_fall_back_to_uniform_draw() {
        let matrix = Matrix::from_rows(vec![vec![2.5, -1.0]; 5]).unwrap();
        let state = init(&matrix, 4, 9);
        assert!(state.centroids.iter_rows().all(|c| c == [2.5, -1.0]));
    }

    #[test]
    fn same_seed_selects_same_centroids() {
        let matrix = Matrix::new((0..300).map(|v| (v as f64 * 0.37).cos()).collect(), 100, 3).unwrap();
        assert_eq!(init(&matrix, 6, 5).centroids, init(&matrix, 6, 5).centroids);
    }
}
