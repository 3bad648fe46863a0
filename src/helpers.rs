use crate::Primitive;

/// Squared euclidean distance between two samples of the same dimensionality.
#[inline(always)]
pub(crate) fn squared_distance<T: Primitive>(a: &[T], b: &[T]) -> T {
    a.iter().cloned().zip(b.iter().cloned())
        .map(|(av,bv)| av - bv)         // <sample> - <centroid>
        .map(|v| v * v)                 // <vec_components> ^2
        .sum()                          // sum(<vec_components>^2)
}

/// Index and squared distance of the centroid closest to **sample**, considering only the first
/// **k** centroids. Ties resolve to the lowest centroid index.
#[inline(always)]
pub(crate) fn nearest_centroid<T: Primitive>(sample: &[T], centroids: &[T], sample_dims: usize, k: usize) -> (usize, T) {
    centroids.chunks_exact(sample_dims).take(k)
        .map(|c| squared_distance(sample, c))
        .enumerate()
        .fold((0, T::infinity()), |(best_idx, best_dist), (idx, dist)| {
            if dist < best_dist { (idx, dist) } else { (best_idx, best_dist) }
        })
}

#[cfg(test)]
macro_rules! assert_approx_eq {
	($left: expr, $right: expr, $tol: expr) => ({
		match ($left, $right, $tol) {
			(left_val , right_val, tol_val) => {
				let delta = (left_val - right_val).abs();
				if !(delta < tol_val) {
					panic!(
						"assertion failed: `(left ≈ right)` \
						(left: `{}`, right: `{}`) \
						with ∆={:1.1e} (allowed ∆={:e})",
						left_val , right_val, delta, tol_val
					)
				}
			}
		}
	});
	($left: expr, $right: expr) => (assert_approx_eq!(($left), ($right), 1e-15))
}
