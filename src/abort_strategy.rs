use crate::{KMeansError, Primitive, Result};

/// Enum with possible abort strategies.
/// These strategies specify when a running calculation is considered converged and stops iterating.
/// Independent of the strategy, a calculation never runs for more than `max_iter` iterations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AbortStrategy<T: Primitive> {
	/// This strategy stops the calculation after the first iteration in which no centroid moved by
	/// more than **tolerance** (euclidean distance between its previous and its new position).
	/// ## Fields:
	/// - **tolerance**: Maximum centroid displacement (`max_shift <= tolerance`) that counts as converged
	CentroidShift { tolerance: T },
	/// This strategy stops the calculation directly after an iteration produced no improvement of the inertia,
	/// where `improvement > threshold`, for the first time.
	/// ## Fields:
	/// - **threshold**: Threshold, used to detect an improvement (`improvement > threshold`)
	NoImprovement { threshold: T }
}
impl<T: Primitive> AbortStrategy<T> {
	pub(crate) fn validate(&self) -> Result<()> {
		let (name, value) = match *self {
			AbortStrategy::CentroidShift { tolerance } => ("tolerance", tolerance),
			AbortStrategy::NoImprovement { threshold } => ("threshold", threshold)
		};
		if value.is_nan() || value < T::zero() {
			return Err(KMeansError::InvalidParameter(format!("{} must be non-negative, got {}", name, value)));
		}
		Ok(())
	}

	pub(crate) fn create_logic(&self) -> Box<dyn AbortStrategyLogic<T>> {
		match *self {
			AbortStrategy::CentroidShift{tolerance} => Box::new(CentroidShiftLogic { tolerance }),
			AbortStrategy::NoImprovement{threshold} => Box::new(NoImprovementLogic {
				threshold,
				prev_inertia: T::infinity()
			})
		}
	}
}
impl<T: Primitive> Default for AbortStrategy<T> {
	fn default() -> Self {
		AbortStrategy::CentroidShift { tolerance: T::from(1e-4).unwrap_or_else(T::epsilon) }
	}
}

pub(crate) trait AbortStrategyLogic<T: Primitive> {
	/// Function that has to be called once an iteration of the calculation ended.
	/// ## Arguments
	/// - **max_shift**: The largest distance any centroid moved during the iteration
	/// - **inertia**: The sum of squared sample-to-centroid distances, measured during the iteration
	/// ## Returns
	/// - **true** if the calculation should continue
	/// - **false** if the calculation converged
	fn next(&mut self, max_shift: T, inertia: T) -> bool;
}


pub(crate) struct CentroidShiftLogic<T: Primitive> {
	tolerance: T
}
impl<T: Primitive> AbortStrategyLogic<T> for CentroidShiftLogic<T> {
	fn next(&mut self, max_shift: T, _inertia: T) -> bool {
		max_shift > self.tolerance
	}
}


pub(crate) struct NoImprovementLogic<T: Primitive> {
	threshold: T,
	prev_inertia: T
}
impl<T: Primitive> AbortStrategyLogic<T> for NoImprovementLogic<T> {
	fn next(&mut self, _max_shift: T, inertia: T) -> bool {
		let improvement = self.prev_inertia - inertia;
		self.prev_inertia = inertia;
		improvement > self.threshold
	}
}
