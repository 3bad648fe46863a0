use crate::{KMeans, KMeansState, Primitive};
use rand::rngs::StdRng;

pub(crate) mod kmeanplusplus;
pub(crate) mod randomsample;

/// Centroid initialization methods.
///
/// The outcome of each k-means run depends on the initialization of its centroids. Both methods are
/// driven exclusively by a generator seeded from [`crate::KMeansConfig`], so identical seeds on identical
/// input always select identical initial centroids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum InitMethod {
    /// Random sample initialization (a.k.a. Forgy)
    ///
    /// ## Description
    /// This initialization method randomly selects k distinct samples as initial centroids.
    /// If the input contains duplicate samples, some of the selected centroids may coincide.
    #[default]
    RandomSample,
    /// K-Mean++ initialization method
    ///
    /// ## Description
    /// This initialization method starts by selecting one sample as first centroid.
    /// Proceeding from there, the method iteratively selects one new centroid (per iteration) by calculating
    /// each sample's probability of "being a centroid". This probability is bigger, the farther away a sample
    /// is from its nearest already chosen centroid.
    KMeansPlusPlus
}
impl InitMethod {
    pub(crate) fn initialize<T: Primitive>(&self, kmean: &KMeans<'_, T>, state: &mut KMeansState<T>, rnd: &mut StdRng) {
        match self {
            InitMethod::RandomSample => randomsample::calculate(kmean, state, rnd),
            InitMethod::KMeansPlusPlus => kmeanplusplus::calculate(kmean, state, rnd)
        }
    }
}
