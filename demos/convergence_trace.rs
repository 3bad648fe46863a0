use kmeans_elbow::*;
use rand::prelude::*;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

fn main() -> anyhow::Result<()> {
    // Per-iteration progress is emitted as debug events
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let (sample_cnt, sample_dims, k) = (20000, 8, 4);

    // Generate some random data
    let mut rnd = StdRng::seed_from_u64(1337);
    let mut samples = vec![0.0f64;sample_cnt * sample_dims];
    samples.iter_mut().for_each(|v| *v = rnd.gen());
    let samples = Matrix::new(samples, sample_cnt, sample_dims)?;

    let conf = KMeansConfig::build()
        .seed(7)
        .max_iter(2500)
        .init_method(InitMethod::KMeansPlusPlus)
        .build();

    let result = cluster(&samples, k, &conf)?;

    println!("Centroids: {:?}", result.centroids.to_rows());
    println!("Cluster sizes: {:?}", result.centroid_frequency);
    println!("Inertia: {} (converged: {}, iterations: {})", result.inertia, result.converged, result.iterations);
    Ok(())
}
