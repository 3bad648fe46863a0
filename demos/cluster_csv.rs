//! Clusters two or more numeric columns of a CSV file, and prints the elbow curve.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --example cluster_csv -- employees.csv --k 3
//! cargo run --example cluster_csv -- data.csv --columns height,weight,age --k 4 --max-k 12
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use kmeans_elbow::{cluster, normalize, sweep, KMeansConfig};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Parser)]
#[command(about = "K-Means clustering of numeric CSV columns, with elbow curve")]
struct Args {
    /// Path to a CSV file with a header row.
    input: PathBuf,

    /// Names of the numeric columns to cluster on (at least two).
    #[arg(long, value_delimiter = ',', default_value = "Rating,Salary")]
    columns: Vec<String>,

    /// Number of clusters.
    #[arg(long)]
    k: usize,

    /// Largest cluster count of the elbow curve.
    #[arg(long, default_value_t = 10)]
    max_k: usize,

    /// Seed for the centroid initialization.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Log every iteration.
    #[arg(long)]
    verbose: bool,
}

fn read_columns(path: &PathBuf, columns: &[String]) -> Result<Vec<Vec<f64>>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let headers = reader.headers().context("failed to read CSV header")?.clone();

    let indices = columns.iter()
        .map(|name| headers.iter().position(|h| h == name)
            .with_context(|| format!("column '{}' not found, available: {:?}", name, headers.iter().collect::<Vec<_>>())))
        .collect::<Result<Vec<_>>>()?;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("failed to read row {}", line + 2))?;
        let row = indices.iter().zip(columns.iter())
            .map(|(&idx, name)| {
                let value = record.get(idx).unwrap_or_default().trim();
                value.parse::<f64>()
                    .with_context(|| format!("row {}: column '{}' is not numeric: '{}'", line + 2, name, value))
            })
            .collect::<Result<Vec<_>>>()?;
        rows.push(row);
    }
    Ok(rows)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if args.columns.len() < 2 {
        bail!("at least two columns are required, got {:?}", args.columns);
    }

    let rows = read_columns(&args.input, &args.columns)?;
    info!(rows = rows.len(), columns = ?args.columns, "loaded {}", args.input.display());

    let (samples, params) = normalize(rows)?;
    let conf = KMeansConfig::build().seed(args.seed).build();

    let result = cluster(&samples, args.k, &conf)?;
    println!("row,cluster");
    for (row, label) in result.labels.iter().enumerate() {
        println!("{},{}", row, label);
    }
    println!();
    println!("cluster,size,{}", args.columns.join(","));
    let centroids = params.inverse_transform(&result.centroids)?;
    for (ci, centroid) in centroids.iter_rows().enumerate() {
        let coords: Vec<String> = centroid.iter().map(|v| format!("{:.4}", v)).collect();
        println!("{},{},{}", ci, result.centroid_frequency[ci], coords.join(","));
    }
    println!("inertia: {:.6}", result.inertia);

    let max_k = args.max_k.min(samples.rows());
    println!();
    println!("k,inertia");
    for (k, inertia) in sweep(&samples, 1..=max_k, &conf)? {
        println!("{},{:.6}", k, inertia);
    }
    Ok(())
}
