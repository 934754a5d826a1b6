//! One-shot point lookups against a GeoJSON file.
//!
//! Prints one JSON line per queried point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use geofence::cell::MAX_LEVEL;
use geofence::{dedup_features, load_fence_file, Coordinate, Feature, FeatureSummary, GeoFence, Strategy};

#[derive(Parser, Debug)]
#[command(name = "lookup")]
#[command(about = "Find the GeoJSON features containing each point")]
struct Args {
    /// GeoJSON file (FeatureCollection, Feature or Geometry)
    #[arg(short, long)]
    file: PathBuf,

    /// Fence strategy: brute, bbox, rtree or cell_covering
    #[arg(short, long, default_value = "rtree")]
    strategy: String,

    /// Cell level for the cell_covering strategy
    #[arg(short, long, default_value_t = 12)]
    resolution: u8,

    /// Point to look up as "lat,lon" (repeatable)
    #[arg(short, long = "point", required = true)]
    points: Vec<Coordinate>,

    /// Report each feature at most once per point
    #[arg(long)]
    dedup: bool,
}

#[derive(Serialize)]
struct LookupResult {
    lat: f64,
    lon: f64,
    features: Vec<FeatureSummary>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let strategy: Strategy = args.strategy.parse()?;
    if args.resolution > MAX_LEVEL {
        anyhow::bail!("resolution {} exceeds maximum {}", args.resolution, MAX_LEVEL);
    }

    let fence = load_fence_file(strategy, args.resolution, &args.file)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;

    for point in args.points {
        let mut matches: Vec<Arc<Feature>> = fence.get(point);
        if args.dedup {
            matches = dedup_features(matches);
        }

        let result = LookupResult {
            lat: point.lat,
            lon: point.lon,
            features: matches.iter().map(|f| f.summary()).collect(),
        };
        println!("{}", serde_json::to_string(&result)?);
    }

    Ok(())
}
