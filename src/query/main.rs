//! Query server for point-in-region lookups.
//!
//! Loads every configured fence into a shared registry and answers
//! "which features contain this point" over HTTP.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use geofence::cell::MAX_LEVEL;
use geofence::config::Config;
use geofence::{
    dedup_features, load_fence_file, Coordinate, FeatureSummary, FenceError, FenceRegistry,
    GeoFence, Strategy,
};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "query")]
#[command(about = "Point-in-region lookup server")]
struct Args {
    /// Fence configuration file (TOML)
    #[arg(short, long)]
    config: PathBuf,

    /// Listen address, overrides the config file
    #[arg(short, long)]
    listen: Option<String>,
}

/// Application state shared across handlers
struct AppState {
    registry: Arc<FenceRegistry>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Geofence Query Server");
    let config = Config::load_from_file(&args.config)?;

    let registry = Arc::new(FenceRegistry::new());
    for fence_config in config.fences.iter().cloned() {
        if fence_config.resolution > MAX_LEVEL {
            anyhow::bail!(
                "fence '{}': resolution {} exceeds maximum {}",
                fence_config.name,
                fence_config.resolution,
                MAX_LEVEL
            );
        }

        info!(
            "Loading fence '{}' ({}, level {}) from {}",
            fence_config.name,
            fence_config.strategy,
            fence_config.resolution,
            fence_config.path.display()
        );

        let started = Instant::now();
        let (strategy, resolution, path) = (
            fence_config.strategy,
            fence_config.resolution,
            fence_config.path.clone(),
        );
        let fence =
            tokio::task::spawn_blocking(move || load_fence_file(strategy, resolution, path))
                .await??;

        info!(
            "Fence '{}' ready with {} features in {:?}",
            fence_config.name,
            fence.len(),
            started.elapsed()
        );
        registry.set(fence_config.name, fence);
    }

    let state = Arc::new(AppState { registry });

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/fences", get(fences_handler))
        .route("/v1/fences/{name}/search", get(search_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listen = args.listen.unwrap_or(config.global.listen);
    info!("Starting server on {}", listen);

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        fences: state.registry.len(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    fences: usize,
}

/// List the loaded fences
async fn fences_handler(State(state): State<Arc<AppState>>) -> Json<Vec<FenceInfo>> {
    let mut names = state.registry.keys();
    names.sort();

    let fences = names
        .into_iter()
        .filter_map(|name| {
            state.registry.with_fence(&name, |fence| FenceInfo {
                strategy: fence.strategy(),
                features: fence.len(),
                name: name.clone(),
            })
        })
        .collect();

    Json(fences)
}

#[derive(Serialize)]
struct FenceInfo {
    name: String,
    strategy: Strategy,
    features: usize,
}

/// Features of one fence containing a point
async fn search_handler(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Query(params): Query<SearchQueryParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let started = Instant::now();
    let point = Coordinate::new(params.lat, params.lon);

    let matches = state.registry.search(&name, point).map_err(|e| match e {
        FenceError::NameNotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
        _ => {
            tracing::error!("Search on fence '{}' failed: {}", name, e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    })?;

    let matches = if params.dedup.unwrap_or(false) {
        dedup_features(matches)
    } else {
        matches
    };

    Ok(Json(SearchResponse {
        features: matches.iter().map(|f| f.summary()).collect(),
        took_us: started.elapsed().as_micros(),
    }))
}

#[derive(Deserialize)]
struct SearchQueryParams {
    /// Point latitude
    lat: f64,
    /// Point longitude
    lon: f64,
    /// Report each feature at most once
    dedup: Option<bool>,
}

#[derive(Serialize)]
struct SearchResponse {
    features: Vec<FeatureSummary>,
    took_us: u128,
}
