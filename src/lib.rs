//! Geofence - point-in-region membership lookups over polygon data sets
//!
//! This library provides the fence strategies, the named fence registry, and
//! the loading/configuration shared by the query and lookup binaries.

pub mod cell;
pub mod config;
pub mod error;
pub mod fence;
pub mod loader;
pub mod models;
pub mod registry;

pub use error::{FenceError, Result};
pub use fence::{build_index, dedup_features, Fence, GeoFence, Strategy};
pub use loader::{features_from_geojson, load_fence, load_fence_file, load_fence_index};
pub use models::{Coordinate, Feature, FeatureSummary, Shape};
pub use registry::{FenceRegistry, FenceTable};
