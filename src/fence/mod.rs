//! Point-in-region membership indexes ("fences").
//!
//! Four interchangeable strategies answer the same question: which added
//! features have a shape containing a point. They differ only in how much work
//! is done up front to avoid exact containment tests at query time.

mod bbox;
mod brute;
mod cells;
mod rtree;
mod strategy;

use std::sync::Arc;

pub use bbox::BboxFence;
pub use brute::BruteFence;
pub use cells::CellFence;
pub use rtree::RtreeFence;
pub use strategy::Strategy;

use crate::error::Result;
use crate::models::{Coordinate, Feature};

/// Capability shared by every fence strategy.
///
/// Results may list a feature more than once when several of its shapes
/// match; callers needing set semantics deduplicate.
pub trait GeoFence {
    /// Index this feature
    fn add(&mut self, feature: Arc<Feature>);

    /// All features containing this coordinate
    fn get(&self, coordinate: Coordinate) -> Vec<Arc<Feature>>;

    /// Number of features added
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A fence of any strategy
pub enum Fence {
    Brute(BruteFence),
    Bbox(BboxFence),
    Rtree(RtreeFence),
    CellCovering(CellFence),
}

impl Fence {
    /// `resolution` is the covering level and only matters to the cell-covering strategy
    pub fn new(strategy: Strategy, resolution: u8) -> Self {
        match strategy {
            Strategy::Brute => Fence::Brute(BruteFence::new()),
            Strategy::Bbox => Fence::Bbox(BboxFence::new()),
            Strategy::Rtree => Fence::Rtree(RtreeFence::new()),
            Strategy::CellCovering => Fence::CellCovering(CellFence::new(resolution)),
        }
    }

    pub fn strategy(&self) -> Strategy {
        match self {
            Fence::Brute(_) => Strategy::Brute,
            Fence::Bbox(_) => Strategy::Bbox,
            Fence::Rtree(_) => Strategy::Rtree,
            Fence::CellCovering(_) => Strategy::CellCovering,
        }
    }

    /// Add many features; strategies with a bulk path use it
    pub fn extend<I>(&mut self, features: I)
    where
        I: IntoIterator<Item = Arc<Feature>>,
    {
        match self {
            Fence::Rtree(f) => f.extend(features),
            Fence::CellCovering(f) => f.extend(features),
            other => {
                for feature in features {
                    other.add(feature);
                }
            }
        }
    }
}

impl Default for Fence {
    fn default() -> Self {
        Fence::Rtree(RtreeFence::new())
    }
}

impl GeoFence for Fence {
    fn add(&mut self, feature: Arc<Feature>) {
        match self {
            Fence::Brute(f) => f.add(feature),
            Fence::Bbox(f) => f.add(feature),
            Fence::Rtree(f) => f.add(feature),
            Fence::CellCovering(f) => f.add(feature),
        }
    }

    fn get(&self, coordinate: Coordinate) -> Vec<Arc<Feature>> {
        match self {
            Fence::Brute(f) => f.get(coordinate),
            Fence::Bbox(f) => f.get(coordinate),
            Fence::Rtree(f) => f.get(coordinate),
            Fence::CellCovering(f) => f.get(coordinate),
        }
    }

    fn len(&self) -> usize {
        match self {
            Fence::Brute(f) => f.len(),
            Fence::Bbox(f) => f.len(),
            Fence::Rtree(f) => f.len(),
            Fence::CellCovering(f) => f.len(),
        }
    }
}

/// Build an empty fence from a strategy label such as `"rtree"` or `"cell_covering"`
pub fn build_index(label: &str, resolution: u8) -> Result<Fence> {
    let strategy: Strategy = label.parse()?;
    Ok(Fence::new(strategy, resolution))
}

/// Drop repeated features (by identity) while keeping first-seen order
pub fn dedup_features(features: Vec<Arc<Feature>>) -> Vec<Arc<Feature>> {
    let mut unique: Vec<Arc<Feature>> = Vec::with_capacity(features.len());
    for feature in features {
        if !unique.iter().any(|f| Arc::ptr_eq(f, &feature)) {
            unique.push(feature);
        }
    }
    unique
}
