//! Linear-scan fence.

use std::sync::Arc;

use super::GeoFence;
use crate::models::{Coordinate, Feature, FeatureArena};

/// Tests every shape of every feature on each query
#[derive(Debug, Clone, Default)]
pub struct BruteFence {
    features: FeatureArena,
}

impl BruteFence {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GeoFence for BruteFence {
    fn add(&mut self, feature: Arc<Feature>) {
        self.features.insert(feature);
    }

    /// A feature appears once per matching shape
    fn get(&self, coordinate: Coordinate) -> Vec<Arc<Feature>> {
        let mut matches = Vec::new();
        for (_, feature) in self.features.iter() {
            for shape in &feature.shapes {
                if shape.contains(coordinate) {
                    matches.push(Arc::clone(feature));
                }
            }
        }
        matches
    }

    fn len(&self) -> usize {
        self.features.len()
    }
}
