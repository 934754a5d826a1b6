//! Bounding-box pre-filter fence.

use geo::{Coord, Intersects, Rect};
use std::sync::Arc;

use super::GeoFence;
use crate::models::{Coordinate, Feature, FeatureArena, FeatureId};

#[derive(Debug, Clone)]
struct IndexedBox {
    bbox: Rect<f64>,
    feature: FeatureId,
}

/// Keeps one bounding box per shape and skips exact tests outside it
#[derive(Debug, Clone, Default)]
pub struct BboxFence {
    features: FeatureArena,
    boxes: Vec<IndexedBox>,
}

impl BboxFence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }
}

impl GeoFence for BboxFence {
    fn add(&mut self, feature: Arc<Feature>) {
        let boxes: Vec<Rect<f64>> = feature
            .shapes
            .iter()
            .filter_map(|shape| shape.bounding_box())
            .collect();

        let id = self.features.insert(feature);
        self.boxes
            .extend(boxes.into_iter().map(|bbox| IndexedBox { bbox, feature: id }));
    }

    /// A box hit re-tests every shape of its feature, so a feature whose boxes
    /// overlap at the point is reported once per (box, matching shape) pair.
    fn get(&self, coordinate: Coordinate) -> Vec<Arc<Feature>> {
        let point = Coord::from(coordinate);
        let mut matches = Vec::new();
        for entry in self.boxes.iter().filter(|b| b.bbox.intersects(&point)) {
            let feature = self.features.get(entry.feature);
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
