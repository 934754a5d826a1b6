//! R-tree fence over shape bounding boxes.

use rstar::{RTree, RTreeObject, AABB};
use std::sync::Arc;
use tracing::info;

use super::GeoFence;
use crate::models::{Coordinate, Feature, FeatureArena, FeatureId, Shape};

/// Wrapper for R-tree indexing of a single shape
#[derive(Debug, Clone)]
struct IndexedShape {
    feature: FeatureId,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedShape {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedShape {
    /// Single-point shapes are not indexed
    fn new(shape: &Shape, feature: FeatureId) -> Option<Self> {
        if shape.vertex_count() < 2 {
            return None;
        }
        let rect = shape.bounding_box()?;
        Some(Self {
            feature,
            envelope: AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
        })
    }
}

/// Spatial index of shapes using an R-tree, refined by exact containment
#[derive(Default)]
pub struct RtreeFence {
    features: FeatureArena,
    tree: RTree<IndexedShape>,
}

impl RtreeFence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add many features at once; an empty tree is bulk loaded instead of
    /// growing one insertion at a time.
    pub fn extend<I>(&mut self, features: I)
    where
        I: IntoIterator<Item = Arc<Feature>>,
    {
        let mut indexed = Vec::new();
        for feature in features {
            let id = self.features.insert(feature);
            let shapes = &self.features.get(id).shapes;
            indexed.extend(shapes.iter().filter_map(|s| IndexedShape::new(s, id)));
        }

        if self.tree.size() == 0 {
            self.tree = RTree::bulk_load(indexed);
        } else {
            for entry in indexed {
                self.tree.insert(entry);
            }
        }

        info!(
            "R-tree fence holds {} features in {} entries",
            self.features.len(),
            self.tree.size()
        );
    }

    /// Number of shapes in the tree
    pub fn entry_count(&self) -> usize {
        self.tree.size()
    }
}

impl GeoFence for RtreeFence {
    fn add(&mut self, feature: Arc<Feature>) {
        let id = self.features.insert(Arc::clone(&feature));
        for shape in &feature.shapes {
            if let Some(entry) = IndexedShape::new(shape, id) {
                self.tree.insert(entry);
            }
        }
    }

    /// Candidates come from envelope intersection; each candidate's feature is
    /// then re-tested shape by shape, like the bounding-box fence.
    fn get(&self, coordinate: Coordinate) -> Vec<Arc<Feature>> {
        let query_envelope = AABB::from_point([coordinate.lon, coordinate.lat]);

        let mut matches = Vec::new();
        for candidate in self.tree.locate_in_envelope_intersecting(&query_envelope) {
            let feature = self.features.get(candidate.feature);
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

#[cfg(test)]
mod tests {
    use super::*;

    fn square(min_lat: f64, min_lon: f64, size: f64) -> Shape {
        Shape::from_coordinates([
            Coordinate::new(min_lat, min_lon),
            Coordinate::new(min_lat, min_lon + size),
            Coordinate::new(min_lat + size, min_lon + size),
            Coordinate::new(min_lat + size, min_lon),
        ])
    }

    fn feature(id: &str, shapes: Vec<Shape>) -> Arc<Feature> {
        Arc::new(Feature::new(shapes).with_id(id))
    }

    #[test]
    fn test_single_point_shapes_are_not_inserted() {
        let mut fence = RtreeFence::new();
        let point = Shape::from_coordinates([Coordinate::new(3.0, 4.0)]);
        fence.add(feature("mixed", vec![square(0.0, 0.0, 5.0), point.clone()]));
        fence.extend([feature("dot", vec![point])]);

        assert_eq!(fence.len(), 2);
        assert_eq!(fence.entry_count(), 1);
    }

    #[test]
    fn test_extend_after_add_inserts_into_existing_tree() {
        let mut fence = RtreeFence::new();
        fence.add(feature("first", vec![square(0.0, 0.0, 5.0)]));
        assert_eq!(fence.entry_count(), 1);

        fence.extend([
            feature("second", vec![square(10.0, 10.0, 5.0)]),
            feature("third", vec![square(2.0, 2.0, 5.0), square(-20.0, -20.0, 1.0)]),
        ]);

        assert_eq!(fence.len(), 3);
        assert_eq!(fence.entry_count(), 4);

        let ids = |lat, lon| {
            let mut ids: Vec<String> = fence
                .get(Coordinate::new(lat, lon))
                .iter()
                .filter_map(|f| f.id.clone())
                .collect();
            ids.sort();
            ids
        };
        assert_eq!(ids(1.0, 1.0), vec!["first"]);
        assert_eq!(ids(12.0, 12.0), vec!["second"]);
        assert_eq!(ids(-19.5, -19.5), vec!["third"]);
        assert_eq!(ids(4.0, 4.0), vec!["first", "third"]);
    }
}
