//! Features and the per-index arena that hands out lightweight handles to them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use super::{Coordinate, Shape};

/// A tagged real-world region composed of one or more shapes
#[derive(Debug, Clone, Default)]
pub struct Feature {
    /// Identifier carried over from the source data, if any
    pub id: Option<String>,

    pub shapes: Vec<Shape>,

    /// Opaque payload the caller cares about
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(shapes: Vec<Shape>) -> Self {
        Self {
            id: None,
            shapes,
            properties: Map::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// True if any shape of this feature contains the point
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        self.shapes.iter().any(|shape| shape.contains(coordinate))
    }

    pub fn summary(&self) -> FeatureSummary {
        FeatureSummary {
            id: self.id.clone(),
            properties: self.properties.clone(),
        }
    }
}

/// Serializable view of a feature without its geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub properties: Map<String, Value>,
}

/// Handle to a feature stored in a [`FeatureArena`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(u32);

impl FeatureId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Append-only store of shared features.
///
/// Index entries hold [`FeatureId`]s instead of their own copies of the geometry.
#[derive(Debug, Clone, Default)]
pub struct FeatureArena {
    features: Vec<Arc<Feature>>,
}

impl FeatureArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, feature: Arc<Feature>) -> FeatureId {
        let id = u32::try_from(self.features.len()).expect("feature arena exceeds u32::MAX entries");
        self.features.push(feature);
        FeatureId(id)
    }

    pub fn get(&self, id: FeatureId) -> &Arc<Feature> {
        &self.features[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureId, &Arc<Feature>)> {
        self.features
            .iter()
            .enumerate()
            .map(|(i, f)| (FeatureId(i as u32), f))
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Shape {
        Shape::from_coordinates([
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(1.0, 0.0),
        ])
    }

    #[test]
    fn test_feature_contains_any_shape() {
        let far = Shape::from_coordinates([
            Coordinate::new(10.0, 10.0),
            Coordinate::new(10.0, 11.0),
            Coordinate::new(11.0, 11.0),
        ]);
        let feature = Feature::new(vec![unit_square(), far]);
        assert!(feature.contains(Coordinate::new(0.5, 0.5)));
        assert!(feature.contains(Coordinate::new(10.2, 10.5)));
        assert!(!feature.contains(Coordinate::new(5.0, 5.0)));
    }

    #[test]
    fn test_arena_handles_share_feature() {
        let feature = Arc::new(Feature::new(vec![unit_square()]).with_id("a"));
        let mut arena = FeatureArena::new();
        let first = arena.insert(Arc::clone(&feature));
        let second = arena.insert(Arc::clone(&feature));

        assert_ne!(first, second);
        assert_eq!(arena.len(), 2);
        assert!(Arc::ptr_eq(arena.get(first), arena.get(second)));
    }

    #[test]
    fn test_summary_keeps_payload() {
        let feature = Feature::new(vec![unit_square()])
            .with_id("ch")
            .with_property("name", "Switzerland");
        let summary = feature.summary();
        assert_eq!(summary.id.as_deref(), Some("ch"));
        assert_eq!(summary.properties["name"], "Switzerland");
    }
}
