//! Cell-covering fence.
//!
//! Every shape is covered with cells of one fixed level. Cells touching the
//! shape are registered in a lookup table; the subset lying entirely inside the
//! shape is remembered per shape. A query computes the single cell holding the
//! point and only falls back to an exact containment test when that cell is on
//! the shape's boundary.

use hashbrown::{HashMap, HashSet};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

use super::GeoFence;
use crate::cell::{Cell, CellId, FlatCoverer, ShapeRegion};
use crate::models::{Coordinate, Feature, FeatureArena, FeatureId};

/// Interior cells of one shape of one feature
#[derive(Debug, Clone)]
struct Cover {
    feature: FeatureId,
    shape: usize,
    interior: HashSet<CellId>,
}

/// Covering of one shape, computed before the feature is stored
#[derive(Debug)]
struct ShapeCover {
    shape: usize,
    covering: Vec<CellId>,
    interior: HashSet<CellId>,
}

#[derive(Debug, Clone)]
pub struct CellFence {
    coverer: FlatCoverer,
    features: FeatureArena,
    covers: Vec<Cover>,
    /// Cell -> indices into `covers` of every shape touching that cell
    table: HashMap<CellId, Vec<usize>>,
}

impl CellFence {
    /// Fence covering shapes at `resolution`; panics above [`crate::cell::MAX_LEVEL`]
    pub fn new(resolution: u8) -> Self {
        Self {
            coverer: FlatCoverer::new(resolution),
            features: FeatureArena::new(),
            covers: Vec::new(),
            table: HashMap::new(),
        }
    }

    pub fn resolution(&self) -> u8 {
        self.coverer.level()
    }

    /// Add many features, computing their coverings in parallel.
    ///
    /// Features are stored in iteration order, so results match a sequence of
    /// [`GeoFence::add`] calls.
    pub fn extend<I>(&mut self, features: I)
    where
        I: IntoIterator<Item = Arc<Feature>>,
    {
        let features: Vec<Arc<Feature>> = features.into_iter().collect();
        let coverer = self.coverer;
        let covers: Vec<Vec<ShapeCover>> = features
            .par_iter()
            .map(|feature| cover_shapes(coverer, feature))
            .collect();

        for (feature, shape_covers) in features.into_iter().zip(covers) {
            let id = self.features.insert(feature);
            self.install(id, shape_covers);
        }

        info!(
            "Cell fence at level {} holds {} features, {} covers over {} cells",
            self.resolution(),
            self.features.len(),
            self.covers.len(),
            self.table.len()
        );
    }

    fn install(&mut self, feature: FeatureId, shape_covers: Vec<ShapeCover>) {
        for sc in shape_covers {
            let index = self.covers.len();
            self.covers.push(Cover {
                feature,
                shape: sc.shape,
                interior: sc.interior,
            });
            for cell in sc.covering {
                self.table.entry(cell).or_default().push(index);
            }
        }
    }

    /// Number of distinct cells with at least one registered shape
    pub fn cell_count(&self) -> usize {
        self.table.len()
    }

    /// Number of indexed shapes
    pub fn cover_count(&self) -> usize {
        self.covers.len()
    }
}

fn cover_shapes(coverer: FlatCoverer, feature: &Feature) -> Vec<ShapeCover> {
    let mut covers = Vec::with_capacity(feature.shapes.len());

    for (index, shape) in feature.shapes.iter().enumerate() {
        if shape.is_degenerate() {
            debug!(
                "Skipping degenerate shape {} of feature {:?}",
                index, feature.id
            );
            continue;
        }

        let region = ShapeRegion::new(shape);
        let covering = coverer.covering(&region);
        if covering.is_empty() {
            debug!(
                "Shape {} of feature {:?} has no cells at level {}, not indexed",
                index,
                feature.id,
                coverer.level()
            );
            continue;
        }

        let interior = covering
            .iter()
            .copied()
            .filter(|&id| region.contains_cell(&Cell::from_id(id)))
            .collect();

        covers.push(ShapeCover {
            shape: index,
            covering,
            interior,
        });
    }

    covers
}

fn in_plane(coordinate: Coordinate) -> bool {
    (-90.0..=90.0).contains(&coordinate.lat) && (-180.0..=180.0).contains(&coordinate.lon)
}

impl GeoFence for CellFence {
    fn add(&mut self, feature: Arc<Feature>) {
        let shape_covers = cover_shapes(self.coverer, &feature);
        let id = self.features.insert(feature);
        self.install(id, shape_covers);
    }

    /// A feature appears once per indexed shape containing the point
    fn get(&self, coordinate: Coordinate) -> Vec<Arc<Feature>> {
        let cell = CellId::from_coordinate(coordinate, self.resolution());
        let Some(entries) = self.table.get(&cell) else {
            return Vec::new();
        };

        // out-of-range points are clamped into an edge cell they don't lie in
        let shortcut = in_plane(coordinate);

        entries
            .iter()
            .filter_map(|&index| {
                let cover = &self.covers[index];
                let feature = self.features.get(cover.feature);
                let hit = (shortcut && cover.interior.contains(&cell))
                    || feature.shapes[cover.shape].contains(coordinate);
                hit.then(|| Arc::clone(feature))
            })
            .collect()
    }

    fn len(&self) -> usize {
        self.features.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Shape;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn square(min_lat: f64, min_lon: f64, size: f64) -> Shape {
        Shape::from_coordinates([
            Coordinate::new(min_lat, min_lon),
            Coordinate::new(min_lat, min_lon + size),
            Coordinate::new(min_lat + size, min_lon + size),
            Coordinate::new(min_lat + size, min_lon),
        ])
    }

    /// Star-shaped ring with random radii around a centre
    fn random_star(rng: &mut StdRng, lat: f64, lon: f64, radius: f64) -> Shape {
        let vertices = rng.gen_range(5..14);
        let coords = (0..vertices).map(|k| {
            let angle = k as f64 / vertices as f64 * std::f64::consts::TAU;
            let r = radius * rng.gen_range(0.3..1.0);
            Coordinate::new(lat + r * angle.sin(), lon + r * angle.cos())
        });
        Shape::from_coordinates(coords.collect::<Vec<_>>())
    }

    #[test]
    fn test_square_scenario() {
        let mut fence = CellFence::new(10);
        let feature = Arc::new(Feature::new(vec![square(40.0, -100.0, 4.0)]).with_id("f1"));
        fence.add(Arc::clone(&feature));

        let centre = fence.get(Coordinate::new(42.0, -98.0));
        assert_eq!(centre.len(), 1);
        assert!(Arc::ptr_eq(&centre[0], &feature));

        // roughly 1000 km south of the box
        assert!(fence.get(Coordinate::new(31.0, -98.0)).is_empty());

        let edge = fence.get(Coordinate::new(40.0, -98.0));
        assert_eq!(edge.len(), 1);
        let corner = fence.get(Coordinate::new(44.0, -96.0));
        assert_eq!(corner.len(), 1);
    }

    #[test]
    fn test_centre_resolves_through_interior_cell() {
        let mut fence = CellFence::new(8);
        fence.add(Arc::new(Feature::new(vec![square(0.0, 0.0, 20.0)])));

        let point = Coordinate::new(10.0, 10.0);
        let cell = CellId::from_coordinate(point, 8);
        let cover = &fence.covers[fence.table[&cell][0]];
        assert!(cover.interior.contains(&cell));
    }

    #[test]
    fn test_degenerate_shape_never_matches() {
        let mut fence = CellFence::new(12);
        let point = Coordinate::new(12.5, 7.25);
        fence.add(Arc::new(Feature::new(vec![Shape::from_coordinates([point])])));

        assert_eq!(fence.len(), 1);
        assert_eq!(fence.cover_count(), 0);
        assert!(fence.get(point).is_empty());
    }

    #[test]
    fn test_shape_smaller_than_a_cell_is_dropped() {
        let mut fence = CellFence::new(2);
        fence.add(Arc::new(Feature::new(vec![square(10.0, 10.0, 1.0)])));
        assert_eq!(fence.cover_count(), 0);
        assert!(fence.get(Coordinate::new(10.5, 10.5)).is_empty());
    }

    #[test]
    fn test_clockwise_input_is_indexed() {
        let mut fence = CellFence::new(9);
        let cw = square(-30.0, 140.0, 5.0).reversed();
        assert!(cw.is_clockwise());
        fence.add(Arc::new(Feature::new(vec![cw])));
        assert_eq!(fence.get(Coordinate::new(-27.5, 142.5)).len(), 1);
    }

    #[test]
    fn test_extend_matches_sequential_add() {
        let mut rng = StdRng::seed_from_u64(7);
        let features: Vec<Arc<Feature>> = (0..20)
            .map(|i| {
                let lat = rng.gen_range(-60.0..60.0);
                let lon = rng.gen_range(-170.0..170.0);
                Arc::new(Feature::new(vec![random_star(&mut rng, lat, lon, 6.0)]).with_id(i.to_string()))
            })
            .collect();

        let mut sequential = CellFence::new(9);
        for f in &features {
            sequential.add(Arc::clone(f));
        }
        let mut bulk = CellFence::new(9);
        bulk.extend(features.iter().cloned());

        assert_eq!(sequential.cover_count(), bulk.cover_count());
        assert_eq!(sequential.cell_count(), bulk.cell_count());

        for _ in 0..500 {
            let p = Coordinate::new(rng.gen_range(-70.0..70.0), rng.gen_range(-180.0..180.0));
            let a: Vec<_> = sequential.get(p).iter().map(|f| f.id.clone()).collect();
            let b: Vec<_> = bulk.get(p).iter().map(|f| f.id.clone()).collect();
            assert_eq!(a, b);
        }
    }

    /// Points answered from an interior cell must also pass the exact test.
    #[test]
    fn test_no_false_shortcut() {
        let mut rng = StdRng::seed_from_u64(42);

        for level in [6u8, 9, 12] {
            for _ in 0..10 {
                let lat = rng.gen_range(-50.0..50.0);
                let lon = rng.gen_range(-150.0..150.0);
                let radius = rng.gen_range(2.0..15.0);
                let shape = random_star(&mut rng, lat, lon, radius);

                let mut fence = CellFence::new(level);
                fence.add(Arc::new(Feature::new(vec![shape.clone()])));
                if fence.cover_count() == 0 {
                    continue;
                }
                let cover = &fence.covers[0];

                for _ in 0..400 {
                    let p = Coordinate::new(
                        lat + rng.gen_range(-radius..radius),
                        lon + rng.gen_range(-radius..radius),
                    );
                    let cell = CellId::from_coordinate(p, level);
                    if cover.interior.contains(&cell) {
                        assert!(shape.contains(p), "interior cell {} at {} is not inside", cell, p);
                    }
                    assert_eq!(fence.get(p).len(), usize::from(shape.contains(p)), "at {}", p);
                }

                // every ring vertex lies on the boundary and must be found
                for v in shape.coordinates() {
                    assert_eq!(fence.get(v).len(), 1, "vertex {} level {}", v, level);
                }
            }
        }
    }

    #[test]
    fn test_point_outside_plane_skips_shortcut() {
        let mut fence = CellFence::new(4);
        fence.add(Arc::new(Feature::new(vec![square(45.0, 0.0, 45.0)])));
        // clamped into the northernmost row, but not inside the shape
        assert!(fence.get(Coordinate::new(95.0, 20.0)).is_empty());
        assert_eq!(fence.get(Coordinate::new(89.0, 20.0)).len(), 1);
    }
}
