//! Fixed-level coverings of polygonal regions.

use geo::{Coord, Intersects, Line, Polygon, Rect};
use std::iter;

use super::{Cell, CellId, CellUnion, MAX_LEVEL};
use crate::models::{Coordinate, Shape};

/// A shape prepared for cell classification.
///
/// The exterior ring is normalized to counter-clockwise order on construction.
#[derive(Debug, Clone)]
pub struct ShapeRegion {
    polygon: Polygon<f64>,
    edges: Vec<Line<f64>>,
}

impl ShapeRegion {
    pub fn new(shape: &Shape) -> Self {
        let shape = if shape.is_clockwise() {
            shape.reversed()
        } else {
            shape.clone()
        };
        let polygon = shape.polygon().clone();

        // every ring is closed, so lines() already includes the closing edge
        let edges = iter::once(polygon.exterior())
            .chain(polygon.interiors())
            .flat_map(|ring| ring.lines())
            .collect();

        Self { polygon, edges }
    }

    pub fn bounding_box(&self) -> Option<Rect<f64>> {
        use geo::BoundingRect;
        self.polygon.bounding_rect()
    }

    fn contains_point(&self, point: Coord<f64>) -> bool {
        self.polygon.intersects(&point)
    }

    /// True if the whole cell rectangle lies inside the region.
    pub fn contains_cell(&self, cell: &Cell) -> bool {
        if !(0..4).all(|k| self.contains_point(cell.vertex(k))) {
            return false;
        }

        // Corners alone miss notches and holes reaching into the cell. With no
        // edge entering the open rectangle, the interior is all-in or all-out,
        // and the centre decides which.
        let rect = cell.rect();
        self.contains_point(cell.center())
            && !self
                .edges
                .iter()
                .any(|edge| enters_open_rect(edge, &rect))
    }

    /// True if the cell rectangle touches the region's boundary or interior.
    ///
    /// A region lying strictly inside a single cell does not intersect it by
    /// this test; such shapes are too small for the covering level.
    pub fn intersects_cell(&self, cell: &Cell) -> bool {
        for k in 0..4 {
            let side = Line::new(cell.vertex(k), cell.vertex(k + 1));
            if self.edges.iter().any(|edge| edge.intersects(&side)) {
                return true;
            }
        }
        // No crossing: the cell boundary is entirely inside or outside.
        self.contains_point(cell.vertex(0))
    }
}

/// Liang-Barsky clip of `edge` against `rect`; true if any part of the clipped
/// segment lies strictly inside the rectangle.
fn enters_open_rect(edge: &Line<f64>, rect: &Rect<f64>) -> bool {
    let (min, max) = (rect.min(), rect.max());
    let (start, dx, dy) = (edge.start, edge.end.x - edge.start.x, edge.end.y - edge.start.y);

    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;
    for (p, q) in [
        (-dx, start.x - min.x),
        (dx, max.x - start.x),
        (-dy, start.y - min.y),
        (dy, max.y - start.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return false;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return false;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return false;
            }
            t1 = t1.min(r);
        }
    }

    // a chord of a rectangle is either on one side or has an interior midpoint
    let t = (t0 + t1) / 2.0;
    let x = start.x + t * dx;
    let y = start.y + t * dy;
    min.x < x && x < max.x && min.y < y && y < max.y
}

/// Covers regions with cells of exactly one level
#[derive(Debug, Clone, Copy)]
pub struct FlatCoverer {
    level: u8,
}

impl FlatCoverer {
    pub fn new(level: u8) -> Self {
        assert!(
            level <= MAX_LEVEL,
            "covering level {} exceeds maximum {}",
            level,
            MAX_LEVEL
        );
        Self { level }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    /// Every cell at this level overlapping `rect`, row by row from the south-west
    pub fn fast_covering(&self, rect: Rect<f64>) -> Vec<CellId> {
        let (min, max) = (rect.min(), rect.max());
        let (i0, j0) = CellId::from_coordinate(Coordinate::from(min), self.level).ij();
        let (i1, j1) = CellId::from_coordinate(Coordinate::from(max), self.level).ij();

        let mut cells = Vec::with_capacity(((i1 - i0 + 1) as usize) * ((j1 - j0 + 1) as usize));
        for j in j0..=j1 {
            for i in i0..=i1 {
                cells.push(CellId::from_ij(i, j, self.level));
            }
        }
        cells
    }

    fn candidates(&self, region: &ShapeRegion) -> Vec<CellId> {
        region
            .bounding_box()
            .map(|rect| self.fast_covering(rect))
            .unwrap_or_default()
    }

    /// Cells touching the region's boundary or interior
    pub fn covering(&self, region: &ShapeRegion) -> Vec<CellId> {
        self.candidates(region)
            .into_iter()
            .filter(|&id| region.intersects_cell(&Cell::from_id(id)))
            .collect()
    }

    /// Cells lying entirely inside the region
    pub fn interior_covering(&self, region: &ShapeRegion) -> Vec<CellId> {
        self.candidates(region)
            .into_iter()
            .filter(|&id| region.contains_cell(&Cell::from_id(id)))
            .collect()
    }

    pub fn cell_union(&self, region: &ShapeRegion) -> CellUnion {
        CellUnion::from_normalized(self.covering(region))
    }

    pub fn interior_cell_union(&self, region: &ShapeRegion) -> CellUnion {
        CellUnion::from_normalized(self.interior_covering(region))
    }
}
