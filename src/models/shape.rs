//! Closed polygonal rings and their exact-containment primitives.

use geo::{BoundingRect, Coord, Intersects, LineString, Polygon, Rect, Winding};

use super::Coordinate;

/// A closed polygonal ring (optionally with holes).
///
/// Containment is closed: a point lying exactly on the ring counts as inside.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    polygon: Polygon<f64>,
}

impl Shape {
    pub fn new(polygon: Polygon<f64>) -> Self {
        Self { polygon }
    }

    /// Build a hole-free shape from an ordered ring of coordinates.
    ///
    /// The ring is closed automatically if the last coordinate differs from the first.
    pub fn from_coordinates<I>(coords: I) -> Self
    where
        I: IntoIterator<Item = Coordinate>,
    {
        let ring: Vec<Coord<f64>> = coords.into_iter().map(Coord::from).collect();
        Self::new(Polygon::new(LineString::from(ring), vec![]))
    }

    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// Exterior ring vertices, without the closing duplicate.
    pub fn coordinates(&self) -> Vec<Coordinate> {
        let ring = &self.polygon.exterior().0;
        ring[..self.vertex_count()]
            .iter()
            .copied()
            .map(Coordinate::from)
            .collect()
    }

    /// Number of exterior ring vertices, not counting the closing duplicate
    pub fn vertex_count(&self) -> usize {
        let ring = &self.polygon.exterior().0;
        match (ring.first(), ring.last()) {
            (Some(first), Some(last)) if ring.len() > 1 && first == last => ring.len() - 1,
            _ => ring.len(),
        }
    }

    /// Exact closed-region containment test
    pub fn contains(&self, coordinate: Coordinate) -> bool {
        self.polygon.intersects(&Coord::from(coordinate))
    }

    /// Axis-aligned bounds in (lon, lat) space; None for an empty ring
    pub fn bounding_box(&self) -> Option<Rect<f64>> {
        self.polygon.bounding_rect()
    }

    pub fn is_clockwise(&self) -> bool {
        self.polygon.exterior().is_cw()
    }

    /// Same shape with every ring walked in the opposite direction
    pub fn reversed(&self) -> Self {
        fn reverse(ring: &LineString<f64>) -> LineString<f64> {
            LineString::from(ring.0.iter().rev().copied().collect::<Vec<_>>())
        }

        let exterior = reverse(self.polygon.exterior());
        let interiors = self.polygon.interiors().iter().map(reverse).collect();
        Self::new(Polygon::new(exterior, interiors))
    }

    /// A ring with fewer than three distinct vertices encloses no area.
    pub fn is_degenerate(&self) -> bool {
        let mut coords = self.coordinates();
        coords.dedup();
        if coords.len() > 1 && coords.first() == coords.last() {
            coords.pop();
        }
        coords.len() < 3
    }
}

impl From<Polygon<f64>> for Shape {
    fn from(polygon: Polygon<f64>) -> Self {
        Self::new(polygon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Shape {
        Shape::from_coordinates([
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(1.0, 0.0),
        ])
    }

    #[test]
    fn test_contains_interior_and_boundary() {
        let shape = square();
        assert!(shape.contains(Coordinate::new(0.5, 0.5)));
        assert!(shape.contains(Coordinate::new(0.0, 0.5)));
        assert!(shape.contains(Coordinate::new(1.0, 1.0)));
        assert!(!shape.contains(Coordinate::new(1.5, 0.5)));
    }

    #[test]
    fn test_coordinates_drop_closing_vertex() {
        assert_eq!(square().coordinates().len(), 4);
        assert_eq!(square().vertex_count(), 4);
    }

    #[test]
    fn test_winding() {
        // east, north, west in (lon, lat) space
        let shape = square();
        assert!(!shape.is_clockwise());
        assert!(shape.reversed().is_clockwise());
        assert!(shape.reversed().contains(Coordinate::new(0.5, 0.5)));
    }

    #[test]
    fn test_bounding_box() {
        let rect = square().bounding_box().unwrap();
        assert_eq!(rect.min(), Coord { x: 0.0, y: 0.0 });
        assert_eq!(rect.max(), Coord { x: 1.0, y: 1.0 });
    }

    #[test]
    fn test_degenerate() {
        assert!(!square().is_degenerate());
        assert!(Shape::from_coordinates([Coordinate::new(3.0, 3.0)]).is_degenerate());
        assert!(Shape::from_coordinates([
            Coordinate::new(3.0, 3.0),
            Coordinate::new(4.0, 4.0),
        ])
        .is_degenerate());
        assert!(Shape::from_coordinates(Vec::new()).is_degenerate());
    }
}
