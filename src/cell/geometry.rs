//! Rectangles of hierarchical cells.

use geo::{Coord, Rect};

use super::id::{grid_edge, CellId};

/// The lat/lon rectangle covered by a [`CellId`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    id: CellId,
    rect: Rect<f64>,
}

impl Cell {
    pub fn from_id(id: CellId) -> Self {
        let level = id.level();
        let (i, j) = id.ij();
        let min = Coord {
            x: grid_edge(i, -180.0, 360.0, level),
            y: grid_edge(j, -90.0, 180.0, level),
        };
        let max = Coord {
            x: grid_edge(i + 1, -180.0, 360.0, level),
            y: grid_edge(j + 1, -90.0, 180.0, level),
        };
        Self {
            id,
            rect: Rect::new(min, max),
        }
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn rect(&self) -> Rect<f64> {
        self.rect
    }

    /// Corner `k` (mod 4), counter-clockwise starting from the south-west corner
    pub fn vertex(&self, k: usize) -> Coord<f64> {
        let (min, max) = (self.rect.min(), self.rect.max());
        match k % 4 {
            0 => min,
            1 => Coord { x: max.x, y: min.y },
            2 => max,
            _ => Coord { x: min.x, y: max.y },
        }
    }

    pub fn center(&self) -> Coord<f64> {
        self.rect.center()
    }
}

impl From<CellId> for Cell {
    fn from(id: CellId) -> Self {
        Self::from_id(id)
    }
}
