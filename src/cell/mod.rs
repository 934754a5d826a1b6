//! Hierarchical spatial cells and fixed-level region coverings.
//!
//! The cell-covering fence precomputes, per shape, which cells of one level
//! touch the shape and which lie entirely inside it.

mod coverer;
mod geometry;
mod id;
mod union;

pub use coverer::{FlatCoverer, ShapeRegion};
pub use geometry::Cell;
pub use id::{CellId, InvalidToken, MAX_LEVEL};
pub use union::CellUnion;
