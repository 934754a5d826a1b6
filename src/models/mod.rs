//! Geometry primitives shared by every fence strategy.

pub mod coordinate;
pub mod feature;
pub mod shape;

pub use coordinate::Coordinate;
pub use feature::{Feature, FeatureArena, FeatureId, FeatureSummary};
pub use shape::Shape;
