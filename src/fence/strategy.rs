//! Fence strategy labels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FenceError;

/// Indexing strategy of a fence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Linear scan over every shape
    Brute,
    /// Per-shape bounding box pre-filter
    Bbox,
    /// R-tree over shape bounding boxes
    #[default]
    Rtree,
    /// Fixed-level cell coverings with interior shortcuts
    #[serde(alias = "s2")]
    CellCovering,
}

impl Strategy {
    pub fn all() -> &'static [Strategy] {
        &[
            Strategy::Brute,
            Strategy::Bbox,
            Strategy::Rtree,
            Strategy::CellCovering,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Brute => "brute",
            Strategy::Bbox => "bbox",
            Strategy::Rtree => "rtree",
            Strategy::CellCovering => "cell_covering",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Strategy {
    type Err = FenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "brute" => Ok(Strategy::Brute),
            "bbox" => Ok(Strategy::Bbox),
            "rtree" => Ok(Strategy::Rtree),
            "cell_covering" | "s2" => Ok(Strategy::CellCovering),
            _ => Err(FenceError::UnknownStrategy(s.to_string())),
        }
    }
}
