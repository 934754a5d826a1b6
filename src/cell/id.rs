//! Hierarchical cell identifiers over the lat/lon plane.
//!
//! Level 0 is the whole plane [-180, 180] x [-90, 90]. Every level splits each
//! cell into four equal quadrants, so level `L` is a `2^L x 2^L` grid.
//!
//! An id stores the Z-order position of the cell followed by a single sentinel
//! bit; the number of trailing zeros encodes the level. This gives ids a total
//! order in which every descendant sorts within its ancestor's range, and turns
//! "ancestor at level d" into a bit mask.

use std::fmt;
use std::str::FromStr;

use crate::models::Coordinate;

/// Deepest supported subdivision level
pub const MAX_LEVEL: u8 = 30;

const POS_BITS: u32 = 2 * MAX_LEVEL as u32 + 1;

/// Identifier of a cell at some level of the hierarchy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(u64);

impl CellId {
    /// The level-0 cell covering the whole plane
    pub const ROOT: CellId = CellId(1 << (POS_BITS - 1));

    /// Cell at grid position (`i` = column from west, `j` = row from south)
    pub fn from_ij(i: u32, j: u32, level: u8) -> Self {
        check_level(level);
        let morton = interleave(i, j, level);
        CellId(((morton << 1) | 1) << (2 * (MAX_LEVEL - level) as u32))
    }

    /// Cell containing the coordinate at the given level.
    ///
    /// Points on a shared edge belong to the cell to their north/east; the
    /// outer edges of the plane belong to the outermost cells.
    pub fn from_coordinate(coordinate: Coordinate, level: u8) -> Self {
        check_level(level);
        let i = grid_index(coordinate.lon, -180.0, 360.0, level);
        let j = grid_index(coordinate.lat, -90.0, 180.0, level);
        Self::from_ij(i, j, level)
    }

    pub fn level(self) -> u8 {
        MAX_LEVEL - (self.0.trailing_zeros() / 2) as u8
    }

    pub fn is_valid(self) -> bool {
        self.0 != 0 && self.0 >> POS_BITS == 0 && self.0.trailing_zeros() % 2 == 0
    }

    fn lsb(self) -> u64 {
        self.0 & self.0.wrapping_neg()
    }

    /// Ancestor at `level`, which must not be deeper than this cell
    pub fn parent(self, level: u8) -> Self {
        assert!(
            level <= self.level(),
            "parent level {} is deeper than cell level {}",
            level,
            self.level()
        );
        let lsb = lsb_for_level(level);
        CellId((self.0 & lsb.wrapping_neg()) | lsb)
    }

    /// The four children in id order
    pub fn children(self) -> [CellId; 4] {
        assert!(self.level() < MAX_LEVEL, "leaf cells have no children");
        let lsb = self.lsb();
        let first = self.0 - lsb + (lsb >> 2);
        let step = lsb >> 1;
        [
            CellId(first),
            CellId(first + step),
            CellId(first + 2 * step),
            CellId(first + 3 * step),
        ]
    }

    /// Smallest and largest leaf-level ids under this cell
    fn range(self) -> (u64, u64) {
        let lsb = self.lsb();
        (self.0 - (lsb - 1), self.0 + (lsb - 1))
    }

    /// True if `other` is this cell or one of its descendants
    pub fn contains(self, other: CellId) -> bool {
        let (min, max) = self.range();
        min <= other.0 && other.0 <= max
    }

    /// Grid position (column, row) at this cell's own level
    pub fn ij(self) -> (u32, u32) {
        let level = self.level();
        let morton = self.0 >> (2 * (MAX_LEVEL - level) as u32 + 1);
        deinterleave(morton, level)
    }

    /// Quadkey digits from the root down, one per level
    pub fn to_token(self) -> String {
        let level = self.level();
        let morton = self.0 >> (2 * (MAX_LEVEL - level) as u32 + 1);
        (0..level)
            .rev()
            .map(|l| char::from(b'0' + ((morton >> (2 * l as u32)) & 3) as u8))
            .collect()
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.level() == 0 {
            write!(f, "root")
        } else {
            write!(f, "{}", self.to_token())
        }
    }
}

/// Error returned when a quadkey token cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidToken(pub String);

impl fmt::Display for InvalidToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid cell token '{}' (expected digits 0-3, at most {} of them)",
            self.0, MAX_LEVEL
        )
    }
}

impl std::error::Error for InvalidToken {}

impl FromStr for CellId {
    type Err = InvalidToken;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "root" {
            return Ok(CellId::ROOT);
        }
        if s.is_empty() || s.len() > MAX_LEVEL as usize {
            return Err(InvalidToken(s.to_string()));
        }

        let mut morton = 0u64;
        for b in s.bytes() {
            match b {
                b'0'..=b'3' => morton = (morton << 2) | u64::from(b - b'0'),
                _ => return Err(InvalidToken(s.to_string())),
            }
        }

        let level = s.len() as u8;
        Ok(CellId(((morton << 1) | 1) << (2 * (MAX_LEVEL - level) as u32)))
    }
}

fn check_level(level: u8) {
    assert!(
        level <= MAX_LEVEL,
        "cell level {} exceeds maximum {}",
        level,
        MAX_LEVEL
    );
}

fn lsb_for_level(level: u8) -> u64 {
    1 << (2 * (MAX_LEVEL - level) as u32)
}

/// Western (or southern) edge of grid slot `index`
pub(crate) fn grid_edge(index: u32, origin: f64, span: f64, level: u8) -> f64 {
    // span / 2^level is exact for both axes, so edges carry no rounding error
    origin + f64::from(index) * (span / (1u64 << level) as f64)
}

fn grid_index(value: f64, origin: f64, span: f64, level: u8) -> u32 {
    let n = 1u64 << level;
    let max = (n - 1) as u32;
    let estimate = ((value - origin) / span * n as f64).floor();
    let mut index = if estimate <= 0.0 || estimate.is_nan() {
        0
    } else if estimate >= max as f64 {
        max
    } else {
        estimate as u32
    };

    // The division above may round across an edge; settle against exact edges.
    while index > 0 && value < grid_edge(index, origin, span, level) {
        index -= 1;
    }
    while index < max && value >= grid_edge(index + 1, origin, span, level) {
        index += 1;
    }
    index
}

fn interleave(i: u32, j: u32, level: u8) -> u64 {
    let mut morton = 0u64;
    for bit in 0..level as u32 {
        morton |= u64::from((i >> bit) & 1) << (2 * bit);
        morton |= u64::from((j >> bit) & 1) << (2 * bit + 1);
    }
    morton
}

fn deinterleave(morton: u64, level: u8) -> (u32, u32) {
    let mut i = 0u32;
    let mut j = 0u32;
    for bit in 0..level as u32 {
        i |= (((morton >> (2 * bit)) & 1) as u32) << bit;
        j |= (((morton >> (2 * bit + 1)) & 1) as u32) << bit;
    }
    (i, j)
}
