//! Normalized sets of cells.

use super::CellId;

/// Sorted collection of cells, possibly at mixed levels
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellUnion(Vec<CellId>);

impl CellUnion {
    /// Build and normalize in one step
    pub fn from_normalized(ids: Vec<CellId>) -> Self {
        let mut union = Self(ids);
        union.normalize();
        union
    }

    /// Sort, drop duplicates and cells already covered by an ancestor, and
    /// replace every complete group of four siblings by their parent.
    pub fn normalize(&mut self) {
        self.0.sort_unstable();

        let mut output: Vec<CellId> = Vec::with_capacity(self.0.len());
        for &cell in &self.0 {
            let mut id = cell;

            if output.last().is_some_and(|last| last.contains(id)) {
                continue;
            }
            while output.last().is_some_and(|last| id.contains(*last)) {
                output.pop();
            }

            while output.len() >= 3 {
                let n = output.len();
                let (a, b, c) = (output[n - 3], output[n - 2], output[n - 1]);
                if id.level() == 0 || !are_siblings(a, b, c, id) {
                    break;
                }
                output.truncate(n - 3);
                id = id.parent(id.level() - 1);
            }

            output.push(id);
        }

        self.0 = output;
    }

    pub fn contains(&self, id: CellId) -> bool {
        // ranges are sorted and disjoint, so an ancestor sits next to the insertion point
        match self.0.binary_search(&id) {
            Ok(_) => true,
            Err(pos) => {
                (pos < self.0.len() && self.0[pos].contains(id))
                    || (pos > 0 && self.0[pos - 1].contains(id))
            }
        }
    }

    pub fn cell_ids(&self) -> &[CellId] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn are_siblings(a: CellId, b: CellId, c: CellId, d: CellId) -> bool {
    if a.level() != d.level() || b.level() != d.level() || c.level() != d.level() {
        return false;
    }
    let parent = d.parent(d.level() - 1);
    [a, b, c].iter().all(|x| x.parent(d.level() - 1) == parent)
        && a != b
        && b != c
        && a != c
}

impl From<CellUnion> for Vec<CellId> {
    fn from(union: CellUnion) -> Self {
        union.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_siblings() {
        let parent = CellId::from_ij(3, 1, 4);
        let mut ids = parent.children().to_vec();
        ids.reverse();
        let union = CellUnion::from_normalized(ids);
        assert_eq!(union.cell_ids(), &[parent]);
    }

    #[test]
    fn test_normalize_collapses_recursively() {
        let grandparent = CellId::from_ij(0, 0, 2);
        let ids: Vec<CellId> = grandparent
            .children()
            .iter()
            .flat_map(|c| c.children())
            .collect();
        let union = CellUnion::from_normalized(ids);
        assert_eq!(union.cell_ids(), &[grandparent]);
    }

    #[test]
    fn test_normalize_drops_duplicates_and_descendants() {
        let parent = CellId::from_ij(3, 1, 4);
        let child = parent.children()[2];
        let other = CellId::from_ij(9, 9, 4);
        let union = CellUnion::from_normalized(vec![child, other, parent, parent]);
        assert_eq!(union.len(), 2);
        assert!(union.contains(child));
        assert!(union.contains(parent));
        assert!(union.contains(other));
    }

    #[test]
    fn test_three_siblings_stay_apart() {
        let parent = CellId::from_ij(2, 2, 3);
        let ids = parent.children()[..3].to_vec();
        let union = CellUnion::from_normalized(ids);
        assert_eq!(union.len(), 3);
        assert!(!union.contains(parent));
        assert!(!union.contains(parent.children()[3]));
    }
}
