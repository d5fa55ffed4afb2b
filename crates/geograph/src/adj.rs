use crate::unit::UnitId;

/// A read-only CSR (Compressed Sparse Row) adjacency matrix over units.
///
/// `offsets[u]..offsets[u+1]` indexes into `neighbors` to give the sorted
/// list of units adjacent to unit `u`.  Supports O(log deg) membership tests
/// via binary search.
///
/// Two matrices are maintained on a `Region`: one for strict contact
/// (`touching`, shared point) and one for buffered proximity (`adjacency`,
/// within the region tolerance, a superset of `touching`).
#[derive(Clone, Debug, Default)]
pub struct AdjacencyMatrix {
    /// CSR row offsets; length = `num_units + 1`.
    offsets: Vec<u32>,
    /// Flattened neighbor lists; sorted within each row.
    neighbors: Vec<UnitId>,
}

impl AdjacencyMatrix {
    /// Build from one (unsorted, possibly duplicated) neighbor list per unit.
    pub fn from_lists(mut lists: Vec<Vec<UnitId>>) -> Self {
        let mut offsets = Vec::with_capacity(lists.len() + 1);
        offsets.push(0u32);

        let mut neighbors = Vec::new();
        for row in lists.iter_mut() {
            row.sort_unstable();
            row.dedup();
            neighbors.extend_from_slice(row);
            offsets.push(neighbors.len() as u32);
        }

        Self { offsets, neighbors }
    }

    /// Number of units covered by this matrix.
    pub fn num_units(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Number of undirected edges (each pair is stored twice).
    pub fn num_edges(&self) -> usize {
        self.neighbors.len() / 2
    }

    /// Sorted slice of units adjacent to `unit`.
    pub fn neighbors(&self, unit: UnitId) -> &[UnitId] {
        let u = unit.index();
        assert!(u < self.num_units(), "{unit} out of range [0, {})", self.num_units());
        &self.neighbors[self.offsets[u] as usize..self.offsets[u + 1] as usize]
    }

    /// Returns `true` if `other` is adjacent to `unit` (binary search).
    pub fn contains(&self, unit: UnitId, other: UnitId) -> bool {
        self.neighbors(unit).binary_search(&other).is_ok()
    }
}
