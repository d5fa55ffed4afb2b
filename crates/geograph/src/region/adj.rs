use geo::{Distance, Euclidean, Intersects};

use crate::adj::AdjacencyMatrix;
use crate::unit::UnitId;

use super::Region;

impl Region {
    /// Returns `true` if `a` and `b` lie within `tol` degrees of each other
    /// (planar distance, so touching or overlapping units are always near).
    pub fn is_near(&self, a: UnitId, b: UnitId, tol: f64) -> bool {
        let (ga, gb) = (self.geometry(a), self.geometry(b));
        ga.intersects(gb) || (tol > 0.0 && Euclidean.distance(ga, gb) <= tol)
    }

    /// Returns `true` if `a` and `b` are neighbours under the buffered
    /// adjacency relation.
    pub fn are_adjacent(&self, a: UnitId, b: UnitId) -> bool {
        self.adjacency().contains(a, b)
    }

    /// Sorted slice of buffered-adjacent units for `unit`.
    pub fn neighbors(&self, unit: UnitId) -> &[UnitId] {
        self.adjacency().neighbors(unit)
    }

    /// All units other than `unit` lying within `tol` degrees of it, sorted.
    pub fn within(&self, unit: UnitId, tol: f64) -> Vec<UnitId> {
        let mut out: Vec<UnitId> = self.bbox_candidates(unit, tol)
            .filter(|&other| other != unit && self.is_near(unit, other, tol))
            .collect();
        out.sort_unstable();
        out
    }

    /// Returns `true` if any unit of `others` lies within `tol` degrees of
    /// `unit`.  `unit` itself is skipped if present in `others`.
    pub fn any_within(&self, unit: UnitId, others: impl IntoIterator<Item = UnitId>, tol: f64) -> bool {
        others.into_iter().any(|other| other != unit && self.is_near(unit, other, tol))
    }

    /// The buffered adjacency matrix (distance <= region tolerance).
    /// Built lazily on first call.  `touching` is a subset of this.
    pub fn adjacency(&self) -> &AdjacencyMatrix {
        self.adj.get_or_init(|| self.build_matrix(self.tolerance))
    }

    /// Returns `true` once `adjacency` has been computed.
    pub fn is_adjacency_built(&self) -> bool {
        self.adj.get().is_some()
    }

    /// The contact adjacency matrix (shared point).  Built lazily on first call.
    pub fn touching(&self) -> &AdjacencyMatrix {
        self.touching.get_or_init(|| self.build_matrix(0.0))
    }

    fn build_matrix(&self, tol: f64) -> AdjacencyMatrix {
        let mut lists = vec![Vec::new(); self.num_units()];
        for a in self.unit_ids() {
            for b in self.bbox_candidates(a, tol) {
                if b <= a { continue }
                if self.is_near(a, b, tol) {
                    lists[a.index()].push(b);
                    lists[b.index()].push(a);
                }
            }
        }
        AdjacencyMatrix::from_lists(lists)
    }
}
