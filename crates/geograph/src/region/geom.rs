use geo::{BooleanOps, GeodesicArea, Intersects, MultiPolygon, Rect};

use crate::unit::UnitId;

use super::Region;

/// Lengths below this are reported as exactly zero.
const BOUNDARY_EPSILON: f64 = 1e-9;

impl Region {
    /// Axis-aligned bounding box of `unit` in lon/lat.
    pub fn bounds(&self, unit: UnitId) -> Rect<f64> {
        self.bounds[unit.index()]
    }

    /// Geodesic perimeter of `unit` in m (includes hole boundaries).
    pub fn perimeter(&self, unit: UnitId) -> f64 {
        self.geometry(unit).geodesic_perimeter()
    }

    /// Geometric union of all unit polygons in `units`.
    /// Returns an empty `MultiPolygon` for an empty subset.
    pub fn union_of(&self, units: impl IntoIterator<Item = UnitId>) -> MultiPolygon<f64> {
        units.into_iter().fold(MultiPolygon::new(vec![]), |acc, unit| {
            if acc.0.is_empty() { self.geometry(unit).clone() } else { acc.union(self.geometry(unit)) }
        })
    }

    /// Length of the boundary `unit` shares with the union of `others`, in m.
    ///
    /// Computed as `(P(a) + P(b) - P(a ∪ b)) / 2` over geodesic perimeters.
    /// `unit` is ignored if present in `others`; returns `0.0` when the two
    /// sides do not touch.
    pub fn shared_boundary_length(&self, unit: UnitId, others: impl IntoIterator<Item = UnitId>) -> f64 {
        let others = self.union_of(others.into_iter().filter(|&other| other != unit));
        if others.0.is_empty() { return 0.0 }
        shared_perimeter(self.geometry(unit), &others)
    }
}

/// Length of the common boundary of two polygon sets, in m.
pub fn shared_perimeter(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> f64 {
    if !a.intersects(b) { return 0.0 }
    let shared = (a.geodesic_perimeter() + b.geodesic_perimeter() - a.union(b).geodesic_perimeter()) / 2.0;
    if shared > BOUNDARY_EPSILON { shared } else { 0.0 }
}
