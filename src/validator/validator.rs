use std::{collections::BTreeSet, sync::Arc};

use log::{error, warn};

use crate::{config::ConsolidationConfig, geom::MunicipalityGeometries, graph::TerritorialGraph, types::UtpLookup};

use super::rank::{UNKNOWN_RANK, rank_of};

/// Rule checks over the hierarchy and municipality geometry.
/// Holds no state besides the graph borrow and its buffer sizes.
pub struct TerritorialValidator<'a> {
    graph: &'a TerritorialGraph,
    change_buffer_deg: f64,
    neighbor_buffer_deg: f64,
}

impl<'a> TerritorialValidator<'a> {
    pub fn new(graph: &'a TerritorialGraph) -> Self {
        Self::with_config(graph, &ConsolidationConfig::default())
    }

    pub fn with_config(graph: &'a TerritorialGraph, config: &ConsolidationConfig) -> Self {
        Self {
            graph,
            change_buffer_deg: config.change_buffer_deg,
            neighbor_buffer_deg: config.neighbor_buffer_deg,
        }
    }

    /// Administrative rank of municipality `code` (lower = more influential).
    pub fn get_administrative_rank(&self, code: u32) -> u8 {
        self.graph.rank_label(code).map_or(UNKNOWN_RANK, rank_of)
    }

    /// Length in metres of the boundary between `code` and the union of the
    /// other members of `target_utp`.
    pub fn get_shared_boundary_length(&self, code: u32, target_utp: &str, geometries: &MunicipalityGeometries) -> f64 {
        let members: Vec<u32> = self.graph.utp_members(target_utp).into_iter().filter(|&m| m != code).collect();
        if members.is_empty() { return 0.0 }
        geometries.shared_boundary_length(code, &members)
    }

    /// Both UTPs hang from the same metro region (or both from none).
    /// Unknown UTPs are never consistent.
    pub fn is_rm_consistent(&self, origin_utp: &str, dest_utp: &str) -> bool {
        match (self.graph.utp_metro(origin_utp), self.graph.utp_metro(dest_utp)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    /// Whether `code` may move to `target_utp`: its current UTP must be
    /// RM-consistent with the target, and some target member must lie within
    /// the change buffer of `code`.
    pub fn is_change_allowed(&self, code: u32, target_utp: &str, geometries: &MunicipalityGeometries) -> bool {
        let UtpLookup::Assigned(current) = self.graph.get_municipality_utp(code) else { return false };
        if !self.is_rm_consistent(&current, target_utp) { return false }

        let members = self.graph.utp_members(target_utp);
        if members.is_empty() { return false }
        geometries.any_within(code, &members, self.change_buffer_deg)
    }

    /// Members of `utp_id` that cannot reach `seat` through touching members.
    /// Logs an error and returns an empty list if the seat has no geometry or
    /// is not a member of the UTP.
    pub fn validate_utp_contiguity(&self, utp_id: &str, geometries: &MunicipalityGeometries, seat: u32) -> Vec<u32> {
        let members = self.graph.utp_members(utp_id);
        if members.is_empty() { return Vec::new() }

        match geometries.unreachable_from(seat, &members) {
            Some(isolated) => {
                if !isolated.is_empty() {
                    warn!("[TerritorialValidator.validate_utp_contiguity] UTP {utp_id} has {} municipalities unreachable from seat {seat}",
                        isolated.len());
                }
                isolated
            }
            None => {
                error!("[TerritorialValidator.validate_utp_contiguity] seat {seat} not found among UTP {utp_id} geometries");
                Vec::new()
            }
        }
    }

    /// UTPs with a member inside the neighbourhood buffer of `code`,
    /// including the municipality's own UTP.  Sorted.
    pub fn get_neighboring_utps(&self, code: u32, geometries: &MunicipalityGeometries) -> Vec<Arc<str>> {
        let mut utps: BTreeSet<Arc<str>> = geometries.within(code, self.neighbor_buffer_deg).into_iter()
            .chain(std::iter::once(code).filter(|&c| geometries.contains(c)))
            .filter_map(|m| self.graph.get_municipality_utp(m).utp().cloned())
            .collect();
        utps.retain(|utp| self.graph.has_utp(utp));
        utps.into_iter().collect()
    }

    /// At least one member of `origin_utp` is adjacent to at least one member of `dest_utp`.
    pub fn are_utps_adjacent(&self, origin_utp: &str, dest_utp: &str, geometries: &MunicipalityGeometries) -> bool {
        let dest: BTreeSet<u32> = self.graph.utp_members(dest_utp).into_iter().collect();
        if dest.is_empty() { return false }
        self.graph.utp_members(origin_utp).into_iter()
            .any(|m| geometries.neighbors(m).iter().any(|n| dest.contains(n)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, MultiPolygon, Polygon};

    fn square(x: f64, y: f64) -> MultiPolygon<f64> {
        let ring = LineString::from(vec![(x, y), (x + 1.0, y), (x + 1.0, y + 1.0), (x, y + 1.0), (x, y)]);
        MultiPolygon::new(vec![Polygon::new(ring, vec![])])
    }

    /// A row of squares 1..=4 at x = 0..3, plus an island 5 far to the east.
    ///
    /// UTP "A" = {1, 2} (RM Norte), UTP "B" = {3, 4, 5} (RM Norte), UTP "C" = {6} with no geometry (no RM).
    fn make_test_fixture() -> (TerritorialGraph, MunicipalityGeometries) {
        let mut graph = TerritorialGraph::new();
        graph.add_utp("A", Some("Norte"));
        graph.add_utp("B", Some("Norte"));
        graph.add_utp("C", Some("SEM_RM"));
        for (code, utp) in [(1, "A"), (2, "A"), (3, "B"), (4, "B"), (5, "B"), (6, "C")] {
            graph.add_municipality(code, &format!("m{code}"), utp);
        }
        graph.set_rank_label(1, "Capital Regional A");

        let geoms = MunicipalityGeometries::new(
            vec![(1, square(0.0, 0.0)), (2, square(1.0, 0.0)), (3, square(2.0, 0.0)), (4, square(3.0, 0.0)), (5, square(10.0, 0.0))],
            0.001,
        ).unwrap();
        (graph, geoms)
    }

    #[test]
    fn administrative_rank_uses_graph_labels() {
        let (graph, _) = make_test_fixture();
        let validator = TerritorialValidator::new(&graph);
        assert_eq!(validator.get_administrative_rank(1), 4);
        assert_eq!(validator.get_administrative_rank(2), UNKNOWN_RANK);
    }

    #[test]
    fn shared_boundary_with_neighbouring_utp() {
        let (graph, geoms) = make_test_fixture();
        let validator = TerritorialValidator::new(&graph);
        assert!(validator.get_shared_boundary_length(2, "B", &geoms) > 100_000.0);
        assert_eq!(validator.get_shared_boundary_length(1, "B", &geoms), 0.0);
        assert_eq!(validator.get_shared_boundary_length(6, "C", &geoms), 0.0);
    }

    #[test]
    fn rm_consistency() {
        let (graph, _) = make_test_fixture();
        let validator = TerritorialValidator::new(&graph);
        assert!(validator.is_rm_consistent("A", "B"));
        assert!(!validator.is_rm_consistent("A", "C"));
        assert!(!validator.is_rm_consistent("A", "Z"));
    }

    #[test]
    fn change_requires_rm_and_proximity() {
        let (graph, geoms) = make_test_fixture();
        let validator = TerritorialValidator::new(&graph);
        assert!(validator.is_change_allowed(2, "B", &geoms));
        assert!(!validator.is_change_allowed(1, "B", &geoms));
        assert!(!validator.is_change_allowed(2, "C", &geoms));
    }

    #[test]
    fn contiguity_reports_exclave() {
        let (graph, geoms) = make_test_fixture();
        let validator = TerritorialValidator::new(&graph);
        assert_eq!(validator.validate_utp_contiguity("B", &geoms, 3), vec![5]);
        assert!(validator.validate_utp_contiguity("A", &geoms, 1).is_empty());
    }

    #[test]
    fn contiguity_with_unknown_seat_is_empty() {
        let (graph, geoms) = make_test_fixture();
        let validator = TerritorialValidator::new(&graph);
        assert!(validator.validate_utp_contiguity("B", &geoms, 1).is_empty());
    }

    #[test]
    fn neighbouring_utps_within_buffer() {
        let (graph, geoms) = make_test_fixture();
        let validator = TerritorialValidator::new(&graph);
        let utps: Vec<String> = validator.get_neighboring_utps(2, &geoms).iter().map(|s| s.to_string()).collect();
        assert_eq!(utps, vec!["A", "B"]);
        assert!(validator.get_neighboring_utps(6, &geoms).is_empty());
    }

    #[test]
    fn utp_adjacency_through_any_member_pair() {
        let (graph, geoms) = make_test_fixture();
        let validator = TerritorialValidator::new(&graph);
        assert!(validator.are_utps_adjacent("A", "B", &geoms));
        assert!(!validator.are_utps_adjacent("A", "C", &geoms));
    }
}
