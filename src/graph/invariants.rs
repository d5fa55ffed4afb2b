use crate::types::{NodeId, NodeType};

use super::TerritorialGraph;

impl TerritorialGraph {
    /// Check the structural invariants of the hierarchy and seat registry.
    /// Returns one human-readable line per violation; empty when consistent.
    pub fn check_invariants(&self) -> Vec<String> {
        let mut violations = Vec::new();

        for id in self.nodes_of_type(NodeType::Municipality) {
            let utp_parents = self.parents_of(&id).filter(|p| p.node_type() == NodeType::Utp).count();
            if utp_parents != 1 {
                violations.push(format!("municipality {id} has {utp_parents} UTP parents"));
            }
        }

        for id in self.nodes_of_type(NodeType::Utp) {
            let upper = self.parents_of(&id)
                .filter(|p| matches!(p, NodeId::Metro(_) | NodeId::Country))
                .count();
            if upper != 1 {
                violations.push(format!("{id} has {upper} metro-level parents"));
            }

            let Some(utp) = id.utp_id() else { continue };
            if self.utp_member_count(utp) == 0 { continue }
            match self.seat_of(utp) {
                None => violations.push(format!("{id} has members but no registered seat")),
                Some(seat) if !self.get_municipality_utp(seat).is(utp) => {
                    violations.push(format!("{id} seat {seat} is not one of its members"));
                }
                Some(_) => {}
            }
        }

        for (utp, seat) in &self.utp_seeds {
            if !self.has_utp(utp) {
                violations.push(format!("seat registry entry {utp}:{seat} refers to an unknown UTP"));
            } else if self.utp_member_count(utp) == 0 {
                violations.push(format!("seat registry entry {utp}:{seat} refers to an empty UTP"));
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_graph() -> TerritorialGraph {
        let mut graph = TerritorialGraph::new();
        graph.add_utp("1", Some("A"));
        graph.add_municipality(11, "Onze", "1");
        graph.add_municipality(12, "Doze", "1");
        graph.add_municipality(21, "Vinte e um", "2");
        graph.set_seat("1", 11).unwrap();
        graph.set_seat("2", 21).unwrap();
        graph
    }

    #[test]
    fn consistent_graph_has_no_violations() {
        assert!(make_test_graph().check_invariants().is_empty());
    }

    #[test]
    fn seat_outside_its_utp_is_reported() {
        let mut graph = make_test_graph();
        graph.move_municipality(11, "2").unwrap();
        let violations = graph.check_invariants();
        assert_eq!(violations, vec!["UTP_1 seat 11 is not one of its members".to_string()]);
    }

    #[test]
    fn stale_registry_entry_is_reported() {
        let mut graph = make_test_graph();
        graph.register_seat("9", 12);
        assert_eq!(graph.check_invariants().len(), 1);
    }
}
