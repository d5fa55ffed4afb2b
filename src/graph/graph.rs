use std::{collections::{BTreeMap, BTreeSet}, sync::Arc};

use ahash::AHashMap;
use log::debug;

use crate::{error::GraphError, types::{NO_METRO, NodeId, NodeType, UtpLookup}};

/// Attributes stored on every hierarchy node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeData {
    pub name: Arc<str>,
    /// Set on municipalities currently acting as the seat of their UTP.
    pub is_seat: bool,
}

/// Rooted tree Country -> Metro -> UTP -> Municipality, with the seat registry
/// (UTP id -> seat code) and the administrative rank lookup.
///
/// Edges are kept as explicit parent/child maps keyed by `NodeId` so that the
/// single-parent invariants can be checked independently of any traversal.
#[derive(Debug, Clone)]
pub struct TerritorialGraph {
    pub(super) nodes: AHashMap<NodeId, NodeData>,
    pub(super) children: AHashMap<NodeId, BTreeSet<NodeId>>,
    pub(super) parents: AHashMap<NodeId, BTreeSet<NodeId>>,
    pub(super) utp_seeds: BTreeMap<Arc<str>, u32>,
    pub(super) mun_rank: AHashMap<u32, Arc<str>>,
}

impl Default for TerritorialGraph {
    fn default() -> Self { Self::new() }
}

impl TerritorialGraph {
    /// Create a graph holding only the country root.
    pub fn new() -> Self {
        let mut graph = Self {
            nodes: AHashMap::new(),
            children: AHashMap::new(),
            parents: AHashMap::new(),
            utp_seeds: BTreeMap::new(),
            mun_rank: AHashMap::new(),
        };
        graph.insert_node(NodeId::Country, NodeData { name: Arc::from("Brasil"), is_seat: false });
        graph
    }

    // -----------------------------------------------------------------------
    // Low-level node and edge storage
    // -----------------------------------------------------------------------

    /// Insert a node; returns `false` (and leaves attributes untouched) if it exists.
    pub(super) fn insert_node(&mut self, id: NodeId, data: NodeData) -> bool {
        if self.nodes.contains_key(&id) { return false }
        self.nodes.insert(id, data);
        true
    }

    pub(super) fn link(&mut self, parent: &NodeId, child: &NodeId) {
        self.children.entry(parent.clone()).or_default().insert(child.clone());
        self.parents.entry(child.clone()).or_default().insert(parent.clone());
    }

    pub(super) fn unlink(&mut self, parent: &NodeId, child: &NodeId) {
        if let Some(set) = self.children.get_mut(parent) { set.remove(child); }
        if let Some(set) = self.parents.get_mut(child) { set.remove(parent); }
    }

    /// Get the number of nodes, including the root.
    #[inline] pub fn node_count(&self) -> usize { self.nodes.len() }

    /// Get the number of parent -> child edges.
    #[inline] pub fn edge_count(&self) -> usize { self.children.values().map(BTreeSet::len).sum() }

    #[inline] pub fn contains(&self, id: &NodeId) -> bool { self.nodes.contains_key(id) }

    #[inline] pub fn node(&self, id: &NodeId) -> Option<&NodeData> { self.nodes.get(id) }

    /// Children of `id`, sorted.
    pub fn children_of(&self, id: &NodeId) -> impl Iterator<Item = &NodeId> + '_ {
        self.children.get(id).into_iter().flatten()
    }

    /// Parents of `id`, sorted.
    pub fn parents_of(&self, id: &NodeId) -> impl Iterator<Item = &NodeId> + '_ {
        self.parents.get(id).into_iter().flatten()
    }

    /// All nodes of a given type, sorted.
    pub fn nodes_of_type(&self, ty: NodeType) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = self.nodes.keys().filter(|id| id.node_type() == ty).cloned().collect();
        out.sort();
        out
    }

    /// All parent -> child edges, sorted.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut out: Vec<(NodeId, NodeId)> = self.children.iter()
            .flat_map(|(parent, kids)| kids.iter().map(move |kid| (parent.clone(), kid.clone())))
            .collect();
        out.sort();
        out
    }

    // -----------------------------------------------------------------------
    // Node creation (idempotent)
    // -----------------------------------------------------------------------

    /// Add a metropolitan region under the root.  No-op if it already exists.
    pub fn add_metro_region(&mut self, name: &str) -> NodeId {
        let id = NodeId::metro(name);
        if self.insert_node(id.clone(), NodeData { name: Arc::from(name), is_seat: false }) {
            self.link(&NodeId::Country, &id);
        }
        id
    }

    /// Add a UTP under metro region `metro` (created on demand), or under the
    /// root when `metro` is `None`.  No-op if the UTP already exists.
    pub fn add_utp(&mut self, utp_id: &str, metro: Option<&str>) -> NodeId {
        let id = NodeId::utp(utp_id);
        if self.contains(&id) { return id }

        let parent = match metro {
            Some(name) => self.add_metro_region(name),
            None => NodeId::Country,
        };
        self.insert_node(id.clone(), NodeData { name: Arc::from(utp_id), is_seat: false });
        self.link(&parent, &id);
        id
    }

    /// Add a municipality under UTP `utp_id` (created under the root if absent).
    /// No-op if the municipality already exists, whatever its current UTP.
    pub fn add_municipality(&mut self, code: u32, name: &str, utp_id: &str) -> NodeId {
        let id = NodeId::Municipality(code);
        if self.contains(&id) { return id }

        let utp = self.add_utp(utp_id, None);
        self.insert_node(id.clone(), NodeData { name: Arc::from(name), is_seat: false });
        self.link(&utp, &id);
        id
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Move municipality `code` to UTP `target_utp`, replacing its UTP parent.
    /// The target UTP is created under the root if absent.
    ///
    /// This is the only primitive that changes UTP membership.
    pub fn move_municipality(&mut self, code: u32, target_utp: &str) -> Result<(), GraphError> {
        let id = NodeId::Municipality(code);
        if !self.contains(&id) { return Err(GraphError::MunicipalityNotFound(code)) }

        let old: Vec<NodeId> = self.parents_of(&id)
            .filter(|p| p.node_type() == NodeType::Utp)
            .cloned()
            .collect();
        for parent in &old {
            self.unlink(parent, &id);
        }

        let target = self.add_utp(target_utp, None);
        self.link(&target, &id);

        debug!("[TerritorialGraph.move_municipality] {code}: {} -> {target}",
            old.first().map(NodeId::key).unwrap_or_else(|| "SEM_UTP".to_string()));
        Ok(())
    }

    /// UTP of municipality `code`.
    pub fn get_municipality_utp(&self, code: u32) -> UtpLookup {
        let id = NodeId::Municipality(code);
        if !self.contains(&id) { return UtpLookup::NotFound }
        self.parents_of(&id)
            .find_map(|p| p.utp_id().cloned())
            .map_or(UtpLookup::Unassigned, UtpLookup::Assigned)
    }

    /// Municipality codes currently in UTP `utp_id`, sorted ascending.
    pub fn utp_members(&self, utp_id: &str) -> Vec<u32> {
        self.children_of(&NodeId::utp(utp_id)).filter_map(NodeId::code).collect()
    }

    /// Number of municipalities currently in UTP `utp_id`.
    pub fn utp_member_count(&self, utp_id: &str) -> usize {
        self.children_of(&NodeId::utp(utp_id)).filter(|c| c.code().is_some()).count()
    }

    #[inline] pub fn has_utp(&self, utp_id: &str) -> bool { self.contains(&NodeId::utp(utp_id)) }

    #[inline] pub fn has_municipality(&self, code: u32) -> bool { self.contains(&NodeId::Municipality(code)) }

    /// All UTP ids, sorted.
    pub fn utp_ids(&self) -> Vec<Arc<str>> {
        self.nodes_of_type(NodeType::Utp).into_iter().filter_map(|id| id.utp_id().cloned()).collect()
    }

    /// All municipality codes, sorted.
    pub fn municipality_codes(&self) -> Vec<u32> {
        self.nodes_of_type(NodeType::Municipality).iter().filter_map(NodeId::code).collect()
    }

    /// UTPs with exactly one member municipality, sorted.
    pub fn get_unitary_utps(&self) -> Vec<Arc<str>> {
        self.utp_ids().into_iter().filter(|id| self.utp_member_count(id) == 1).collect()
    }

    /// Metro region name of UTP `utp_id`; `NO_METRO` for UTPs hanging from
    /// the root, `None` for unknown UTPs.
    pub fn utp_metro(&self, utp_id: &str) -> Option<&str> {
        let id = NodeId::utp(utp_id);
        if !self.contains(&id) { return None }
        let metro = self.parents_of(&id).find_map(|p| match p {
            NodeId::Metro(name) => Some(name.as_ref()),
            _ => None,
        });
        Some(metro.unwrap_or(NO_METRO))
    }

    /// Metro region of municipality `code`, derived through its UTP.
    pub fn municipality_metro(&self, code: u32) -> Option<&str> {
        match self.get_municipality_utp(code) {
            UtpLookup::Assigned(utp) => self.utp_metro(&utp),
            _ => None,
        }
    }

    /// Name of municipality `code`.
    pub fn municipality_name(&self, code: u32) -> Option<&str> {
        self.node(&NodeId::Municipality(code)).map(|n| n.name.as_ref())
    }

    /// Remove an empty UTP from the hierarchy and the seat registry.
    pub fn remove_utp(&mut self, utp_id: &str) -> Result<(), GraphError> {
        let id = NodeId::utp(utp_id);
        if !self.contains(&id) { return Err(GraphError::UtpNotFound(utp_id.to_string())) }
        let members = self.utp_member_count(utp_id);
        if members > 0 { return Err(GraphError::UtpNotEmpty { utp: utp_id.to_string(), members }) }

        let parents: Vec<NodeId> = self.parents_of(&id).cloned().collect();
        for parent in &parents {
            self.unlink(parent, &id);
        }
        self.children.remove(&id);
        self.parents.remove(&id);
        self.nodes.remove(&id);
        self.utp_seeds.remove(utp_id);
        debug!("[TerritorialGraph.remove_utp] removed empty UTP {utp_id}");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Seat registry
    // -----------------------------------------------------------------------

    /// Registered seat of UTP `utp_id`.
    #[inline] pub fn seat_of(&self, utp_id: &str) -> Option<u32> { self.utp_seeds.get(utp_id).copied() }

    /// Full seat registry, sorted by UTP id.
    #[inline] pub fn utp_seeds(&self) -> &BTreeMap<Arc<str>, u32> { &self.utp_seeds }

    /// Returns `true` if `code` is the registered seat of some UTP.
    pub fn is_registered_seat(&self, code: u32) -> bool {
        self.utp_seeds.values().any(|&seat| seat == code)
    }

    /// Write a registry entry without membership checks (used while loading,
    /// when seat records may precede the territory they refer to).
    pub fn register_seat(&mut self, utp_id: &str, code: u32) {
        self.utp_seeds.insert(Arc::from(utp_id), code);
    }

    /// Make member `code` the seat of `utp_id` and flag it.
    pub fn set_seat(&mut self, utp_id: &str, code: u32) -> Result<(), GraphError> {
        if !self.has_utp(utp_id) { return Err(GraphError::UtpNotFound(utp_id.to_string())) }
        if !self.get_municipality_utp(code).is(utp_id) {
            return Err(GraphError::SeatNotFound { utp: utp_id.to_string(), code });
        }
        self.register_seat(utp_id, code);
        self.set_seat_flag(code, true);
        debug!("[TerritorialGraph.set_seat] UTP {utp_id} seat -> {code}");
        Ok(())
    }

    /// Drop the registry entry of `utp_id`, returning the previous seat.
    pub fn clear_seat(&mut self, utp_id: &str) -> Option<u32> {
        self.utp_seeds.remove(utp_id)
    }

    pub fn set_seat_flag(&mut self, code: u32, is_seat: bool) {
        if let Some(node) = self.nodes.get_mut(&NodeId::Municipality(code)) {
            node.is_seat = is_seat;
        }
    }

    pub fn is_seat_flagged(&self, code: u32) -> bool {
        self.node(&NodeId::Municipality(code)).is_some_and(|n| n.is_seat)
    }

    /// Flag every registered seat and unflag every other municipality.
    /// Returns the number of flagged seats.
    pub fn sync_seat_flags(&mut self) -> usize {
        let seats: BTreeSet<u32> = self.utp_seeds.values().copied().collect();
        let mut flagged = 0;
        for (id, data) in self.nodes.iter_mut() {
            if let NodeId::Municipality(code) = id {
                data.is_seat = seats.contains(code);
                flagged += data.is_seat as usize;
            }
        }
        flagged
    }

    // -----------------------------------------------------------------------
    // Administrative rank
    // -----------------------------------------------------------------------

    #[inline] pub fn rank_label(&self, code: u32) -> Option<&str> { self.mun_rank.get(&code).map(|s| s.as_ref()) }

    pub fn set_rank_label(&mut self, code: u32, label: &str) {
        self.mun_rank.insert(code, Arc::from(label));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two metro regions, three UTPs and six municipalities.
    ///
    /// ```text
    /// BRASIL
    /// ├── RM_A ── UTP_1 {101, 102}
    /// │        └─ UTP_2 {201}
    /// └── RM_SEM_RM ── UTP_3 {301, 302, 303}
    /// ```
    fn make_test_graph() -> TerritorialGraph {
        let mut graph = TerritorialGraph::new();
        graph.add_utp("1", Some("A"));
        graph.add_utp("2", Some("A"));
        graph.add_utp("3", Some(NO_METRO));
        for (code, utp) in [(101, "1"), (102, "1"), (201, "2"), (301, "3"), (302, "3"), (303, "3")] {
            graph.add_municipality(code, &format!("Mun {code}"), utp);
        }
        for (utp, seat) in [("1", 101), ("2", 201), ("3", 301)] {
            graph.set_seat(utp, seat).unwrap();
        }
        graph
    }

    #[test]
    fn construction() {
        let graph = make_test_graph();
        // root + 2 metros + 3 UTPs + 6 municipalities
        assert_eq!(graph.node_count(), 12);
        assert_eq!(graph.edge_count(), 11);
        assert_eq!(graph.utp_members("3"), vec![301, 302, 303]);
        assert_eq!(graph.utp_metro("2"), Some("A"));
        assert_eq!(graph.municipality_metro(302), Some(NO_METRO));
    }

    #[test]
    fn add_is_idempotent() {
        let mut graph = make_test_graph();
        let (nodes, edges) = (graph.node_count(), graph.edge_count());

        graph.add_metro_region("A");
        graph.add_utp("1", Some("B"));
        graph.add_municipality(101, "Renamed", "2");

        assert_eq!((graph.node_count(), graph.edge_count()), (nodes, edges));
        assert_eq!(graph.municipality_name(101), Some("Mun 101"));
        assert!(graph.get_municipality_utp(101).is("1"));
        assert_eq!(graph.utp_metro("1"), Some("A"));
    }

    #[test]
    fn move_replaces_the_utp_parent() {
        let mut graph = make_test_graph();
        graph.move_municipality(102, "2").unwrap();

        assert!(graph.get_municipality_utp(102).is("2"));
        assert_eq!(graph.parents_of(&NodeId::Municipality(102)).count(), 1);
        assert_eq!(graph.utp_members("1"), vec![101]);
        assert_eq!(graph.utp_members("2"), vec![102, 201]);
    }

    #[test]
    fn move_creates_missing_target_under_root() {
        let mut graph = make_test_graph();
        graph.move_municipality(303, "9").unwrap();

        assert!(graph.has_utp("9"));
        assert_eq!(graph.parents_of(&NodeId::utp("9")).collect::<Vec<_>>(), vec![&NodeId::Country]);
        assert_eq!(graph.utp_metro("9"), Some(NO_METRO));
    }

    #[test]
    fn move_unknown_municipality_fails() {
        let mut graph = make_test_graph();
        assert_eq!(graph.move_municipality(999, "1"), Err(GraphError::MunicipalityNotFound(999)));
    }

    #[test]
    fn lookup_sentinels() {
        let mut graph = make_test_graph();
        assert_eq!(graph.get_municipality_utp(999), UtpLookup::NotFound);
        assert_eq!(graph.get_municipality_utp(999).to_string(), "NAO_ENCONTRADO");

        graph.unlink(&NodeId::utp("2"), &NodeId::Municipality(201));
        assert_eq!(graph.get_municipality_utp(201), UtpLookup::Unassigned);
    }

    #[test]
    fn unitary_utps() {
        let graph = make_test_graph();
        assert_eq!(graph.get_unitary_utps(), vec![Arc::<str>::from("2")]);
    }

    #[test]
    fn set_seat_requires_membership() {
        let mut graph = make_test_graph();
        assert_eq!(
            graph.set_seat("1", 301),
            Err(GraphError::SeatNotFound { utp: "1".to_string(), code: 301 }),
        );
        assert_eq!(graph.set_seat("7", 301), Err(GraphError::UtpNotFound("7".to_string())));
        assert!(graph.set_seat("1", 102).is_ok());
        assert_eq!(graph.seat_of("1"), Some(102));
    }

    #[test]
    fn remove_empty_utp_clears_registry() {
        let mut graph = make_test_graph();
        graph.move_municipality(201, "1").unwrap();
        graph.remove_utp("2").unwrap();

        assert!(!graph.has_utp("2"));
        assert_eq!(graph.seat_of("2"), None);
        assert_eq!(graph.children_of(&NodeId::metro("A")).count(), 1);
    }

    #[test]
    fn remove_non_empty_utp_is_refused() {
        let mut graph = make_test_graph();
        let members = graph.utp_member_count("1");
        assert_eq!(graph.remove_utp("1"), Err(GraphError::UtpNotEmpty { utp: "1".to_string(), members }));
        assert!(graph.has_utp("1"));
        assert_eq!(graph.utp_member_count("1"), members);
    }

    #[test]
    fn sync_seat_flags_matches_registry() {
        let mut graph = make_test_graph();
        graph.set_seat_flag(302, true);
        graph.register_seat("1", 102);

        assert_eq!(graph.sync_seat_flags(), 3);
        assert!(graph.is_seat_flagged(102));
        assert!(!graph.is_seat_flagged(101));
        assert!(!graph.is_seat_flagged(302));
    }
}
