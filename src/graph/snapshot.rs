use std::{collections::BTreeMap, path::Path, sync::Arc};

use anyhow::{Context, Result};
use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::{error::GraphError, geom::MunicipalityGeometries, io::{read_json, write_json},
    types::{NodeId, NodeType, UtpLookup}};

use super::{NodeData, TerritorialGraph};

/// Serialized form of a `TerritorialGraph`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub nodes: BTreeMap<String, SnapshotNode>,
    pub edges: Vec<(String, String)>,
    pub utp_seeds: BTreeMap<String, u32>,
    #[serde(default)]
    pub coloring: BTreeMap<u32, usize>,
    pub metadata: SnapshotMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    #[serde(rename = "type")]
    pub node_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utp_id: Option<String>,
    #[serde(default)]
    pub sede_utp: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regiao_metropolitana: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub timestamp: String,
    pub label: String,
}

impl TerritorialGraph {
    /// Build the serializable snapshot of the current state.
    pub fn to_snapshot(&self, label: &str, coloring: &BTreeMap<u32, usize>) -> Snapshot {
        let nodes = self.nodes.iter().map(|(id, data)| {
            let mut node = SnapshotNode {
                node_type: id.node_type().to_str().to_string(),
                name: data.name.to_string(),
                ..Default::default()
            };
            match id {
                NodeId::Municipality(code) => {
                    node.utp_id = match self.get_municipality_utp(*code) {
                        UtpLookup::Assigned(utp) => Some(utp.to_string()),
                        _ => None,
                    };
                    node.sede_utp = data.is_seat;
                    node.regiao_metropolitana = self.municipality_metro(*code).map(str::to_string);
                    node.regic = self.rank_label(*code).map(str::to_string);
                    node.color = coloring.get(code).copied();
                }
                NodeId::Utp(utp) => node.utp_id = Some(utp.to_string()),
                _ => {}
            }
            (id.key(), node)
        }).collect();

        Snapshot {
            nodes,
            edges: self.edges().iter().map(|(p, c)| (p.key(), c.key())).collect(),
            utp_seeds: self.utp_seeds.iter().map(|(utp, code)| (utp.to_string(), *code)).collect(),
            coloring: coloring.clone(),
            metadata: SnapshotMetadata {
                timestamp: chrono::Utc::now().to_rfc3339(),
                label: label.to_string(),
            },
        }
    }

    /// Rebuild a graph from a snapshot.
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, GraphError> {
        let mut graph = Self::new();

        for (key, node) in &snapshot.nodes {
            let id = NodeId::parse(key)
                .ok_or_else(|| GraphError::InvalidSnapshot(format!("unrecognised node key {key:?}")))?;
            let ty = NodeType::from_str(&node.node_type)
                .ok_or_else(|| GraphError::InvalidSnapshot(format!("node {key} has unknown type {:?}", node.node_type)))?;
            if ty != id.node_type() {
                return Err(GraphError::InvalidSnapshot(format!("node {key} is typed {:?}", node.node_type)));
            }
            if let (NodeId::Municipality(code), Some(regic)) = (&id, &node.regic) {
                graph.set_rank_label(*code, regic);
            }
            let data = NodeData { name: Arc::from(node.name.as_str()), is_seat: node.sede_utp };
            match id {
                NodeId::Country => { graph.nodes.insert(id, data); }
                _ => { graph.insert_node(id, data); }
            }
        }

        for (parent, child) in &snapshot.edges {
            let resolve = |key: &str| NodeId::parse(key).filter(|id| graph.contains(id))
                .ok_or_else(|| GraphError::InvalidSnapshot(format!("edge endpoint {key:?} is not a node")));
            let (parent, child) = (resolve(parent)?, resolve(child)?);
            graph.link(&parent, &child);
        }

        for (utp, code) in &snapshot.utp_seeds {
            graph.register_seat(utp, *code);
        }
        Ok(graph)
    }

    /// Write a snapshot to `path`, coloring UTPs from `geometries` when given.
    pub fn export_snapshot(&self, path: &Path, label: &str, geometries: Option<&MunicipalityGeometries>) -> Result<()> {
        let coloring = geometries.map(|g| self.compute_utp_coloring(g)).unwrap_or_default();
        self.export_snapshot_with_coloring(path, label, &coloring)
    }

    /// Write a snapshot to `path` with a precomputed coloring.
    pub fn export_snapshot_with_coloring(&self, path: &Path, label: &str, coloring: &BTreeMap<u32, usize>) -> Result<()> {
        write_json(path, &self.to_snapshot(label, coloring))
            .with_context(|| format!("[TerritorialGraph.export_snapshot] Failed to write {}", path.display()))?;
        info!("[TerritorialGraph.export_snapshot] '{label}' -> {}", path.display());
        Ok(())
    }

    /// Read a snapshot written by `export_snapshot`.
    pub fn load_snapshot(path: &Path) -> Result<Self> {
        let snapshot: Snapshot = read_json(path)
            .with_context(|| format!("[TerritorialGraph.load_snapshot] Failed to read {}", path.display()))?;
        let graph = Self::from_snapshot(&snapshot)
            .with_context(|| format!("[TerritorialGraph.load_snapshot] Invalid snapshot {}", path.display()))?;

        let violations = graph.check_invariants();
        if !violations.is_empty() {
            error!("[TerritorialGraph.load_snapshot] {} invariant violations in {}", violations.len(), path.display());
        }
        info!("[TerritorialGraph.load_snapshot] '{}' ({}) <- {}",
            snapshot.metadata.label, snapshot.metadata.timestamp, path.display());
        Ok(graph)
    }
}
