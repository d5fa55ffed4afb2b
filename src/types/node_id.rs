use std::{fmt, sync::Arc};

use super::node_type::NodeType;

/// Snapshot key of the hierarchy root.
pub const COUNTRY_KEY: &str = "BRASIL";

/// Metro region name used for UTPs outside any metropolitan region.
pub const NO_METRO: &str = "SEM_RM";

/// Stable key for any node of the territorial hierarchy.
/// UTP ids and metro names are kept as shared text to avoid repeated owned Strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    Country,
    Metro(Arc<str>),        // e.g., "RM_Recife"
    Utp(Arc<str>),          // e.g., "UTP_366"
    Municipality(u32),      // IBGE code, e.g., 2603009
}

impl NodeId {
    #[inline] pub fn metro(name: &str) -> Self { NodeId::Metro(Arc::from(name)) }
    #[inline] pub fn utp(id: &str) -> Self { NodeId::Utp(Arc::from(id)) }

    pub fn node_type(&self) -> NodeType {
        match self {
            NodeId::Country => NodeType::Country,
            NodeId::Metro(_) => NodeType::Metro,
            NodeId::Utp(_) => NodeType::Utp,
            NodeId::Municipality(_) => NodeType::Municipality,
        }
    }

    /// Municipality code, if this is a municipality node.
    pub fn code(&self) -> Option<u32> {
        match self { NodeId::Municipality(code) => Some(*code), _ => None }
    }

    /// UTP id, if this is a UTP node.
    pub fn utp_id(&self) -> Option<&Arc<str>> {
        match self { NodeId::Utp(id) => Some(id), _ => None }
    }

    /// Textual key used in snapshots and hierarchy exports.
    pub fn key(&self) -> String {
        match self {
            NodeId::Country => COUNTRY_KEY.to_string(),
            NodeId::Metro(name) => format!("RM_{name}"),
            NodeId::Utp(id) => format!("UTP_{id}"),
            NodeId::Municipality(code) => code.to_string(),
        }
    }

    /// Inverse of `key`.
    pub fn parse(key: &str) -> Option<Self> {
        if key == COUNTRY_KEY { return Some(NodeId::Country) }
        if let Some(name) = key.strip_prefix("RM_") { return Some(NodeId::metro(name)) }
        if let Some(id) = key.strip_prefix("UTP_") { return Some(NodeId::utp(id)) }
        key.parse().ok().map(NodeId::Municipality)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}
