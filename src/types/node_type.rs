/// Level of a node in the territorial hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
    Country,        // Root of the hierarchy
    Metro,          // Metro -> Country
    Utp,            // Utp -> Metro (or Country)
    Municipality,   // Municipality -> Utp
}

impl NodeType {
    pub fn to_str(&self) -> &'static str {
        match self {
            NodeType::Country => "country",
            NodeType::Metro => "rm",
            NodeType::Utp => "utp",
            NodeType::Municipality => "municipality",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "country" => Some(NodeType::Country),
            "rm" => Some(NodeType::Metro),
            "utp" => Some(NodeType::Utp),
            "municipality" => Some(NodeType::Municipality),
            _ => None,
        }
    }

    pub fn order() -> [NodeType; 4] {
        [
            NodeType::Country,
            NodeType::Metro,
            NodeType::Utp,
            NodeType::Municipality,
        ]
    }
}
