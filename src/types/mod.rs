mod node_id;
mod node_type;
mod utp_lookup;

pub use node_id::{COUNTRY_KEY, NO_METRO, NodeId};
pub use node_type::NodeType;
pub use utp_lookup::UtpLookup;
