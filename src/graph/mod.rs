mod coloring;
mod export;
mod graph;
mod invariants;
mod load;
mod snapshot;

pub use graph::{NodeData, TerritorialGraph};
pub use load::{BaseRecord, SeatRecord};
pub use snapshot::{Snapshot, SnapshotMetadata, SnapshotNode};
