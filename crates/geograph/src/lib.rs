pub mod adj;
pub mod region;
pub mod unit;

pub use adj::AdjacencyMatrix;
pub use region::{Region, RegionError, shared_perimeter};
pub use unit::UnitId;
