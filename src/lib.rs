#![doc = "OpenUTP public API"]
pub mod cli;
pub mod commands;
pub mod config;
pub mod consolidate;
pub mod error;
pub mod geom;
pub mod graph;
pub mod io;
pub mod types;
pub mod validator;

#[doc(inline)]
pub use config::ConsolidationConfig;

#[doc(inline)]
pub use consolidate::{Candidate, PassOutcome, SeatConsolidator};

#[doc(inline)]
pub use error::GraphError;

#[doc(inline)]
pub use geom::MunicipalityGeometries;

#[doc(inline)]
pub use graph::TerritorialGraph;

#[doc(inline)]
pub use types::{NodeId, NodeType, UtpLookup};

#[doc(inline)]
pub use validator::TerritorialValidator;
