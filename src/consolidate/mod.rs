mod candidate;
mod conflict;
mod consolidator;
mod execute;
mod filter;
mod ledger;
mod metrics;
mod relations;
mod report;
mod transitive;

pub use candidate::{Candidate, Rejection, RejectionKind, check_standing, infrastructure_score, standing};
pub use conflict::resolve_reciprocal_conflicts;
pub use consolidator::{ConsolidationPlan, PassOutcome, SeatConsolidator};
pub use execute::{ExecutedMove, execute_candidate};
pub use filter::{FilterStats, filter_candidates, normalize_rm_label};
pub use ledger::{ConsolidationLedger, LedgerEntry};
pub use metrics::{MetricsProvider, SeatMetrics, TableMetrics};
pub use relations::{FlowRecord, FunctionalRelations, ImpedanceRecord};
pub use report::{result_frame, write_result_csv};
pub use transitive::{ChainContext, ChainStats, resolve_transitive_chains};
