use std::{collections::BTreeMap, path::Path};

use anyhow::Result;
use log::{error, info, warn};
use serde_json::json;

use crate::{
    config::{COLORING_JSON, ConsolidationConfig, LEDGER_JSON, RESULT_CSV, SNAPSHOT_JSON},
    geom::MunicipalityGeometries,
    graph::TerritorialGraph,
    io::{ensure_dir_exists, write_json},
};

use super::{
    candidate::{Candidate, RejectionKind},
    conflict::resolve_reciprocal_conflicts,
    execute::execute_candidate,
    filter::{FilterStats, filter_candidates},
    ledger::ConsolidationLedger,
    metrics::MetricsProvider,
    relations::FunctionalRelations,
    report::write_result_csv,
    transitive::{ChainContext, ChainStats, resolve_transitive_chains},
};

/// Candidates of a pass before anything is executed.
#[derive(Debug, Clone, Default)]
pub struct ConsolidationPlan {
    pub approved: Vec<Candidate>,
    pub rejected: Vec<Candidate>,
    pub filter: FilterStats,
    pub chains: ChainStats,
}

/// Result of a full consolidation pass.
#[derive(Debug, Clone, Default)]
pub struct PassOutcome {
    /// Number of candidates whose move was applied.
    pub executed: usize,
    pub approved: Vec<Candidate>,
    pub rejected: Vec<Candidate>,
    /// Municipality code -> color index after the pass.
    pub coloring: BTreeMap<u32, usize>,
}

/// Merges dependent UTP seats into the UTPs they depend on.
pub struct SeatConsolidator<'a> {
    graph: &'a mut TerritorialGraph,
    geometries: &'a MunicipalityGeometries,
    metrics: &'a dyn MetricsProvider,
    relations: &'a FunctionalRelations,
    config: ConsolidationConfig,
    ledger: ConsolidationLedger,
}

impl<'a> SeatConsolidator<'a> {
    pub fn new(
        graph: &'a mut TerritorialGraph,
        geometries: &'a MunicipalityGeometries,
        metrics: &'a dyn MetricsProvider,
        relations: &'a FunctionalRelations,
        config: ConsolidationConfig,
    ) -> Self {
        Self { graph, geometries, metrics, relations, config, ledger: ConsolidationLedger::new() }
    }

    #[inline] pub fn graph(&self) -> &TerritorialGraph { self.graph }

    #[inline] pub fn ledger(&self) -> &ConsolidationLedger { &self.ledger }

    #[inline] pub fn config(&self) -> &ConsolidationConfig { &self.config }

    /// Filter candidates, then resolve reciprocal conflicts and transitive
    /// chains.  The hierarchy is not modified.
    pub fn plan(&self) -> Result<ConsolidationPlan> {
        let metrics = self.metrics.seat_metrics(self.graph)?;
        info!("[SeatConsolidator.plan] {} seat rows; adjacency graph has {} municipalities",
            metrics.len(), self.geometries.len());

        let (approved, mut rejected, filter) = filter_candidates(self.graph, self.geometries, &metrics, &self.config);
        let (mut approved, discarded) = resolve_reciprocal_conflicts(approved, self.relations);
        rejected.extend(discarded);

        let ctx = ChainContext {
            graph: self.graph,
            geometries: self.geometries,
            metrics: &metrics,
            relations: self.relations,
            config: &self.config,
        };
        let chains = resolve_transitive_chains(&mut approved, &mut rejected, &ctx);

        info!("[SeatConsolidator.plan] {} approved, {} rejected", approved.len(), rejected.len());
        Ok(ConsolidationPlan { approved, rejected, filter, chains })
    }

    /// Apply the approved candidates in order.  Candidates that fail are
    /// moved to `plan.rejected`.  Returns the number of applied moves.
    pub fn execute(&mut self, plan: &mut ConsolidationPlan) -> usize {
        let mut applied = Vec::with_capacity(plan.approved.len());
        for mut cand in std::mem::take(&mut plan.approved) {
            match execute_candidate(self.graph, &cand) {
                Ok(moved) => {
                    let reason = format!("Sede consolidation (full UTP): Score {}->{}, Travel {}",
                        cand.origin_score, cand.dest_score,
                        cand.travel_time_h.map_or_else(|| "n/a".to_string(), |t| format!("{t:.2}h")));
                    let details = json!({
                        "origin_seat": cand.origin_seat,
                        "origin_name": cand.origin_name,
                        "dest_seat": moved.dest_seat,
                        "dest_name": cand.dest_name,
                        "moved": moved.moved,
                        "origin_removed": moved.origin_removed,
                        "travel_time_h": cand.travel_time_h,
                        "score_origin": cand.origin_score,
                        "score_dest": cand.dest_score,
                        "rank_origin": cand.origin_rank,
                        "rank_dest": cand.dest_rank,
                        "transitive": cand.transitive,
                        "local_fallback": cand.local_fallback,
                        "transitive_reason": cand.transitive_reason,
                    });
                    self.ledger.add(&moved.origin_utp, &moved.dest_utp, reason, details);
                    cand.dest_utp = Some(moved.dest_utp);
                    applied.push(cand);
                }
                Err(err) => {
                    warn!("[SeatConsolidator.execute] {cand}: {err:#}");
                    cand.reject(RejectionKind::ExecutionFailed, format!("execution failed: {err:#}"));
                    plan.rejected.push(cand);
                }
            }
        }
        let executed = applied.len();
        plan.approved = applied;
        info!("[SeatConsolidator.execute] {executed} consolidations executed");
        executed
    }

    /// Run one pass and write its outputs to `out_dir`.
    ///
    /// The result CSV, ledger and coloring are written even when nothing
    /// moved.  A snapshot write failure is logged and does not fail the pass.
    pub fn run(&mut self, out_dir: &Path) -> Result<PassOutcome> {
        let mut plan = self.plan()?;
        let executed = self.execute(&mut plan);

        let seats = self.graph.sync_seat_flags();
        let violations = self.graph.check_invariants();
        for violation in &violations {
            error!("[SeatConsolidator.run] invariant violated: {violation}");
        }
        info!("[SeatConsolidator.run] {} UTPs, {seats} seats after the pass", self.graph.utp_ids().len());

        let coloring = self.graph.compute_utp_coloring(self.geometries);

        ensure_dir_exists(out_dir)?;
        write_result_csv(&out_dir.join(RESULT_CSV), &plan.approved, &plan.rejected)?;
        self.ledger.save(&out_dir.join(LEDGER_JSON))?;
        write_json(&out_dir.join(COLORING_JSON), &coloring)?;

        let snapshot = out_dir.join(SNAPSHOT_JSON);
        if let Err(err) = self.graph.export_snapshot_with_coloring(&snapshot, "seat_consolidation", &coloring) {
            error!("[SeatConsolidator.run] Failed to write snapshot {}: {err:#}", snapshot.display());
        }

        Ok(PassOutcome { executed, approved: plan.approved, rejected: plan.rejected, coloring })
    }
}
