use ahash::AHashMap;
use log::info;

use crate::{config::ConsolidationConfig, geom::MunicipalityGeometries, graph::TerritorialGraph,
    types::UtpLookup, validator::{TerritorialValidator, rank_of}};

use super::{candidate::{Candidate, RejectionKind, check_standing, infrastructure_score}, metrics::SeatMetrics};

/// Per-rule counters of a filtering run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub total_checked: usize,
    pub no_alert: usize,
    pub invalid_destination: usize,
    pub same_utp: usize,
    pub travel_time_exceeded: usize,
    pub rm_mismatch: usize,
    pub not_adjacent: usize,
    pub self_sufficient: usize,
    pub rank_not_better: usize,
    pub accepted: usize,
}

impl FilterStats {
    fn record(&mut self, kind: RejectionKind) {
        match kind {
            RejectionKind::InvalidDestination => self.invalid_destination += 1,
            RejectionKind::SameUtp => self.same_utp += 1,
            RejectionKind::TravelTimeExceeded => self.travel_time_exceeded += 1,
            RejectionKind::MetroMismatch => self.rm_mismatch += 1,
            RejectionKind::NotAdjacent => self.not_adjacent += 1,
            RejectionKind::SelfSufficient => self.self_sufficient += 1,
            RejectionKind::RankNotBetter => self.rank_not_better += 1,
            RejectionKind::ReciprocalConflict | RejectionKind::ChainCancelled | RejectionKind::ExecutionFailed => {}
        }
    }

    pub fn log(&self) {
        info!("[consolidate::filter] candidate filtering statistics:");
        info!("  total seats checked:          {}", self.total_checked);
        info!("  no dependency alert:          {}", self.no_alert);
        info!("  invalid destination:          {}", self.invalid_destination);
        info!("  same UTP:                     {}", self.same_utp);
        info!("  travel time exceeded:         {}", self.travel_time_exceeded);
        info!("  RM mismatch:                  {}", self.rm_mismatch);
        info!("  UTPs not adjacent:            {}", self.not_adjacent);
        info!("  self-sufficient origin:       {}", self.self_sufficient);
        info!("  rank not better:              {}", self.rank_not_better);
        info!("  accepted:                     {}", self.accepted);
    }
}

/// RM label with missing markers (`nan`, `SEM_RM`) mapped to empty.
pub fn normalize_rm_label(label: &str) -> String {
    let label = label.trim();
    if label.eq_ignore_ascii_case("nan") || label == crate::types::NO_METRO { String::new() } else { label.to_string() }
}

/// Administrative rank of a metrics row, falling back to the graph's label.
pub(crate) fn row_rank(row: &SeatMetrics, graph: &TerritorialGraph) -> u8 {
    if row.rank_label.trim().is_empty() {
        TerritorialValidator::new(graph).get_administrative_rank(row.seat_code)
    } else {
        rank_of(&row.rank_label)
    }
}

pub(crate) fn row_score(row: &SeatMetrics, config: &ConsolidationConfig) -> u8 {
    infrastructure_score(row.has_airport, &row.tourism_class, &config.tourism_marker)
}

/// Index metrics rows by seat code; the first row of a seat wins.
pub(crate) fn index_by_seat(metrics: &[SeatMetrics]) -> AHashMap<u32, &SeatMetrics> {
    let mut index = AHashMap::with_capacity(metrics.len());
    for row in metrics {
        index.entry(row.seat_code).or_insert(row);
    }
    index
}

/// Apply the candidate rules to every metrics row, in row order.
/// Returns `(approved, rejected, stats)`; rows without a dependency alert
/// appear in neither list.
pub fn filter_candidates(
    graph: &TerritorialGraph,
    geometries: &MunicipalityGeometries,
    metrics: &[SeatMetrics],
    config: &ConsolidationConfig,
) -> (Vec<Candidate>, Vec<Candidate>, FilterStats) {
    let validator = TerritorialValidator::with_config(graph, config);
    let by_seat = index_by_seat(metrics);

    let mut stats = FilterStats::default();
    let mut approved = Vec::new();
    let mut rejected = Vec::new();

    for row in metrics {
        stats.total_checked += 1;
        if !row.has_alert {
            stats.no_alert += 1;
            continue;
        }

        let mut cand = Candidate {
            origin_seat: row.seat_code,
            origin_name: row.seat_name.clone(),
            origin_utp: row.utp_id.clone(),
            flow_dest: row.dest_code,
            travel_time_h: row.travel_time_h,
            origin_score: row_score(row, config),
            origin_rank: row_rank(row, graph),
            rm_origin: normalize_rm_label(&row.rm_label),
            ..Default::default()
        };

        match check_candidate(&mut cand, row, graph, geometries, &validator, &by_seat, config) {
            Ok(()) => {
                stats.accepted += 1;
                approved.push(cand);
            }
            Err((kind, reason)) => {
                stats.record(kind);
                cand.reject(kind, reason);
                rejected.push(cand);
            }
        }
    }

    stats.log();
    (approved, rejected, stats)
}

/// Rules 2-9 for one alerted seat.  Fills the destination fields of `cand`
/// as far as they can be resolved.
fn check_candidate(
    cand: &mut Candidate,
    row: &SeatMetrics,
    graph: &TerritorialGraph,
    geometries: &MunicipalityGeometries,
    validator: &TerritorialValidator,
    by_seat: &AHashMap<u32, &SeatMetrics>,
    config: &ConsolidationConfig,
) -> Result<(), (RejectionKind, String)> {
    use RejectionKind::*;

    // 2. Destination resolves to an active seat with metrics.
    let dest_code = row.dest_code
        .ok_or((InvalidDestination, "no principal flow destination".to_string()))?;
    let dest_utp = match graph.get_municipality_utp(dest_code) {
        UtpLookup::Assigned(utp) => utp,
        other => return Err((InvalidDestination, format!("destination municipality {dest_code} has no UTP ({other})"))),
    };
    cand.dest_utp = Some(dest_utp.to_string());
    let dest_seat = graph.seat_of(&dest_utp)
        .ok_or_else(|| (InvalidDestination, format!("destination UTP {dest_utp} has no active seat")))?;
    cand.dest_seat = Some(dest_seat);
    let dest_row = by_seat.get(&dest_seat)
        .ok_or_else(|| (InvalidDestination, format!("destination seat {dest_seat} not found in metrics")))?;

    cand.dest_name = dest_row.seat_name.clone();
    cand.dest_score = row_score(dest_row, config);
    cand.dest_rank = row_rank(dest_row, graph);
    cand.rm_dest = normalize_rm_label(&dest_row.rm_label);

    // 3. Different UTPs.
    if dest_utp.as_ref() == cand.origin_utp {
        return Err((SameUtp, "same UTP".to_string()));
    }

    // 4. Travel time.
    match cand.travel_time_h {
        None => return Err((TravelTimeExceeded, "travel time unknown".to_string())),
        Some(t) if t > config.max_travel_hours => {
            return Err((TravelTimeExceeded, format!("travel time {t:.2}h > {}h", config.max_travel_hours)));
        }
        Some(_) => {}
    }

    // 5. Same metropolitan region, or both outside any.
    if (!cand.rm_origin.is_empty() || !cand.rm_dest.is_empty()) && cand.rm_origin != cand.rm_dest {
        return Err((MetroMismatch, format!("RM mismatch: '{}' != '{}'", cand.rm_origin, cand.rm_dest)));
    }

    // 6. Adjacent UTPs.
    if !validator.are_utps_adjacent(&cand.origin_utp, &dest_utp, geometries) {
        return Err((NotAdjacent, "UTPs are not adjacent".to_string()));
    }

    // 7-9. Infrastructure score, then administrative rank.
    check_standing(cand.origin_score, cand.origin_rank, cand.dest_score, cand.dest_rank)
        .map_err(|r| (r.kind, r.reason))
}
