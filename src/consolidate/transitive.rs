use ahash::{AHashMap, AHashSet};
use log::{info, warn};

use crate::{config::ConsolidationConfig, geom::MunicipalityGeometries, graph::TerritorialGraph,
    validator::TerritorialValidator};

use super::{
    candidate::{Candidate, RejectionKind, check_standing},
    filter::{index_by_seat, normalize_rm_label, row_rank, row_score},
    metrics::SeatMetrics,
    relations::FunctionalRelations,
};

/// Inputs shared by every chain lookup of a pass.
pub struct ChainContext<'a> {
    pub graph: &'a TerritorialGraph,
    pub geometries: &'a MunicipalityGeometries,
    pub metrics: &'a [SeatMetrics],
    pub relations: &'a FunctionalRelations,
    pub config: &'a ConsolidationConfig,
}

/// Counters of a transitive resolution run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainStats {
    pub examined: usize,
    pub transitive: usize,
    pub local_fallback: usize,
    pub cycles: usize,
}

/// Follow approved moves from `start` until a seat that does not move.
///
/// `approved` maps an origin seat to its destination seat.  Returns the path
/// after the origin (`start` first, final destination last), or `Err` with the
/// path walked so far if a seat repeats.
fn follow_chain(origin: u32, start: u32, approved: &AHashMap<u32, u32>) -> Result<Vec<u32>, Vec<u32>> {
    let mut visited = AHashSet::from_iter([origin, start]);
    let mut path = vec![start];
    let mut current = start;
    while let Some(&next) = approved.get(&current) {
        path.push(next);
        if !visited.insert(next) { return Err(path) }
        current = next;
    }
    Ok(path)
}

fn format_chain(origin: u32, path: &[u32]) -> String {
    std::iter::once(origin).chain(path.iter().copied())
        .map(|code| code.to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Re-examine candidates rejected on the rank tie-break.
///
/// A rejected `A -> B` whose destination is itself the origin of an approved
/// chain `B -> ... -> F` is approved as `A -> F` when A stands below F and has
/// direct flow or travel time evidence to F.  Without that evidence, `A -> B`
/// is approved locally (when A has evidence to B and the UTPs touch, or the
/// two seats are adjacent) and the approved `B -> next` link is cancelled.
pub fn resolve_transitive_chains(
    approved: &mut Vec<Candidate>,
    rejected: &mut Vec<Candidate>,
    ctx: &ChainContext,
) -> ChainStats {
    let validator = TerritorialValidator::with_config(ctx.graph, ctx.config);
    let by_seat = index_by_seat(ctx.metrics);
    let max_hours = ctx.config.max_travel_hours;
    let mut stats = ChainStats::default();

    let ties: Vec<usize> = rejected.iter().enumerate()
        .filter(|(_, c)| c.rejection_kind() == Some(RejectionKind::RankNotBetter) && c.dest_seat.is_some())
        .map(|(i, _)| i)
        .collect();

    let mut resolved: AHashSet<usize> = AHashSet::new();
    let mut cancelled: Vec<Candidate> = Vec::new();

    for i in ties {
        let (a, Some(b)) = (rejected[i].origin_seat, rejected[i].dest_seat) else { continue };

        let links: AHashMap<u32, u32> = approved.iter()
            .filter_map(|c| c.dest_seat.map(|d| (c.origin_seat, d)))
            .rev()
            .collect();
        if !links.contains_key(&b) { continue }
        stats.examined += 1;

        let path = match follow_chain(a, b, &links) {
            Ok(path) => path,
            Err(path) => {
                let chain = format_chain(a, &path);
                warn!("[consolidate::transitive] cycle detected while following {chain}; keeping rejection");
                if let Some(r) = rejected[i].rejection.as_mut() {
                    r.reason.push_str(&format!(" (transitive chain aborted, cycle: {chain})"));
                }
                stats.cycles += 1;
                continue;
            }
        };
        let Some(&last) = path.last() else { continue };
        let chain = format_chain(a, &path);

        let Some(final_row) = by_seat.get(&last) else {
            if let Some(r) = rejected[i].rejection.as_mut() {
                r.reason.push_str(&format!(" (chain {chain}: final seat {last} not found in metrics)"));
            }
            continue;
        };
        let (final_score, final_rank) = (row_score(final_row, ctx.config), row_rank(final_row, ctx.graph));
        let origin = &rejected[i];
        if check_standing(origin.origin_score, origin.origin_rank, final_score, final_rank).is_err() {
            if let Some(r) = rejected[i].rejection.as_mut() {
                r.reason.push_str(&format!(" (chain {chain}: origin does not stand below final seat {last})"));
            }
            continue;
        }

        let origin_row = by_seat.get(&a);
        let metrics_time = |dest: u32| origin_row
            .filter(|row| row.dest_code == Some(dest))
            .and_then(|row| row.travel_time_h);
        let evidence_time = |dest: u32| ctx.relations.travel_time(a, dest)
            .into_iter()
            .chain(metrics_time(dest))
            .filter(|&t| t <= max_hours)
            .reduce(f64::min);

        let direct_time = evidence_time(last);
        if direct_time.is_some() || ctx.relations.has_flow(a, last) {
            let mut cand = origin.clone();
            cand.rejection = None;
            cand.dest_seat = Some(last);
            cand.dest_utp = ctx.graph.get_municipality_utp(last).utp().map(|u| u.to_string());
            cand.dest_name = final_row.seat_name.clone();
            cand.dest_score = final_score;
            cand.dest_rank = final_rank;
            cand.rm_dest = normalize_rm_label(&final_row.rm_label);
            cand.travel_time_h = direct_time;
            cand.transitive = true;
            cand.transitive_reason = format!("transitive chain {chain}");
            info!("[consolidate::transitive] approved {a} -> {last} via {chain}");
            approved.push(cand);
            resolved.insert(i);
            stats.transitive += 1;
            continue;
        }

        let evidence_to_b = ctx.relations.has_flow(a, b)
            || evidence_time(b).is_some()
            || origin.travel_time_h.is_some_and(|t| t <= max_hours);
        let utps_touch = origin.dest_utp.as_deref()
            .is_some_and(|dest_utp| validator.are_utps_adjacent(&origin.origin_utp, dest_utp, ctx.geometries));
        let seats_touch = ctx.geometries.are_adjacent(a, b);

        if (evidence_to_b && utps_touch) || seats_touch {
            let next = path[1];
            let mut cand = origin.clone();
            cand.rejection = None;
            cand.local_fallback = true;
            cand.transitive_reason = format!("local fallback: no evidence {a} -> {last} (chain {chain}); cancelled {b} -> {next}");

            if let Some(pos) = approved.iter().position(|c| c.links(b, next)) {
                let mut dropped = approved.remove(pos);
                dropped.reject(RejectionKind::ChainCancelled,
                    format!("cancelled: {a} consolidates locally into {b} instead of reaching {last}"));
                cancelled.push(dropped);
            }
            info!("[consolidate::transitive] approved local fallback {a} -> {b}; cancelled {b} -> {next}");
            approved.push(cand);
            resolved.insert(i);
            stats.local_fallback += 1;
        } else if let Some(r) = rejected[i].rejection.as_mut() {
            r.reason.push_str(&format!(" (chain {chain}: no flow or travel time evidence)"));
        }
    }

    let mut index = 0;
    rejected.retain(|_| {
        let keep = !resolved.contains(&index);
        index += 1;
        keep
    });
    rejected.extend(cancelled);

    info!("[consolidate::transitive] {} chains examined: {} transitive, {} local fallback, {} cycles",
        stats.examined, stats.transitive, stats.local_fallback, stats.cycles);
    stats
}
