use ahash::{AHashMap, AHashSet};
use log::{info, warn};

use super::{candidate::{Candidate, RejectionKind}, relations::FunctionalRelations};

/// Resolve reciprocal candidates (A -> B together with B -> A).
///
/// The seat with the larger total outgoing flow stays: its own candidate is
/// discarded and the other side's is kept.  Equal flows discard both.  Without
/// a trip table every flow is zero, so every reciprocal pair is discarded.
///
/// Returns `(kept, discarded)`; discarded candidates carry the comparison as
/// their rejection reason.
pub fn resolve_reciprocal_conflicts(approved: Vec<Candidate>, relations: &FunctionalRelations) -> (Vec<Candidate>, Vec<Candidate>) {
    let targets: AHashMap<u32, u32> = approved.iter()
        .filter_map(|c| c.dest_seat.map(|dest| (c.origin_seat, dest)))
        .collect();

    let mut decided: AHashSet<u32> = AHashSet::new();
    let mut removed: AHashMap<u32, String> = AHashMap::new();
    let mut warned = false;

    for cand in &approved {
        let (a, Some(b)) = (cand.origin_seat, cand.dest_seat) else { continue };
        if targets.get(&b) != Some(&a) || decided.contains(&a) || decided.contains(&b) { continue }
        decided.extend([a, b]);

        if !relations.has_flow_table() && !warned {
            warn!("[consolidate::conflict] no trip table: reciprocal conflicts are resolved as equal flows");
            warned = true;
        }

        let (flow_a, flow_b) = (relations.total_flow(a), relations.total_flow(b));
        if flow_a == flow_b {
            let reason = format!("reciprocal conflict with equal flow ({flow_a}); neither seat moves");
            removed.insert(a, reason.clone());
            removed.insert(b, reason);
        } else {
            let (stay, go, flow_stay, flow_go) = if flow_a > flow_b { (a, b, flow_a, flow_b) } else { (b, a, flow_b, flow_a) };
            removed.insert(stay, format!(
                "reciprocal conflict: {stay} has larger flow ({flow_stay}) than {go} ({flow_go}); {stay} stays, {go} moves"
            ));
        }
    }

    if removed.is_empty() { return (approved, Vec::new()) }

    let before = approved.len();
    let (mut discarded, kept): (Vec<Candidate>, Vec<Candidate>) = approved.into_iter()
        .partition(|c| removed.contains_key(&c.origin_seat));
    for cand in &mut discarded {
        if let Some(reason) = removed.remove(&cand.origin_seat) {
            cand.reject(RejectionKind::ReciprocalConflict, reason);
        }
    }
    info!("[consolidate::conflict] resolved {} reciprocal candidates; candidates reduced {} -> {}",
        discarded.len(), before, kept.len());
    (kept, discarded)
}
