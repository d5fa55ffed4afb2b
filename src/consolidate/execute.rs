use anyhow::{Context, Result, bail};
use log::{debug, info, warn};

use crate::graph::TerritorialGraph;

use super::candidate::Candidate;

/// What one executed candidate changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedMove {
    pub origin_utp: String,
    pub dest_utp: String,
    pub moved: Vec<u32>,
    /// Seat of the destination UTP after the move.
    pub dest_seat: u32,
    /// New seat of the origin UTP, if it kept any members.
    pub origin_seat: Option<u32>,
    pub origin_removed: bool,
}

/// Merge the whole origin UTP of `cand` into its destination.
///
/// The destination UTP is re-resolved from the destination seat so that
/// earlier moves of the same pass are taken into account.
pub fn execute_candidate(graph: &mut TerritorialGraph, cand: &Candidate) -> Result<ExecutedMove> {
    let dest_seat = cand.dest_seat
        .with_context(|| format!("[consolidate::execute] candidate {cand} has no destination seat"))?;
    let origin_utp = graph.get_municipality_utp(cand.origin_seat).utp().cloned()
        .with_context(|| format!("[consolidate::execute] origin seat {} has no UTP", cand.origin_seat))?;
    let dest_utp = graph.get_municipality_utp(dest_seat).utp().cloned()
        .with_context(|| format!("[consolidate::execute] destination seat {dest_seat} has no UTP"))?;
    if origin_utp == dest_utp {
        bail!("[consolidate::execute] {} and {dest_seat} are already in UTP {origin_utp}", cand.origin_seat);
    }
    if cand.dest_utp.as_deref().is_some_and(|recorded| recorded != dest_utp.as_ref()) {
        info!("[consolidate::execute] destination of {} resolved to UTP {dest_utp} (recorded {:?})",
            cand.origin_seat, cand.dest_utp);
    }

    let members = graph.utp_members(&origin_utp);
    for &code in &members {
        graph.move_municipality(code, &dest_utp)
            .with_context(|| format!("[consolidate::execute] moving {code} into UTP {dest_utp}"))?;
    }

    let origin_seat_moved = graph.get_municipality_utp(cand.origin_seat).is(&dest_utp);
    if origin_seat_moved {
        graph.set_seat_flag(cand.origin_seat, false);
    }

    let remaining = graph.utp_members(&origin_utp);
    let (origin_seat, origin_removed) = if remaining.is_empty() {
        graph.remove_utp(&origin_utp)?;
        (None, true)
    } else {
        let seat = remaining.iter().copied()
            .find(|&code| graph.is_seat_flagged(code))
            .unwrap_or(remaining[0]);
        graph.set_seat(&origin_utp, seat)?;
        debug!("[consolidate::execute] UTP {origin_utp} keeps {} members, seat -> {seat}", remaining.len());
        (Some(seat), false)
    };

    let dest_seat = ensure_seat(graph, &dest_utp, [Some(dest_seat), Some(cand.origin_seat)])?;

    debug!("[consolidate::execute] moved {} municipalities {origin_utp} -> {dest_utp}", members.len());
    Ok(ExecutedMove {
        origin_utp: origin_utp.to_string(),
        dest_utp: dest_utp.to_string(),
        moved: members,
        dest_seat,
        origin_seat,
        origin_removed,
    })
}

/// Make sure `utp_id` ends with a member seat: its registered seat if still a
/// member, else the first preferred code that is a member, else its smallest
/// member.
fn ensure_seat(graph: &mut TerritorialGraph, utp_id: &str, preferred: [Option<u32>; 2]) -> Result<u32> {
    let current = graph.seat_of(utp_id).filter(|&s| graph.get_municipality_utp(s).is(utp_id));
    let seat = current
        .or_else(|| preferred.into_iter().flatten().find(|&code| graph.get_municipality_utp(code).is(utp_id)))
        .or_else(|| graph.utp_members(utp_id).first().copied());
    let Some(seat) = seat else {
        bail!("[consolidate::execute] UTP {utp_id} has no members to hold its seat");
    };
    if current.is_none() {
        warn!("[consolidate::execute] UTP {utp_id} had no valid seat; assigned {seat}");
    }
    graph.set_seat(utp_id, seat)?;
    Ok(seat)
}
