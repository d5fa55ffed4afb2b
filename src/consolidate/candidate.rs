use std::{cmp::Reverse, fmt};

/// Why a candidate was not (or is no longer) approved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    InvalidDestination,
    SameUtp,
    TravelTimeExceeded,
    MetroMismatch,
    NotAdjacent,
    SelfSufficient,
    RankNotBetter,
    ReciprocalConflict,
    ChainCancelled,
    ExecutionFailed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub kind: RejectionKind,
    pub reason: String,
}

/// Proposed merge of the UTP of `origin_seat` into the UTP of `dest_seat`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Candidate {
    pub origin_seat: u32,
    pub origin_name: String,
    pub origin_utp: String,
    /// Registered seat of the destination UTP (unset when it could not be resolved).
    pub dest_seat: Option<u32>,
    pub dest_name: String,
    pub dest_utp: Option<String>,
    /// Principal flow destination reported for the origin seat.
    pub flow_dest: Option<u32>,
    pub travel_time_h: Option<f64>,
    pub origin_score: u8,
    pub dest_score: u8,
    pub origin_rank: u8,
    pub dest_rank: u8,
    pub rm_origin: String,
    pub rm_dest: String,
    pub rejection: Option<Rejection>,
    pub transitive: bool,
    pub transitive_reason: String,
    pub local_fallback: bool,
}

impl Candidate {
    #[inline] pub fn is_approved(&self) -> bool { self.rejection.is_none() }

    #[inline] pub fn rejection_kind(&self) -> Option<RejectionKind> { self.rejection.as_ref().map(|r| r.kind) }

    /// Mark this candidate rejected, replacing any previous rejection.
    pub fn reject(&mut self, kind: RejectionKind, reason: impl Into<String>) {
        self.rejection = Some(Rejection { kind, reason: reason.into() });
    }

    /// Returns `true` if this candidate moves `origin` towards `dest`.
    pub fn links(&self, origin: u32, dest: u32) -> bool {
        self.origin_seat == origin && self.dest_seat == Some(dest)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (UTP {}) -> ", self.origin_name, self.origin_utp)?;
        match (&self.dest_seat, &self.dest_utp) {
            (Some(_), Some(utp)) => write!(f, "{} (UTP {utp})", self.dest_name),
            _ => f.write_str("?"),
        }
    }
}

/// Infrastructure score: one point for an airport, one for the tourism marker.
pub fn infrastructure_score(has_airport: bool, tourism_class: &str, tourism_marker: &str) -> u8 {
    has_airport as u8 + (!tourism_marker.is_empty() && tourism_class.contains(tourism_marker)) as u8
}

/// Sort key of a seat: higher score first, then lower (more influential) rank.
#[inline]
pub fn standing(score: u8, rank: u8) -> (Reverse<u8>, u8) {
    (Reverse(score), rank)
}

/// Decide whether an origin seat may merge into a destination seat.
///
/// The origin must score 0; the destination must then stand strictly higher,
/// i.e. score at least 1, or score 0 with a better rank.
pub fn check_standing(origin_score: u8, origin_rank: u8, dest_score: u8, dest_rank: u8) -> Result<(), Rejection> {
    if origin_score != 0 {
        return Err(Rejection {
            kind: RejectionKind::SelfSufficient,
            reason: format!("origin score {origin_score} > 0: seat is self-sufficient"),
        });
    }
    if standing(dest_score, dest_rank) < standing(origin_score, origin_rank) {
        return Ok(());
    }
    Err(Rejection {
        kind: RejectionKind::RankNotBetter,
        reason: format!("both score 0, destination rank not better ({dest_rank} >= {origin_rank})"),
    })
}
