use log::{info, warn};

use crate::types::NO_METRO;

use super::TerritorialGraph;

/// One row of the base territorial table.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseRecord {
    pub code: u32,
    pub name: String,
    pub utp_id: String,
    /// Metropolitan region name; `None`, empty and `"nan"` mean no region.
    pub rm_name: Option<String>,
}

/// One row of the seat/rank table.
#[derive(Debug, Clone, PartialEq)]
pub struct SeatRecord {
    pub code: u32,
    pub utp_id: String,
    pub rank_label: String,
}

impl BaseRecord {
    /// Metro region this record belongs to, with missing values mapped to `NO_METRO`.
    pub fn metro(&self) -> &str {
        match self.rm_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() && !name.eq_ignore_ascii_case("nan") => name,
            _ => NO_METRO,
        }
    }
}

impl TerritorialGraph {
    /// Bulk construction: seat records fill the seat registry and the rank
    /// lookup, base records create Metro -> UTP -> Municipality parentage.
    pub fn load_from_records(&mut self, base: &[BaseRecord], seats: &[SeatRecord]) {
        for seat in seats {
            self.register_seat(&seat.utp_id, seat.code);
            self.set_rank_label(seat.code, &seat.rank_label);
        }

        for record in base {
            self.add_utp(&record.utp_id, Some(record.metro()));
            self.add_municipality(record.code, &record.name, &record.utp_id);
        }

        let stray: Vec<_> = self.utp_seeds.iter()
            .filter(|(utp, code)| !self.get_municipality_utp(**code).is(utp))
            .map(|(utp, code)| format!("{utp}:{code}"))
            .collect();
        if !stray.is_empty() {
            warn!("[TerritorialGraph.load_from_records] {} seats are not members of their UTP: {}",
                stray.len(), stray.join(", "));
        }

        let flagged = self.sync_seat_flags();
        info!("[TerritorialGraph.load_from_records] {} municipalities, {} UTPs, {} seats",
            self.municipality_codes().len(), self.utp_ids().len(), flagged);
    }
}
