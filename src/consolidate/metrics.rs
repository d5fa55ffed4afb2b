use std::path::Path;

use anyhow::Result;
use log::{debug, info};

use crate::{graph::TerritorialGraph, io::read_seat_metrics};

/// Socioeconomic and functional indicators of one UTP seat.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeatMetrics {
    pub seat_code: u32,
    pub seat_name: String,
    pub utp_id: String,
    /// Principal flow destination of the seat.
    pub dest_code: Option<u32>,
    /// Travel time to `dest_code`, in hours.
    pub travel_time_h: Option<f64>,
    /// Metropolitan region label; empty when the seat is in none.
    pub rm_label: String,
    /// The seat depends on another centre and has not been resolved yet.
    pub has_alert: bool,
    pub has_airport: bool,
    pub tourism_class: String,
    pub rank_label: String,
    pub population: f64,
    pub uf: Option<String>,
}

/// Source of per-seat metrics for a consolidation pass.
pub trait MetricsProvider {
    /// One row per current seat, reflecting the current state of `graph`.
    fn seat_metrics(&self, graph: &TerritorialGraph) -> Result<Vec<SeatMetrics>>;
}

/// Metrics loaded from a table, re-aligned with the hierarchy on every call.
#[derive(Debug, Clone, Default)]
pub struct TableMetrics {
    rows: Vec<SeatMetrics>,
}

impl TableMetrics {
    pub fn new(rows: Vec<SeatMetrics>) -> Self { Self { rows } }

    pub fn from_csv(path: &Path) -> Result<Self> {
        Ok(Self::new(read_seat_metrics(path)?))
    }

    #[inline] pub fn rows(&self) -> &[SeatMetrics] { &self.rows }
}

impl MetricsProvider for TableMetrics {
    /// Rows whose municipality is no longer a registered seat are dropped;
    /// the remaining rows take the seat's current UTP.
    fn seat_metrics(&self, graph: &TerritorialGraph) -> Result<Vec<SeatMetrics>> {
        let mut synced = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let Some(utp) = graph.get_municipality_utp(row.seat_code).utp().cloned() else {
                debug!("[TableMetrics.seat_metrics] {} is not in the hierarchy", row.seat_code);
                continue;
            };
            if graph.seat_of(&utp) != Some(row.seat_code) {
                debug!("[TableMetrics.seat_metrics] {} is no longer the seat of UTP {utp}", row.seat_code);
                continue;
            }
            synced.push(SeatMetrics { utp_id: utp.to_string(), ..row.clone() });
        }
        info!("[TableMetrics.seat_metrics] {} of {} rows are active seats ({} with dependency alert)",
            synced.len(), self.rows.len(), synced.iter().filter(|r| r.has_alert).count());
        Ok(synced)
    }
}
