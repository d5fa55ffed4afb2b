use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

/// Output file names written by a consolidation pass.
pub const RESULT_CSV: &str = "seat_consolidation_result.csv";
pub const LEDGER_JSON: &str = "consolidation_ledger.json";
pub const COLORING_JSON: &str = "utp_coloring.json";
pub const SNAPSHOT_JSON: &str = "snapshot_seat_consolidation.json";

/// Tunables of a seat consolidation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationConfig {
    /// Longest admissible travel time to the destination seat, in hours.
    pub max_travel_hours: f64,
    /// Buffer for the municipality adjacency graph, in degrees (~100 m).
    pub adjacency_tolerance_deg: f64,
    /// Buffer used when checking whether a municipality may change UTP (~1 km).
    pub change_buffer_deg: f64,
    /// Buffer used when listing neighbouring UTPs (~5 km).
    pub neighbor_buffer_deg: f64,
    /// Tourism class substring that scores one infrastructure point.
    pub tourism_marker: String,
    /// Directory receiving the result CSV, ledger, coloring and snapshot.
    pub output_dir: String,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            max_travel_hours: 2.0,
            adjacency_tolerance_deg: 0.001,
            change_buffer_deg: 0.01,
            neighbor_buffer_deg: 0.05,
            tourism_marker: "1 - Município Turístico".to_string(),
            output_dir: "data/03_processed".to_string(),
        }
    }
}

impl ConsolidationConfig {
    /// Read a JSON config file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("[ConsolidationConfig.from_json_file] Failed to open {}", path.display()))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("[ConsolidationConfig.from_json_file] Failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.max_travel_hours.is_finite() && self.max_travel_hours > 0.0,
            "[ConsolidationConfig.validate] max_travel_hours must be positive, got {}", self.max_travel_hours);
        for (name, value) in [
            ("adjacency_tolerance_deg", self.adjacency_tolerance_deg),
            ("change_buffer_deg", self.change_buffer_deg),
            ("neighbor_buffer_deg", self.neighbor_buffer_deg),
        ] {
            ensure!(value.is_finite() && value >= 0.0,
                "[ConsolidationConfig.validate] {name} must be non-negative, got {value}");
        }
        Ok(())
    }
}
