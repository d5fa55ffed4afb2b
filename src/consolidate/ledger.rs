use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::io::{read_json, write_json};

/// One executed consolidation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: u64,
    pub source_utp: String,
    pub target_utp: String,
    pub reason: String,
    pub details: Value,
    /// RFC 3339.
    pub timestamp: String,
}

/// Append-only record of the consolidations applied during a run.
#[derive(Debug, Clone, Default)]
pub struct ConsolidationLedger {
    entries: Vec<LedgerEntry>,
}

impl ConsolidationLedger {
    pub fn new() -> Self { Self::default() }

    #[inline] pub fn entries(&self) -> &[LedgerEntry] { &self.entries }

    #[inline] pub fn len(&self) -> usize { self.entries.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Append an entry with the next id and the current time.
    pub fn add(&mut self, source_utp: &str, target_utp: &str, reason: String, details: Value) -> &LedgerEntry {
        let id = self.entries.last().map_or(1, |e| e.id + 1);
        self.entries.push(LedgerEntry {
            id,
            source_utp: source_utp.to_string(),
            target_utp: target_utp.to_string(),
            reason,
            details,
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
        &self.entries[self.entries.len() - 1]
    }

    /// Write the ledger as a JSON list (an empty ledger writes `[]`).
    pub fn save(&self, path: &Path) -> Result<()> {
        write_json(path, &self.entries)
            .with_context(|| format!("[ConsolidationLedger.save] Failed to write {}", path.display()))?;
        info!("[ConsolidationLedger.save] {} entries -> {}", self.entries.len(), path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let entries = read_json(path)
            .with_context(|| format!("[ConsolidationLedger.load] Failed to read {}", path.display()))?;
        Ok(Self { entries })
    }
}
