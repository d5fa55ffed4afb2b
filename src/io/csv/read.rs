//! CSV reading operations.

use std::{fs::File, path::Path};

use anyhow::{Context, Result};
use log::{info, warn};
use polars::{frame::DataFrame, io::SerReader, prelude::{CsvReadOptions, StringChunked}};

use crate::{consolidate::{FlowRecord, ImpedanceRecord, SeatMetrics}, graph::{BaseRecord, SeatRecord}};

/// Reads a CSV file from `path` into a Polars DataFrame, every column as text.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("[io::csv::read] Failed to open CSV file: {}", path.display()))?;
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(file)
        .finish()
        .with_context(|| format!("[io::csv::read] Failed to read CSV from {:?}", path))
}

/// Municipality code from a cell such as `"2304400"` or `"2304400.0"`.
pub fn parse_code(cell: &str) -> Option<u32> {
    normalize_id(cell).parse().ok()
}

/// Identifier text with surrounding blanks and a float suffix removed.
pub fn normalize_id(cell: &str) -> String {
    let cell = cell.trim();
    cell.strip_suffix(".0").unwrap_or(cell).to_string()
}

pub fn parse_bool(cell: &str) -> bool {
    matches!(cell.trim().to_lowercase().as_str(), "true" | "1" | "1.0" | "sim" | "s" | "yes" | "y")
}

fn parse_f64(cell: &str) -> Option<f64> {
    let value: f64 = cell.trim().replace(',', ".").parse().ok()?;
    value.is_finite().then_some(value)
}

fn required<'a>(df: &'a DataFrame, name: &str) -> Result<&'a StringChunked> {
    df.column(name)
        .with_context(|| format!("[io::csv::read] Missing column '{name}'"))?
        .str()
        .with_context(|| format!("[io::csv::read] Column '{name}' is not text"))
}

fn optional<'a>(df: &'a DataFrame, name: &str) -> Option<&'a StringChunked> {
    df.column(name).ok().and_then(|col| col.str().ok())
}

#[inline]
fn cell<'a>(col: &'a StringChunked, row: usize) -> &'a str {
    col.get(row).unwrap_or("")
}

/// Base territorial records: `cd_mun, nm_mun, utp_id, rm_name`.
pub fn read_base_records(path: &Path) -> Result<Vec<BaseRecord>> {
    let df = read_csv(path)?;
    let (codes, names, utps) = (required(&df, "cd_mun")?, required(&df, "nm_mun")?, required(&df, "utp_id")?);
    let metros = optional(&df, "rm_name");

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let Some(code) = parse_code(cell(codes, row)) else {
            warn!("[io::csv::read] {}: row {row} has no valid cd_mun", path.display());
            continue;
        };
        records.push(BaseRecord {
            code,
            name: cell(names, row).trim().to_string(),
            utp_id: normalize_id(cell(utps, row)),
            rm_name: metros.and_then(|col| col.get(row)).map(|s| s.trim().to_string()),
        });
    }
    info!("[io::csv::read] {} base records from {}", records.len(), path.display());
    Ok(records)
}

/// Seat and rank records: `cd_mun, utp_id, regic`.
pub fn read_seat_records(path: &Path) -> Result<Vec<SeatRecord>> {
    let df = read_csv(path)?;
    let (codes, utps) = (required(&df, "cd_mun")?, required(&df, "utp_id")?);
    let ranks = optional(&df, "regic");

    let records: Vec<SeatRecord> = (0..df.height())
        .filter_map(|row| Some(SeatRecord {
            code: parse_code(cell(codes, row))?,
            utp_id: normalize_id(cell(utps, row)),
            rank_label: ranks.map(|col| cell(col, row).trim().to_string()).unwrap_or_default(),
        }))
        .collect();
    info!("[io::csv::read] {} seat records from {}", records.len(), path.display());
    Ok(records)
}

/// Per-seat metrics table.
pub fn read_seat_metrics(path: &Path) -> Result<Vec<SeatMetrics>> {
    let df = read_csv(path)?;
    let seats = required(&df, "cd_mun_sede")?;
    let names = optional(&df, "nm_sede");
    let utps = optional(&df, "utp_id");
    let dests = optional(&df, "principal_destino_cd");
    let times = optional(&df, "tempo_ate_destino_h");
    let metros = optional(&df, "regiao_metropolitana");
    let alerts = optional(&df, "tem_alerta_dependencia");
    let airports = optional(&df, "tem_aeroporto");
    let tourism = optional(&df, "turismo");
    let ranks = optional(&df, "regic");
    let populations = optional(&df, "populacao");
    let ufs = optional(&df, "uf");

    let text = |col: Option<&StringChunked>, row: usize| col.map(|c| cell(c, row).trim().to_string()).unwrap_or_default();

    let mut rows = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let Some(seat_code) = parse_code(cell(seats, row)) else { continue };
        rows.push(SeatMetrics {
            seat_code,
            seat_name: text(names, row),
            utp_id: normalize_id(&text(utps, row)),
            dest_code: dests.and_then(|c| parse_code(cell(c, row))),
            travel_time_h: times.and_then(|c| parse_f64(cell(c, row))),
            rm_label: text(metros, row),
            has_alert: alerts.is_some_and(|c| parse_bool(cell(c, row))),
            has_airport: airports.is_some_and(|c| parse_bool(cell(c, row))),
            tourism_class: text(tourism, row),
            rank_label: text(ranks, row),
            population: populations.and_then(|c| parse_f64(cell(c, row))).unwrap_or(0.0),
            uf: ufs.map(|c| cell(c, row).trim().to_string()).filter(|s| !s.is_empty()),
        });
    }
    info!("[io::csv::read] {} seat metrics rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Trip table: `mun_origem, mun_destino, viagens`.
pub fn read_flows(path: &Path) -> Result<Vec<FlowRecord>> {
    let df = read_csv(path)?;
    let (origins, dests, trips) = (required(&df, "mun_origem")?, required(&df, "mun_destino")?, required(&df, "viagens")?);
    let records: Vec<FlowRecord> = (0..df.height())
        .filter_map(|row| Some(FlowRecord {
            origin: parse_code(cell(origins, row))?,
            dest: parse_code(cell(dests, row))?,
            trips: parse_f64(cell(trips, row))?,
        }))
        .collect();
    info!("[io::csv::read] {} flow records from {}", records.len(), path.display());
    Ok(records)
}

/// Travel time table: `mun_origem, mun_destino, tempo_h`.
pub fn read_impedances(path: &Path) -> Result<Vec<ImpedanceRecord>> {
    let df = read_csv(path)?;
    let (origins, dests, hours) = (required(&df, "mun_origem")?, required(&df, "mun_destino")?, required(&df, "tempo_h")?);
    let records: Vec<ImpedanceRecord> = (0..df.height())
        .filter_map(|row| Some(ImpedanceRecord {
            origin: parse_code(cell(origins, row))?,
            dest: parse_code(cell(dests, row))?,
            hours: parse_f64(cell(hours, row))?,
        }))
        .collect();
    info!("[io::csv::read] {} impedance records from {}", records.len(), path.display());
    Ok(records)
}
