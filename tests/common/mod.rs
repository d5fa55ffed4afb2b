#![allow(dead_code)]

use geo::{MultiPolygon, polygon};

use openutp::{
    MunicipalityGeometries, TerritorialGraph,
    consolidate::SeatMetrics,
    graph::{BaseRecord, SeatRecord},
};

/// Unit square with lower-left corner at `(x, y)`.
pub fn square(x: f64, y: f64) -> MultiPolygon<f64> {
    MultiPolygon(vec![polygon![
        (x: x, y: y),
        (x: x + 1.0, y: y),
        (x: x + 1.0, y: y + 1.0),
        (x: x, y: y + 1.0),
        (x: x, y: y),
    ]])
}

pub fn geometries(features: &[(u32, f64, f64)]) -> MunicipalityGeometries {
    MunicipalityGeometries::new(features.iter().map(|&(code, x, y)| (code, square(x, y))), 0.001).unwrap()
}

/// Build a graph from `(code, utp, metro)` rows; the first member listed for
/// a UTP becomes its seat.
pub fn make_graph(rows: &[(u32, &str, Option<&str>)]) -> TerritorialGraph {
    let base: Vec<BaseRecord> = rows.iter()
        .map(|&(code, utp, metro)| BaseRecord {
            code,
            name: format!("Mun {code}"),
            utp_id: utp.to_string(),
            rm_name: metro.map(str::to_string),
        })
        .collect();

    let mut seats: Vec<SeatRecord> = Vec::new();
    for &(code, utp, _) in rows {
        if !seats.iter().any(|s| s.utp_id == utp) {
            seats.push(SeatRecord { code, utp_id: utp.to_string(), rank_label: "Centro Local".to_string() });
        }
    }

    let mut graph = TerritorialGraph::new();
    graph.load_from_records(&base, &seats);
    graph
}

/// Metrics row of a seat with no infrastructure and no dependency alert.
pub fn seat_row(code: u32, name: &str, utp: &str, rank: &str) -> SeatMetrics {
    SeatMetrics {
        seat_code: code,
        seat_name: name.to_string(),
        utp_id: utp.to_string(),
        rank_label: rank.to_string(),
        ..Default::default()
    }
}

/// Same row with a dependency alert towards `dest`.
pub fn alert_row(code: u32, name: &str, utp: &str, rank: &str, dest: u32, hours: f64) -> SeatMetrics {
    SeatMetrics {
        dest_code: Some(dest),
        travel_time_h: Some(hours),
        has_alert: true,
        ..seat_row(code, name, utp, rank)
    }
}
