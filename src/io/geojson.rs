//! GeoJSON municipality geometries.

use std::{fs, path::Path};

use anyhow::{Context, Result, anyhow, bail};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use log::{info, warn};
use serde_json::Value;

use super::csv::parse_code;

/// Property holding the municipality code.
pub const CODE_PROPERTY: &str = "CD_MUN";

/// Read `(code, geometry)` pairs from a GeoJSON FeatureCollection file.
pub fn read_geojson(path: &Path) -> Result<Vec<(u32, MultiPolygon<f64>)>> {
    let bytes = fs::read(path)
        .with_context(|| format!("[io::geojson] Failed to read {}", path.display()))?;
    let features = read_geojson_bytes(&bytes)
        .with_context(|| format!("[io::geojson] Invalid GeoJSON in {}", path.display()))?;
    info!("[io::geojson] {} municipality geometries from {}", features.len(), path.display());
    Ok(features)
}

/// Parse a FeatureCollection of Polygon / MultiPolygon features keyed by
/// `CD_MUN` (text or number).  Features without a code or with another
/// geometry type are skipped.
pub fn read_geojson_bytes(bytes: &[u8]) -> Result<Vec<(u32, MultiPolygon<f64>)>> {
    let value: Value = serde_json::from_slice(bytes).context("[io::geojson] Failed to parse GeoJSON")?;
    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("[io::geojson] Expected a FeatureCollection with a 'features' array"))?;

    let mut out = Vec::with_capacity(features.len());
    for (idx, feature) in features.iter().enumerate() {
        let code = match &feature["properties"][CODE_PROPERTY] {
            Value::String(s) => parse_code(s),
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok())
                .or_else(|| n.as_f64().and_then(|f| parse_code(&f.to_string()))),
            _ => None,
        };
        let Some(code) = code else {
            warn!("[io::geojson] feature {idx} has no {CODE_PROPERTY}; skipped");
            continue;
        };

        let geometry = &feature["geometry"];
        let coords = geometry["coordinates"].as_array();
        let multipolygon = match (geometry["type"].as_str(), coords) {
            (Some("Polygon"), Some(rings)) => MultiPolygon(vec![parse_polygon(rings)?]),
            (Some("MultiPolygon"), Some(polygons)) => MultiPolygon(polygons.iter()
                .map(|p| p.as_array()
                    .ok_or_else(|| anyhow!("[io::geojson] {code}: polygon is not an array"))
                    .and_then(|rings| parse_polygon(rings)))
                .collect::<Result<Vec<_>>>()?),
            (kind, _) => {
                warn!("[io::geojson] {code}: unsupported geometry {kind:?}; skipped");
                continue;
            }
        };
        out.push((code, multipolygon));
    }
    Ok(out)
}

/// `[exterior, hole, hole, ...]`.
fn parse_polygon(rings: &[Value]) -> Result<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| match ring.as_array() {
        Some(coords) => parse_ring(coords),
        None => bail!("[io::geojson] ring is not an array"),
    });
    let exterior = rings.next()
        .ok_or_else(|| anyhow!("[io::geojson] polygon has no exterior ring"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn parse_ring(coords: &[Value]) -> Result<LineString<f64>> {
    let mut points = Vec::with_capacity(coords.len() + 1);
    for pair in coords {
        let (Some(x), Some(y)) = (pair[0].as_f64(), pair[1].as_f64()) else {
            bail!("[io::geojson] invalid coordinate {pair}");
        };
        points.push(Coord { x, y });
    }
    if !points.is_empty() && points[0] != points[points.len() - 1] {
        points.push(points[0]);
    }
    Ok(LineString(points))
}
