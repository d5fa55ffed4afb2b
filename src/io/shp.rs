//! ESRI shapefile municipality geometries.

use std::path::Path;

use anyhow::{Context, Result};
use geo::{Coord, LineString, MultiPolygon, Polygon};
use log::{info, warn};
use shapefile::{PolygonRing, Reader, Shape, dbase::FieldValue};

use super::{csv::parse_code, geojson::CODE_PROPERTY};

/// Convert a shapefile polygon into a `geo::MultiPolygon`: each outer ring
/// starts a polygon and the inner rings that follow are its holes.
pub fn shp_to_geo(p: &shapefile::Polygon) -> MultiPolygon<f64> {
    fn ring_to_geo(points: &[shapefile::Point]) -> LineString<f64> {
        let mut coords: Vec<Coord<f64>> = points.iter().map(|pt| Coord { x: pt.x, y: pt.y }).collect();
        if !coords.is_empty() && coords[0] != coords[coords.len() - 1] {
            coords.push(coords[0]);
        }
        LineString(coords)
    }

    let mut polys = Vec::new();
    let mut exterior: Option<LineString<f64>> = None;
    let mut holes = Vec::new();
    for ring in p.rings() {
        match ring {
            PolygonRing::Outer(points) => {
                if let Some(ext) = exterior.replace(ring_to_geo(points)) {
                    polys.push(Polygon::new(ext, std::mem::take(&mut holes)));
                }
            }
            PolygonRing::Inner(points) => holes.push(ring_to_geo(points)),
        }
    }
    if let Some(ext) = exterior {
        polys.push(Polygon::new(ext, holes));
    }
    MultiPolygon(polys)
}

fn field_code(value: Option<&FieldValue>) -> Option<u32> {
    match value? {
        FieldValue::Character(Some(s)) => parse_code(s),
        FieldValue::Numeric(Some(n)) => parse_code(&n.to_string()),
        FieldValue::Integer(n) => u32::try_from(*n).ok(),
        _ => None,
    }
}

/// Read `(code, geometry)` pairs from a polygon shapefile with a `CD_MUN` attribute.
pub fn read_shapefile(path: &Path) -> Result<Vec<(u32, MultiPolygon<f64>)>> {
    let mut reader = Reader::from_path(path)
        .with_context(|| format!("[io::shp] Failed to open shapefile: {}", path.display()))?;

    let mut out = Vec::new();
    for (idx, result) in reader.iter_shapes_and_records().enumerate() {
        let (shape, record) = result
            .with_context(|| format!("[io::shp] Failed to read record {idx} of {}", path.display()))?;
        let Some(code) = field_code(record.get(CODE_PROPERTY)) else {
            warn!("[io::shp] record {idx} has no {CODE_PROPERTY}; skipped");
            continue;
        };
        match shape {
            Shape::Polygon(p) => out.push((code, shp_to_geo(&p))),
            other => warn!("[io::shp] {code}: unsupported shape {:?}; skipped", other.shapetype()),
        }
    }
    info!("[io::shp] {} municipality geometries from {}", out.len(), path.display());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outer_rings_start_polygons() {
        let square = |x: f64| vec![
            shapefile::Point { x, y: 0.0 },
            shapefile::Point { x, y: 1.0 },
            shapefile::Point { x: x + 1.0, y: 1.0 },
            shapefile::Point { x: x + 1.0, y: 0.0 },
            shapefile::Point { x, y: 0.0 },
        ];
        let hole = vec![
            shapefile::Point { x: 0.25, y: 0.25 },
            shapefile::Point { x: 0.75, y: 0.25 },
            shapefile::Point { x: 0.75, y: 0.75 },
            shapefile::Point { x: 0.25, y: 0.25 },
        ];
        let polygon = shapefile::Polygon::with_rings(vec![
            PolygonRing::Outer(square(0.0)),
            PolygonRing::Inner(hole),
            PolygonRing::Outer(square(5.0)),
        ]);
        let mp = shp_to_geo(&polygon);
        assert_eq!(mp.0.len(), 2);
        assert_eq!(mp.0[0].interiors().len(), 1);
        assert!(mp.0[1].interiors().is_empty());
    }

    #[test]
    fn codes_come_from_text_or_numbers() {
        assert_eq!(field_code(Some(&FieldValue::Character(Some("2611101".into())))), Some(2611101));
        assert_eq!(field_code(Some(&FieldValue::Numeric(Some(2611101.0)))), Some(2611101));
        assert_eq!(field_code(Some(&FieldValue::Character(None))), None);
        assert_eq!(field_code(None), None);
    }
}
