//! Format-specific reading and writing operations.
//!
//! - `csv` - tabular input records and result tables
//! - `json` - snapshots, ledgers, colorings and configuration
//! - `geojson` / `shp` - municipality geometries keyed by `CD_MUN`

mod csv;
mod fs;
mod geojson;
mod json;
mod shp;

use std::path::Path;

use anyhow::{Result, bail};
use geo::MultiPolygon;

pub use csv::*;
pub use fs::*;
pub use geojson::{CODE_PROPERTY, read_geojson, read_geojson_bytes};
pub use json::*;
pub use shp::{read_shapefile, shp_to_geo};

/// Read municipality geometries from a `.geojson`/`.json` or `.shp` file.
pub fn read_geometries(path: &Path) -> Result<Vec<(u32, MultiPolygon<f64>)>> {
    let ext = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("geojson" | "json") => read_geojson(path),
        Some("shp") => read_shapefile(path),
        _ => bail!("[io::read_geometries] Unsupported geometry file: {}", path.display()),
    }
}
