#![allow(dead_code)]

use geo::{LineString, MultiPolygon, Polygon};
use geograph::Region;

/// Axis-aligned unit square with its lower-left corner at `(x, y)`.
pub fn square(x: f64, y: f64) -> MultiPolygon<f64> {
    let ring = LineString::from(vec![(x, y), (x + 1.0, y), (x + 1.0, y + 1.0), (x, y + 1.0), (x, y)]);
    MultiPolygon::new(vec![Polygon::new(ring, vec![])])
}

/// A 3x3 grid of unit squares; unit `3 * row + col` sits at `(col, row)`.
///
/// ```text
///   6 7 8
///   3 4 5
///   0 1 2
/// ```
pub fn make_grid_region(tolerance: f64) -> Region {
    let squares = (0..9).map(|i| square((i % 3) as f64, (i / 3) as f64)).collect();
    Region::new(squares, tolerance).unwrap()
}
