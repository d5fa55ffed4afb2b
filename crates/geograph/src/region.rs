mod adj;
mod geom;
mod topo;

pub use geom::shared_perimeter;

use std::fmt;
use std::sync::OnceLock;

use geo::{BoundingRect, MultiPolygon, Rect};
use rstar::{AABB, RTree, RTreeObject};

use crate::adj::AdjacencyMatrix;
use crate::unit::UnitId;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur when constructing a `Region`.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionError {
    /// One or more input geometries are invalid or empty.
    InvalidGeometry(String),
    /// The proximity tolerance is negative or not finite.
    InvalidTolerance(f64),
}

impl fmt::Display for RegionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionError::InvalidGeometry(msg) => write!(f, "invalid geometry: {msg}"),
            RegionError::InvalidTolerance(tol) => write!(f, "invalid tolerance: {tol}"),
        }
    }
}

impl std::error::Error for RegionError {}

// ---------------------------------------------------------------------------
// Spatial index entry
// ---------------------------------------------------------------------------

/// Bounding box of a single unit, stored in the R-tree.
#[derive(Clone, Debug)]
pub(crate) struct UnitBox {
    pub(crate) unit: UnitId,
    bbox: AABB<[f64; 2]>,
}

impl RTreeObject for UnitBox {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope { self.bbox }
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// A collection of polygon units (municipalities) in lon/lat degrees, with
/// an R-tree over their bounding boxes and lazily built adjacency matrices.
///
/// Units need not tile the plane: gaps and islands are allowed, which is why
/// two notions of neighbourhood are kept (`touching` and the buffered
/// `adjacency`).
pub struct Region {
    /// Input geometries, indexed by `UnitId.0`.
    pub(crate) geometries: Vec<MultiPolygon<f64>>,

    /// Pre-cached axis-aligned bounding box in lon/lat.
    pub(crate) bounds: Vec<Rect<f64>>,

    /// R-tree over unit bounding boxes.
    pub(crate) rtree: RTree<UnitBox>,

    /// Buffer distance (degrees) used by `adjacency`.
    pub(crate) tolerance: f64,

    /// Buffered adjacency matrix (distance <= tolerance); built on first access.
    pub(crate) adj: OnceLock<AdjacencyMatrix>,

    /// Contact adjacency matrix (shared point); built on first access.
    pub(crate) touching: OnceLock<AdjacencyMatrix>,
}

impl Region {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Build a `Region` from a vector of `MultiPolygon` geometries (one per
    /// unit, in the order that determines `UnitId` assignment).
    ///
    /// `tolerance` is the proximity buffer in degrees used by `adjacency`;
    /// `0.001` (roughly 100 m) absorbs slivers between neighbouring polygons.
    pub fn new(geometries: Vec<MultiPolygon<f64>>, tolerance: f64) -> Result<Self, RegionError> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(RegionError::InvalidTolerance(tolerance));
        }

        let mut bounds = Vec::with_capacity(geometries.len());
        for (i, geom) in geometries.iter().enumerate() {
            let rect = geom.bounding_rect().ok_or_else(|| {
                RegionError::InvalidGeometry(format!("unit {i} has an empty geometry"))
            })?;
            let finite = [rect.min().x, rect.min().y, rect.max().x, rect.max().y]
                .iter().all(|v| v.is_finite());
            if !finite {
                return Err(RegionError::InvalidGeometry(format!("unit {i} has non-finite coordinates")));
            }
            bounds.push(rect);
        }

        let boxes = bounds.iter().enumerate()
            .map(|(i, rect)| UnitBox {
                unit: UnitId::from(i),
                bbox: AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
            })
            .collect();

        Ok(Self {
            geometries,
            bounds,
            rtree: RTree::bulk_load(boxes),
            tolerance,
            adj: OnceLock::new(),
            touching: OnceLock::new(),
        })
    }

    // -----------------------------------------------------------------------
    // Unit access
    // -----------------------------------------------------------------------

    /// Number of units.
    #[inline] pub fn num_units(&self) -> usize { self.geometries.len() }

    /// Proximity buffer used by `adjacency`, in degrees.
    #[inline] pub fn tolerance(&self) -> f64 { self.tolerance }

    /// Iterate over all valid `UnitId`s.
    pub fn unit_ids(&self) -> impl Iterator<Item = UnitId> + '_ {
        (0..self.num_units()).map(UnitId::from)
    }

    /// The input `MultiPolygon` geometry for `unit`.
    pub fn geometry(&self, unit: UnitId) -> &MultiPolygon<f64> {
        &self.geometries[unit.index()]
    }

    /// Units whose bounding box intersects the bounding box of `unit` grown
    /// by `pad` degrees on every side.  Includes `unit` itself.
    pub(crate) fn bbox_candidates(&self, unit: UnitId, pad: f64) -> impl Iterator<Item = UnitId> + '_ {
        let rect = self.bounds[unit.index()];
        let envelope = AABB::from_corners(
            [rect.min().x - pad, rect.min().y - pad],
            [rect.max().x + pad, rect.max().y + pad],
        );
        self.rtree.locate_in_envelope_intersecting(&envelope).map(|b| b.unit)
    }
}
