use std::collections::BTreeMap;

use ahash::AHashMap;
use anyhow::{Result, anyhow};
use geo::{BooleanOps, MultiPolygon};
use geograph::{AdjacencyMatrix, Region, UnitId};
use log::{info, warn};

/// Municipality polygons keyed by IBGE code, backed by a `geograph::Region`.
///
/// Codes are assigned units in ascending order, so unit order is stable
/// regardless of input order.
pub struct MunicipalityGeometries {
    codes: Vec<u32>,
    index: AHashMap<u32, UnitId>,
    region: Region,
}

impl MunicipalityGeometries {
    /// Build from `(code, polygon)` pairs.  Repeated codes are dissolved into
    /// one polygon; empty polygons are dropped with a warning.
    pub fn new(features: impl IntoIterator<Item = (u32, MultiPolygon<f64>)>, tolerance: f64) -> Result<Self> {
        let mut merged: BTreeMap<u32, MultiPolygon<f64>> = BTreeMap::new();
        let mut dropped = 0usize;
        for (code, geom) in features {
            if geom.0.is_empty() { dropped += 1; continue }
            match merged.remove(&code) {
                Some(prev) => { merged.insert(code, prev.union(&geom)); }
                None => { merged.insert(code, geom); }
            }
        }
        if dropped > 0 {
            warn!("[MunicipalityGeometries.new] dropped {dropped} empty geometries");
        }

        let (codes, geoms): (Vec<u32>, Vec<MultiPolygon<f64>>) = merged.into_iter().unzip();
        let index = codes.iter().enumerate().map(|(i, &code)| (code, UnitId::from(i))).collect();
        let region = Region::new(geoms, tolerance)
            .map_err(|e| anyhow!("[MunicipalityGeometries.new] {e}"))?;

        Ok(Self { codes, index, region })
    }

    #[inline] pub fn len(&self) -> usize { self.codes.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.codes.is_empty() }

    /// All codes with a geometry, ascending.
    #[inline] pub fn codes(&self) -> &[u32] { &self.codes }

    #[inline] pub fn contains(&self, code: u32) -> bool { self.index.contains_key(&code) }

    #[inline] pub fn unit(&self, code: u32) -> Option<UnitId> { self.index.get(&code).copied() }

    #[inline] pub fn code(&self, unit: UnitId) -> u32 { self.codes[unit.index()] }

    #[inline] pub fn region(&self) -> &Region { &self.region }

    pub fn geometry(&self, code: u32) -> Option<&MultiPolygon<f64>> {
        self.unit(code).map(|unit| self.region.geometry(unit))
    }

    /// Buffered adjacency over all municipalities.  Built once, on first call.
    pub fn adjacency(&self) -> &AdjacencyMatrix {
        let first = !self.region.is_adjacency_built();
        let adj = self.region.adjacency();
        if first {
            let isolated = self.region.unit_ids().filter(|&u| adj.neighbors(u).is_empty()).count();
            info!("[MunicipalityGeometries.adjacency] {} municipalities, {} adjacencies (tolerance {}°)",
                adj.num_units(), adj.num_edges(), self.region.tolerance());
            if isolated > 0 {
                warn!("[MunicipalityGeometries.adjacency] {isolated} municipalities have no neighbours");
            }
        }
        adj
    }

    /// Returns `true` if both municipalities have geometry and are adjacent.
    pub fn are_adjacent(&self, a: u32, b: u32) -> bool {
        match (self.unit(a), self.unit(b)) {
            (Some(ua), Some(ub)) => self.adjacency().contains(ua, ub),
            _ => false,
        }
    }

    /// Adjacent municipality codes of `code`, ascending.
    pub fn neighbors(&self, code: u32) -> Vec<u32> {
        self.unit(code)
            .map(|unit| self.adjacency().neighbors(unit).iter().map(|&u| self.code(u)).collect())
            .unwrap_or_default()
    }

    /// Municipalities lying within `tol` degrees of `code`, ascending.
    pub fn within(&self, code: u32, tol: f64) -> Vec<u32> {
        self.unit(code)
            .map(|unit| self.region.within(unit, tol).into_iter().map(|u| self.code(u)).collect())
            .unwrap_or_default()
    }

    /// Returns `true` if any of `others` lies within `tol` degrees of `code`.
    pub fn any_within(&self, code: u32, others: &[u32], tol: f64) -> bool {
        let Some(unit) = self.unit(code) else { return false };
        self.region.any_within(unit, self.units(others), tol)
    }

    /// Union of the polygons of `codes` (codes without geometry are skipped).
    pub fn union_of(&self, codes: &[u32]) -> MultiPolygon<f64> {
        self.region.union_of(self.units(codes))
    }

    /// Length in metres of the boundary `code` shares with the union of `others`.
    pub fn shared_boundary_length(&self, code: u32, others: &[u32]) -> f64 {
        let Some(unit) = self.unit(code) else { return 0.0 };
        self.region.shared_boundary_length(unit, self.units(others))
    }

    /// Members of `codes` unreachable from `seed` through touching members.
    /// Returns `None` if `seed` has no geometry or is not in `codes`.
    pub fn unreachable_from(&self, seed: u32, codes: &[u32]) -> Option<Vec<u32>> {
        let seed_unit = self.unit(seed)?;
        let reached = self.region.reachable_from(seed_unit, self.units(codes))?;
        let reached: Vec<u32> = reached.into_iter().map(|u| self.code(u)).collect();
        Some(codes.iter().copied().filter(|c| self.contains(*c) && !reached.contains(c)).collect())
    }

    fn units<'a>(&'a self, codes: &'a [u32]) -> impl Iterator<Item = UnitId> + 'a {
        codes.iter().filter_map(|&code| self.unit(code))
    }
}
