use std::{cmp::Reverse, collections::BTreeMap};

use ahash::{AHashMap, AHashSet};
use geograph::{AdjacencyMatrix, Region, UnitId};
use log::{error, info};

use crate::geom::MunicipalityGeometries;

use super::TerritorialGraph;

impl TerritorialGraph {
    /// Color UTPs so that touching UTPs differ, and return the color of every
    /// municipality (members inherit their UTP's color).
    ///
    /// UTPs without any member geometry get color 0.  If the UTP-level
    /// adjacency cannot be computed the result is empty.
    pub fn compute_utp_coloring(&self, geometries: &MunicipalityGeometries) -> BTreeMap<u32, usize> {
        let utps = self.utp_ids();
        let members: Vec<Vec<u32>> = utps.iter().map(|utp| self.utp_members(utp)).collect();

        let mut dissolved = Vec::new();
        let mut slot = AHashMap::new();
        for (i, codes) in members.iter().enumerate() {
            let shape = geometries.union_of(codes);
            if shape.0.is_empty() { continue }
            slot.insert(i, dissolved.len());
            dissolved.push(shape);
        }

        let region = match Region::new(dissolved, 0.0) {
            Ok(region) => region,
            Err(e) => {
                error!("[TerritorialGraph.compute_utp_coloring] UTP adjacency failed: {e}");
                return BTreeMap::new();
            }
        };
        let colors = dsatur(region.touching());
        info!("[TerritorialGraph.compute_utp_coloring] {} UTPs colored with {} colors ({} without geometry)",
            colors.len(), colors.iter().max().map_or(0, |c| c + 1), utps.len() - colors.len());

        let mut coloring = BTreeMap::new();
        for (i, codes) in members.iter().enumerate() {
            let color = slot.get(&i).map_or(0, |&s| colors[s]);
            coloring.extend(codes.iter().map(|&code| (code, color)));
        }
        coloring
    }
}

/// Greedy DSATUR coloring: repeatedly color the uncolored node with the most
/// distinctly-colored neighbours (ties: higher degree, then lower index) with
/// the smallest color unused by its neighbours.
pub(crate) fn dsatur(adj: &AdjacencyMatrix) -> Vec<usize> {
    let n = adj.num_units();
    let mut colors: Vec<Option<usize>> = vec![None; n];
    let mut saturation: Vec<AHashSet<usize>> = vec![AHashSet::new(); n];

    for _ in 0..n {
        let Some(node) = (0..n)
            .filter(|&u| colors[u].is_none())
            .max_by_key(|&u| (saturation[u].len(), adj.neighbors(UnitId::from(u)).len(), Reverse(u)))
        else { break };

        let color = (0..).find(|c| !saturation[node].contains(c)).unwrap_or(0);
        colors[node] = Some(color);
        for &next in adj.neighbors(UnitId::from(node)) {
            saturation[next.index()].insert(color);
        }
    }

    colors.into_iter().map(|c| c.unwrap_or(0)).collect()
}
