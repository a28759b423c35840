//! Grid-bucketed node lookup.
//!
//! Nodes are bucketed by the `CellKey` of their own coordinates. A query
//! scans a square window of cells around the query point, so the search
//! radius in meters must fit inside the window for the answer to be exact.

use hashbrown::HashMap;

use crate::geo::{haversine_meters, CellKey};
use crate::graph::{Node, NodeIdx};

#[derive(Debug, Default)]
pub struct SpatialIndex {
    cells: HashMap<CellKey, Vec<NodeIdx>>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, idx: NodeIdx, lat: f64, lon: f64) {
        self.cells
            .entry(CellKey::from_coords(lat, lon))
            .or_default()
            .push(idx);
    }

    pub fn cell(&self, key: CellKey) -> &[NodeIdx] {
        self.cells.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Nearest node accepted by `accept` within `reach` cells of the query
    /// cell (a `(2 * reach + 1)^2` window) and strictly closer than
    /// `max_meters`. Ties keep the first node seen.
    pub fn nearest<F>(
        &self,
        nodes: &[Node],
        lat: f64,
        lon: f64,
        reach: i64,
        max_meters: f64,
        accept: F,
    ) -> Option<(NodeIdx, f64)>
    where
        F: Fn(&Node) -> bool,
    {
        let center = CellKey::from_coords(lat, lon);
        let mut best: Option<NodeIdx> = None;
        let mut best_d = max_meters;

        for dlat in -reach..=reach {
            for dlon in -reach..=reach {
                for &idx in self.cell(center.offset(dlat, dlon)) {
                    let node = &nodes[idx];
                    if !accept(node) {
                        continue;
                    }
                    let d = haversine_meters(lat, lon, node.lat, node.lon);
                    if d < best_d {
                        best_d = d;
                        best = Some(idx);
                    }
                }
            }
        }
        best.map(|idx| (idx, best_d))
    }
}
