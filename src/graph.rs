//! Routable airport movement-area graph.
//!
//! Nodes live in a dense arena indexed by `NodeIdx`; coordinates are
//! mapped to arena slots through their quantized `NodeKey`. A `Graph` is
//! built once from raw taxiway segments and runway endpoints and is not
//! mutated after `Graph::build` returns.

use fnv::FnvHashMap;
use hashbrown::HashMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::TaxiConfig;
use crate::geo::{haversine_meters, NodeKey};
use crate::spatial::SpatialIndex;

pub type NodeIdx = usize;

/// Cells searched on each side of a runway endpoint when bridging (5x5 window).
const BRIDGE_REACH_CELLS: i64 = 2;

/// A straight taxiway piece, exchanged as `[lat1, lon1, lat2, lon2]`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct TaxiwaySegment {
    pub lat1: f64,
    pub lon1: f64,
    pub lat2: f64,
    pub lon2: f64,
}

impl From<[f64; 4]> for TaxiwaySegment {
    fn from([lat1, lon1, lat2, lon2]: [f64; 4]) -> Self {
        Self {
            lat1,
            lon1,
            lat2,
            lon2,
        }
    }
}

impl From<TaxiwaySegment> for [f64; 4] {
    fn from(s: TaxiwaySegment) -> Self {
        [s.lat1, s.lon1, s.lat2, s.lon2]
    }
}

/// One physical end of a runway, tagged with the designator used there.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunwayEndpoint {
    pub lat: f64,
    pub lon: f64,
    pub designator: String,
}

#[derive(Clone, Debug)]
pub struct Node {
    pub lat: f64,
    pub lon: f64,
    /// False for nodes first created from a runway endpoint.
    pub is_taxi_node: bool,
    /// (neighbor, meters); an undirected link is stored once per direction.
    pub edges: Vec<(NodeIdx, f64)>,
}

#[derive(Debug)]
pub struct Graph {
    airport: String,
    nodes: Vec<Node>,
    keys: FnvHashMap<NodeKey, NodeIdx>,
    runway_nodes: HashMap<String, Vec<NodeIdx>>,
    // Designators in first-seen order, so "all runways" is deterministic.
    designators: Vec<String>,
    spatial: SpatialIndex,
}

impl Graph {
    /// Builds the graph for `airport`. Never fails: degenerate segments
    /// are dropped and runway endpoints with no taxi node within the
    /// bridge radius stay unconnected.
    pub fn build(
        airport: impl Into<String>,
        segments: &[TaxiwaySegment],
        runways: &[RunwayEndpoint],
        config: &TaxiConfig,
    ) -> Self {
        let mut g = Graph {
            airport: airport.into(),
            nodes: Vec::new(),
            keys: FnvHashMap::default(),
            runway_nodes: HashMap::new(),
            designators: Vec::new(),
            spatial: SpatialIndex::new(),
        };

        let mut discarded = 0usize;
        for s in segments {
            let d = haversine_meters(s.lat1, s.lon1, s.lat2, s.lon2);
            // NaN coordinates also fail this test.
            if !(d >= config.min_segment_length_m) {
                discarded += 1;
                continue;
            }
            let a = g.add_node(s.lat1, s.lon1, true);
            let b = g.add_node(s.lat2, s.lon2, true);
            g.link(a, b, d);
        }

        let (mut bridged, mut unbridged) = (0usize, 0usize);
        for ep in runways {
            if g.add_runway_endpoint(ep, config.bridge_radius_m) {
                bridged += 1;
            } else {
                unbridged += 1;
            }
        }

        if discarded > 0 {
            debug!("{}: discarded {} degenerate taxiway segments", g.airport, discarded);
        }
        info!(
            "{}: graph with {} nodes, {} directed edges, {} runways ({} endpoints bridged, {} unbridged)",
            g.airport,
            g.nodes.len(),
            g.edge_count(),
            g.designators.len(),
            bridged,
            unbridged
        );
        g
    }

    fn add_node(&mut self, lat: f64, lon: f64, is_taxi_node: bool) -> NodeIdx {
        let key = NodeKey::from_coords(lat, lon);
        if let Some(&idx) = self.keys.get(&key) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(Node {
            lat,
            lon,
            is_taxi_node,
            edges: Vec::new(),
        });
        self.keys.insert(key, idx);
        self.spatial.insert(idx, lat, lon);
        idx
    }

    fn link(&mut self, a: NodeIdx, b: NodeIdx, meters: f64) {
        self.nodes[a].edges.push((b, meters));
        self.nodes[b].edges.push((a, meters));
    }

    /// Registers the endpoint under its designator and bridges it to the
    /// nearest taxi node. Returns whether it ended up on the network.
    fn add_runway_endpoint(&mut self, ep: &RunwayEndpoint, bridge_radius_m: f64) -> bool {
        let rwy = self.add_node(ep.lat, ep.lon, false);

        match self.runway_nodes.get_mut(&ep.designator) {
            Some(ids) => {
                if !ids.contains(&rwy) {
                    ids.push(rwy);
                }
            }
            None => {
                self.runway_nodes.insert(ep.designator.clone(), vec![rwy]);
                self.designators.push(ep.designator.clone());
            }
        }

        let nearest = self.spatial.nearest(
            &self.nodes,
            ep.lat,
            ep.lon,
            BRIDGE_REACH_CELLS,
            bridge_radius_m,
            |n| n.is_taxi_node,
        );
        match nearest {
            // The endpoint merged into a taxi node and is already routable.
            Some((taxi, _)) if taxi == rwy => true,
            Some((taxi, d)) => {
                self.link(rwy, taxi, d);
                true
            }
            None => {
                debug!(
                    "{}: runway {} end at ({:.5}, {:.5}) has no taxi node within {} m",
                    self.airport, ep.designator, ep.lat, ep.lon, bridge_radius_m
                );
                false
            }
        }
    }

    pub fn airport(&self) -> &str {
        &self.airport
    }

    pub fn node(&self, idx: NodeIdx) -> &Node {
        &self.nodes[idx]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.edges.len()).sum()
    }

    /// Arena slot of the node at these coordinates, if one exists.
    pub fn node_at(&self, lat: f64, lon: f64) -> Option<NodeIdx> {
        self.keys.get(&NodeKey::from_coords(lat, lon)).copied()
    }

    pub fn runway_nodes(&self, designator: &str) -> Option<&[NodeIdx]> {
        self.runway_nodes.get(designator).map(Vec::as_slice)
    }

    /// Every known runway designator, in first-seen order.
    pub fn designators(&self) -> &[String] {
        &self.designators
    }

    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Meters per degree of latitude on the haversine sphere.
    pub(crate) const M_PER_DEG_LAT: f64 = 111_194.926_644_558_7;

    pub(crate) const LAT0: f64 = 50.0;
    pub(crate) const LON0: f64 = 8.0;

    /// Latitude `meters` north of `LAT0`.
    pub(crate) fn north(meters: f64) -> f64 {
        LAT0 + meters / M_PER_DEG_LAT
    }

    pub(crate) fn seg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> TaxiwaySegment {
        TaxiwaySegment {
            lat1,
            lon1,
            lat2,
            lon2,
        }
    }

    pub(crate) fn rwy(lat: f64, lon: f64, designator: &str) -> RunwayEndpoint {
        RunwayEndpoint {
            lat,
            lon,
            designator: designator.to_string(),
        }
    }

    #[test]
    fn taxiway_edges_are_symmetric() {
        let segments = vec![
            seg(LAT0, LON0, north(300.0), LON0),
            seg(north(300.0), LON0, north(300.0), 8.004),
            seg(north(300.0), 8.004, LAT0, LON0),
        ];
        let g = Graph::build("EDDF", &segments, &[], &TaxiConfig::default());
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 6);
        for (a, node) in g.nodes().iter().enumerate() {
            assert!(node.is_taxi_node);
            for &(b, w) in &node.edges {
                assert!(g.node(b).edges.iter().any(|&(back, wb)| back == a && wb == w));
            }
        }
    }

    #[test]
    fn shared_endpoints_are_merged() {
        let segments = vec![
            seg(LAT0, LON0, north(100.0), LON0),
            // Same junction, perturbed below the quantization step.
            seg(north(100.0) + 1e-7, LON0 - 1e-7, north(200.0), LON0),
        ];
        let g = Graph::build("EDDF", &segments, &[], &TaxiConfig::default());
        assert_eq!(g.node_count(), 3);
        let junction = g.node_at(north(100.0), LON0).unwrap();
        assert_eq!(g.node(junction).edges.len(), 2);
    }

    #[test]
    fn degenerate_segments_are_dropped() {
        let segments = vec![
            seg(LAT0, LON0, LAT0, LON0),
            seg(LAT0, LON0, north(0.05), LON0),
            seg(f64::NAN, LON0, LAT0, LON0),
        ];
        let g = Graph::build("EDDF", &segments, &[], &TaxiConfig::default());
        assert_eq!(g.node_count(), 0);
    }

    #[test]
    fn runway_ends_are_grouped_by_designator() {
        let segments = vec![seg(LAT0, LON0, north(1000.0), LON0)];
        let runways = vec![
            rwy(LAT0, 8.001, "18"),
            rwy(north(1000.0), 8.001, "36"),
            rwy(north(500.0), 8.001, "18"),
            rwy(LAT0, 8.001, "18"),
        ];
        let g = Graph::build("EDDF", &segments, &runways, &TaxiConfig::default());
        assert_eq!(g.designators(), &["18".to_string(), "36".to_string()]);
        assert_eq!(g.runway_nodes("18").unwrap().len(), 2);
        assert_eq!(g.runway_nodes("36").unwrap().len(), 1);
        assert!(g.runway_nodes("27").is_none());
        for &idx in g.runway_nodes("18").unwrap() {
            assert!(!g.node(idx).is_taxi_node);
        }
    }

    #[test]
    fn runway_end_is_bridged_to_nearest_taxi_node() {
        let segments = vec![seg(LAT0, LON0, north(400.0), LON0)];
        let runways = vec![rwy(north(450.0), LON0, "36")];
        let g = Graph::build("EDDF", &segments, &runways, &TaxiConfig::default());

        let rwy_idx = g.runway_nodes("36").unwrap()[0];
        let taxi_idx = g.node_at(north(400.0), LON0).unwrap();
        let edges = &g.node(rwy_idx).edges;
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].0, taxi_idx);
        assert!((edges[0].1 - 50.0).abs() < 0.01);
        assert!(g.node(taxi_idx).edges.iter().any(|&(n, _)| n == rwy_idx));
    }

    #[test]
    fn distant_runway_end_stays_unconnected() {
        let segments = vec![seg(LAT0, LON0, north(100.0), LON0)];
        let runways = vec![rwy(north(1600.0), LON0, "36")];
        let g = Graph::build("EDDF", &segments, &runways, &TaxiConfig::default());

        let rwy_idx = g.runway_nodes("36").unwrap()[0];
        assert!(g.node(rwy_idx).edges.is_empty());
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn runway_end_on_taxi_node_needs_no_bridge() {
        let segments = vec![seg(LAT0, LON0, north(500.0), LON0)];
        let runways = vec![rwy(north(500.0), LON0, "09")];
        let g = Graph::build("EDDF", &segments, &runways, &TaxiConfig::default());

        let b = g.node_at(north(500.0), LON0).unwrap();
        assert_eq!(g.runway_nodes("09").unwrap(), &[b]);
        assert!(g.node(b).is_taxi_node);
        assert_eq!(g.node(b).edges.len(), 1);
    }

    #[test]
    fn segment_serializes_as_quadruple() {
        let s: TaxiwaySegment = serde_json::from_str("[50.0, 8.0, 50.1, 8.1]").unwrap();
        assert_eq!(s, seg(50.0, 8.0, 50.1, 8.1));
        assert_eq!(serde_json::to_string(&s).unwrap(), "[50.0,8.0,50.1,8.1]");
    }
}
