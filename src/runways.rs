use fnv::FnvHashMap;
use log::trace;

use crate::config::TaxiConfig;
use crate::geo::{angle_diff, runway_heading};
use crate::graph::{Graph, NodeIdx};
use crate::messages::Flight;

/// Runway nodes a search may end at.
#[derive(Debug, Default)]
pub struct Targets<'a> {
    /// (node, designator) in candidate order.
    pub list: Vec<(NodeIdx, &'a str)>,
    by_node: FnvHashMap<NodeIdx, &'a str>,
}

impl<'a> Targets<'a> {
    fn push(&mut self, node: NodeIdx, designator: &'a str) {
        self.list.push((node, designator));
        // A node shared by two designators resolves to the first one listed.
        self.by_node.entry(node).or_insert(designator);
    }

    fn extend_from(&mut self, graph: &Graph, designators: &[&'a str]) {
        for &des in designators {
            if let Some(nodes) = graph.runway_nodes(des) {
                for &node in nodes {
                    self.push(node, des);
                }
            }
        }
    }

    pub fn designator(&self, node: NodeIdx) -> Option<&'a str> {
        self.by_node.get(&node).copied()
    }

    pub fn contains(&self, node: NodeIdx) -> bool {
        self.by_node.contains_key(&node)
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

impl<'a> FromIterator<(NodeIdx, &'a str)> for Targets<'a> {
    fn from_iter<I: IntoIterator<Item = (NodeIdx, &'a str)>>(iter: I) -> Self {
        let mut targets = Targets::default();
        for (node, des) in iter {
            targets.push(node, des);
        }
        targets
    }
}

/// Whether a runway with designator `des` is compatible with the flight's
/// direction of travel. Undecodable designators always pass.
pub fn heading_compatible(flight: &Flight, des: &str, config: &TaxiConfig) -> bool {
    match runway_heading(des) {
        Some(rwy_hdg) => {
            angle_diff(flight.heading_degrees, rwy_hdg).abs()
                <= config.heading_filter_max_deviation_deg
        }
        None => true,
    }
}

/// Target runway nodes for `flight`.
///
/// Candidates are `active` when non-empty, otherwise every runway the
/// graph knows. A taxiing flight drops runways behind it; if that leaves
/// no target node, the unfiltered candidates are used instead. Returns
/// `None` only when no candidate has a node in the graph.
pub fn select_targets<'a>(
    flight: &Flight,
    graph: &'a Graph,
    active: &'a [String],
    config: &TaxiConfig,
) -> Option<Targets<'a>> {
    let candidates: Vec<&'a str> = if active.is_empty() {
        graph.designators().iter().map(String::as_str).collect()
    } else {
        active.iter().map(String::as_str).collect()
    };

    let mut targets = Targets::default();
    if flight.ground_speed_knots > config.heading_filter_min_speed_kn {
        let plausible: Vec<&'a str> = candidates
            .iter()
            .copied()
            .filter(|des| heading_compatible(flight, des, config))
            .collect();
        targets.extend_from(graph, &plausible);
        if targets.is_empty() {
            trace!(
                "{}: heading {:.0} excludes every runway, using all candidates",
                flight.flight_id,
                flight.heading_degrees
            );
        }
    }
    if targets.is_empty() {
        targets.extend_from(graph, &candidates);
    }

    if targets.is_empty() {
        None
    } else {
        Some(targets)
    }
}
