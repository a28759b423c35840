use log::debug;

use crate::config::TaxiConfig;
use crate::dijkstra::nearest_target;
use crate::graph::{Graph, NodeIdx};
use crate::messages::{Estimate, Flight};
use crate::runways::select_targets;

/// Cells searched on each side of the flight's cell (3x3 window).
const START_REACH_CELLS: i64 = 1;

/// Nearest taxi node to the flight and its distance in meters.
pub fn start_node(graph: &Graph, flight: &Flight, config: &TaxiConfig) -> Option<(NodeIdx, f64)> {
    graph.spatial().nearest(
        graph.nodes(),
        flight.lat,
        flight.lon,
        START_REACH_CELLS,
        config.start_snap_radius_m,
        |n| n.is_taxi_node && (flight.lat - n.lat).abs() <= config.start_max_lat_delta_deg,
    )
}

/// Seconds needed to taxi `meters` at the configured speed and line up.
pub fn taxi_seconds(meters: f64, config: &TaxiConfig) -> f64 {
    meters / config.taxi_speed_mps() + config.runway_entry_delay_s
}

/// Remaining taxi time for `flight`, or `None` when it cannot be placed on
/// the network or no candidate runway is reached within the search bound.
pub fn estimate_flight(
    graph: &Graph,
    flight: &Flight,
    active: &[String],
    config: &TaxiConfig,
) -> Option<Estimate> {
    let Some(targets) = select_targets(flight, graph, active, config) else {
        debug!("{}: no candidate runways at {}", flight.flight_id, graph.airport());
        return None;
    };

    let Some((start, snap_m)) = start_node(graph, flight, config) else {
        debug!(
            "{}: no taxi node within {} m of ({:.5}, {:.5})",
            flight.flight_id, config.start_snap_radius_m, flight.lat, flight.lon
        );
        return None;
    };

    let search = nearest_target(graph, start, &targets, config.max_search_ops);
    let Some((_, designator, path_m)) = search.best else {
        debug!(
            "{}: no runway reached after {} pops{}",
            flight.flight_id,
            search.pops,
            if search.exhausted { " (bound hit)" } else { "" }
        );
        return None;
    };

    let total_m = path_m + snap_m;
    Some(Estimate {
        time_seconds: taxi_seconds(total_m, config).round() as u32,
        distance_meters: total_m.round() as u32,
        runway_designator: designator.to_string(),
    })
}
