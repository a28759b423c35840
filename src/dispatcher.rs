use std::io::{BufRead, Write};

use hashbrown::HashMap;
use log::{debug, info, warn};

use crate::config::TaxiConfig;
use crate::estimate::estimate_flight;
use crate::graph::Graph;
use crate::messages::{CalculateBatch, Estimates, InitializeGraph, Request, Response};
use crate::Error;

/// Published airport graphs keyed by airport code.
#[derive(Debug, Default)]
pub struct GraphCache {
    graphs: HashMap<String, Graph>,
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `graph`, returning the graph it replaced, if any.
    pub fn publish(&mut self, graph: Graph) -> Option<Graph> {
        self.graphs.insert(graph.airport().to_string(), graph)
    }

    pub fn get(&self, airport: &str) -> Option<&Graph> {
        self.graphs.get(airport)
    }

    pub(crate) fn len(&self) -> usize {
        self.graphs.len()
    }
}

/// Owns the graph cache and takes requests one at a time.
/// `InitializeGraph` is the only writer, `CalculateBatch` only reads.
#[derive(Debug, Default)]
pub struct Dispatcher {
    config: TaxiConfig,
    cache: GraphCache,
}

impl Dispatcher {
    pub fn new(config: TaxiConfig) -> Self {
        Self {
            config,
            cache: GraphCache::new(),
        }
    }

    pub fn config(&self) -> &TaxiConfig {
        &self.config
    }

    pub fn cache(&self) -> &GraphCache {
        &self.cache
    }

    pub fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::InitializeGraph(init) => {
                let (airport_code, node_count) = self.initialize_graph(init);
                Response::Ready {
                    airport_code,
                    node_count,
                }
            }
            Request::CalculateBatch(batch) => Response::Result(self.calculate_batch(&batch)),
        }
    }

    /// Answers JSON requests read one per line from `input`, writing one
    /// response line per request to `out`. Blank lines are skipped and a
    /// line that does not parse gets an `ERROR` response; the loop only
    /// stops at end of input or on an I/O failure.
    pub fn serve<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> Result<(), Error> {
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let response = match serde_json::from_str::<Request>(&line) {
                Ok(request) => self.handle(request),
                Err(e) => {
                    warn!("rejected request: {}", e);
                    Response::Error {
                        message: e.to_string(),
                    }
                }
            };
            serde_json::to_writer(&mut out, &response)?;
            out.write_all(b"\n")?;
            out.flush()?;
        }
        Ok(())
    }

    /// Builds and publishes the graph for one airport, replacing any
    /// previous one. Returns the airport code and node count.
    pub fn initialize_graph(&mut self, init: InitializeGraph) -> (String, usize) {
        let graph = Graph::build(
            init.airport_code,
            &init.taxiway_segments,
            &init.runway_endpoints,
            &self.config,
        );
        let airport = graph.airport().to_string();
        let node_count = graph.node_count();
        if self.cache.publish(graph).is_some() {
            debug!("{}: replaced cached graph", airport);
        }
        info!("{}: graph ready, {} airports cached", airport, self.cache.len());
        (airport, node_count)
    }

    /// Estimates every flight in input order. Flights without a cached
    /// graph, start node or reachable runway are left out of the result.
    pub fn calculate_batch(&self, batch: &CalculateBatch) -> Estimates {
        let mut estimates = Estimates::new();
        for flight in &batch.flights {
            let Some(graph) = self.cache.get(&flight.departure_airport_code) else {
                debug!(
                    "{}: no graph for {}",
                    flight.flight_id, flight.departure_airport_code
                );
                continue;
            };
            let active = batch
                .active_runways_by_airport
                .get(&flight.departure_airport_code)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            if let Some(estimate) = estimate_flight(graph, flight, active, &self.config) {
                estimates.insert(flight.flight_id.clone(), estimate);
            }
        }
        info!(
            "batch: {} flights, {} estimates",
            batch.flights.len(),
            estimates.len()
        );
        estimates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::{north, rwy, seg, LAT0, LON0};
    use crate::messages::tests::flight;
    use crate::messages::Estimate;

    fn init(airport: &str, runway_m: f64) -> Request {
        Request::InitializeGraph(InitializeGraph {
            airport_code: airport.to_string(),
            taxiway_segments: vec![seg(LAT0, LON0, north(500.0), LON0)],
            runway_endpoints: vec![rwy(north(runway_m), LON0, "09")],
        })
    }

    fn calc(flights: Vec<crate::messages::Flight>) -> Request {
        Request::CalculateBatch(CalculateBatch {
            flights,
            ..CalculateBatch::default()
        })
    }

    fn estimates(response: Response) -> Estimates {
        match response {
            Response::Result(estimates) => estimates,
            other => panic!("unexpected response {:?}", other),
        }
    }

    #[test]
    fn initialize_reports_node_count() {
        let mut d = Dispatcher::default();
        let response = d.handle(init("EDDF", 500.0));
        assert_eq!(
            response,
            Response::Ready {
                airport_code: "EDDF".to_string(),
                node_count: 2,
            }
        );
        assert_eq!(d.cache().len(), 1);
    }

    #[test]
    fn reinitialize_replaces_graph() {
        let mut d = Dispatcher::default();
        d.handle(init("EDDF", 500.0));
        let response = d.handle(init("EDDF", 600.0));
        assert_eq!(
            response,
            Response::Ready {
                airport_code: "EDDF".to_string(),
                node_count: 3,
            }
        );
        assert_eq!(d.cache().len(), 1);
        assert!(d.cache().get("EDDF").unwrap().runway_nodes("09").is_some());
    }

    #[test]
    fn batch_scenario() {
        let mut d = Dispatcher::default();
        d.handle(init("EDDF", 500.0));
        let result = estimates(d.handle(calc(vec![
            flight("A1", "EDDF", LAT0, LON0, 90.0, 10.0),
            flight("A2", "EDDF", LAT0, LON0, 270.0, 10.0),
        ])));
        let expected = Estimate {
            time_seconds: 121,
            distance_meters: 500,
            runway_designator: "09".to_string(),
        };
        assert_eq!(result.len(), 2);
        assert_eq!(result["A1"], expected);
        assert_eq!(result["A2"], expected);
    }

    #[test]
    fn unknown_airport_is_skipped() {
        let mut d = Dispatcher::default();
        d.handle(init("EDDF", 500.0));
        let result = estimates(d.handle(calc(vec![
            flight("A1", "EDDM", LAT0, LON0, 90.0, 10.0),
            flight("A2", "EDDF", LAT0, LON0, 90.0, 10.0),
        ])));
        assert!(!result.contains_key("A1"));
        assert!(result.contains_key("A2"));
    }

    #[test]
    fn unbridged_runway_is_absent_from_result() {
        let mut d = Dispatcher::default();
        // Runway end 1500 m beyond the last taxi node.
        d.handle(init("EDDF", 2000.0));
        let result = estimates(d.handle(calc(vec![flight(
            "A1", "EDDF", LAT0, LON0, 90.0, 10.0,
        )])));
        assert!(result.is_empty());
    }

    #[test]
    fn active_runways_are_per_airport() {
        let mut d = Dispatcher::default();
        d.handle(init("EDDF", 500.0));
        let mut batch = CalculateBatch {
            flights: vec![flight("A1", "EDDF", LAT0, LON0, 90.0, 10.0)],
            ..CalculateBatch::default()
        };
        batch
            .active_runways_by_airport
            .insert("EDDF".to_string(), vec!["27".to_string()]);
        assert!(d.calculate_batch(&batch).is_empty());

        batch.active_runways_by_airport.clear();
        batch
            .active_runways_by_airport
            .insert("EDDM".to_string(), vec!["27".to_string()]);
        assert_eq!(d.calculate_batch(&batch).len(), 1);
    }

    // Duplicate flight ids are not rejected: the later flight's estimate
    // overwrites the earlier one.
    #[test]
    fn duplicate_flight_id_keeps_last_estimate() {
        let mut d = Dispatcher::default();
        d.handle(init("EDDF", 500.0));
        let result = estimates(d.handle(calc(vec![
            flight("A1", "EDDF", LAT0, LON0, 90.0, 10.0),
            // 40 m further out on the same taxiway.
            flight("A1", "EDDF", north(-40.0), LON0, 90.0, 10.0),
        ])));
        assert_eq!(result.len(), 1);
        assert_eq!(result["A1"].distance_meters, 540);
    }

    #[test]
    fn serve_answers_each_line_and_survives_bad_input() {
        let mut d = Dispatcher::default();
        let input = [
            r#"{"action":"INITIALIZE_GRAPH","payload":{"airportCode":"EDDF","taxiwaySegments":[],"runwayEndpoints":[]}}"#,
            "this is not json",
            "   ",
            r#"{"action":"CALCULATE_BATCH","payload":{"flights":[]}}"#,
        ]
        .join("\n");
        let mut out = Vec::new();
        d.serve(input.as_bytes(), &mut out).unwrap();

        let lines: Vec<Response> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            Response::Ready {
                airport_code: "EDDF".to_string(),
                node_count: 0,
            }
        );
        assert!(matches!(lines[1], Response::Error { .. }));
        assert_eq!(lines[2], Response::Result(Estimates::new()));
        assert_eq!(d.cache().len(), 1);
    }

    #[test]
    fn serve_error_line_has_error_type() {
        let mut d = Dispatcher::default();
        let mut out = Vec::new();
        d.serve(&b"{\"action\":\"DROP_GRAPH\"}\n"[..], &mut out).unwrap();
        let line = String::from_utf8(out).unwrap();
        assert!(line.starts_with(r#"{"type":"ERROR","data":{"message":"#));
        assert!(line.ends_with('\n'));
    }
}
