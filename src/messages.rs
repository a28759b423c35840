use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::graph::{RunwayEndpoint, TaxiwaySegment};

/// Live position of a departing flight, supplied fresh with every batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flight {
    pub flight_id: String,
    pub departure_airport_code: String,
    pub lat: f64,
    pub lon: f64,
    pub heading_degrees: f64,
    pub ground_speed_knots: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    pub time_seconds: u32,
    pub distance_meters: u32,
    pub runway_designator: String,
}

/// Estimates keyed by flight id. A repeated id keeps the last estimate.
pub type Estimates = BTreeMap<String, Estimate>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeGraph {
    pub airport_code: String,
    #[serde(default)]
    pub taxiway_segments: Vec<TaxiwaySegment>,
    #[serde(default)]
    pub runway_endpoints: Vec<RunwayEndpoint>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculateBatch {
    pub flights: Vec<Flight>,
    #[serde(default)]
    pub active_runways_by_airport: BTreeMap<String, Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    #[serde(alias = "INIT_GRAPH")]
    InitializeGraph(InitializeGraph),
    #[serde(alias = "CALC")]
    CalculateBatch(CalculateBatch),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Response {
    #[serde(rename_all = "camelCase")]
    Ready {
        airport_code: String,
        node_count: usize,
    },
    Result(Estimates),
    Error {
        message: String,
    },
}
