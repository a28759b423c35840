use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Knots to meters per second.
pub const KNOT_MPS: f64 = 0.514444;

/// Tunables for graph construction and taxi-time estimation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxiConfig {
    /// Taxiway segments shorter than this are treated as noise.
    pub min_segment_length_m: f64,
    /// Runway endpoints further than this from any taxi node are not bridged.
    pub bridge_radius_m: f64,
    /// Flights further than this from any taxi node get no estimate.
    pub start_snap_radius_m: f64,
    /// Cheap latitude pre-filter applied before the start-node distance check.
    pub start_max_lat_delta_deg: f64,
    /// The heading filter only applies above this groundspeed.
    pub heading_filter_min_speed_kn: f64,
    /// Runways whose heading deviates more than this from the aircraft are dropped.
    pub heading_filter_max_deviation_deg: f64,
    pub taxi_speed_kn: f64,
    pub runway_entry_delay_s: f64,
    /// Heap pops after which a search gives up with its best answer so far.
    pub max_search_ops: usize,
}

impl Default for TaxiConfig {
    fn default() -> Self {
        Self {
            min_segment_length_m: 0.1,
            bridge_radius_m: 1000.0,
            start_snap_radius_m: 800.0,
            start_max_lat_delta_deg: 0.01,
            heading_filter_min_speed_kn: 5.0,
            heading_filter_max_deviation_deg: 100.0,
            taxi_speed_kn: 16.0,
            runway_entry_delay_s: 60.0,
            max_search_ops: 8000,
        }
    }
}

impl TaxiConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn taxi_speed_mps(&self) -> f64 {
        self.taxi_speed_kn * KNOT_MPS
    }
}
