//! Remaining taxi time for departing aircraft.
//!
//! Airport taxiway and runway geometry is turned into a routable graph once
//! per airport (`Graph::build`). For each tracked flight the estimator snaps
//! the aircraft onto the taxiway network, narrows the runways to those
//! compatible with its heading, and runs a bounded multi-target Dijkstra to
//! the cheapest one. `Dispatcher` ties this together behind two
//! request/response messages.

pub mod config;
pub mod dijkstra;
pub mod dispatcher;
mod error;
pub mod estimate;
pub mod geo;
pub mod graph;
pub mod heap;
pub mod messages;
pub mod osm;
pub mod replay;
pub mod runways;
pub mod spatial;

pub use config::TaxiConfig;
pub use dispatcher::{Dispatcher, GraphCache};
pub use error::Error;
pub use graph::{Graph, RunwayEndpoint, TaxiwaySegment};
pub use messages::{Estimate, Flight, Request, Response};
