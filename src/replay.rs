use std::io::{Read, Write};

use csv::{ReaderBuilder, Writer};
use serde::Deserialize;

use crate::graph::{RunwayEndpoint, TaxiwaySegment};
use crate::messages::{Estimates, Flight};
use crate::Error;

#[derive(Debug, Deserialize)]
struct SegmentRow {
    lat1: f64,
    lon1: f64,
    lat2: f64,
    lon2: f64,
}

#[derive(Debug, Deserialize)]
struct FlightRow {
    flight_id: String,
    departure: String,
    lat: f64,
    lon: f64,
    heading: f64,
    ground_speed: f64,
}

fn reader<R: Read>(rdr: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(rdr)
}

/// Rows of `lat1,lon1,lat2,lon2`.
pub fn read_taxiways<R: Read>(rdr: R) -> Result<Vec<TaxiwaySegment>, Error> {
    let mut segments = Vec::new();
    for row in reader(rdr).deserialize() {
        let SegmentRow {
            lat1,
            lon1,
            lat2,
            lon2,
        } = row?;
        segments.push(TaxiwaySegment {
            lat1,
            lon1,
            lat2,
            lon2,
        });
    }
    Ok(segments)
}

/// Rows of `lat,lon,designator`.
pub fn read_runways<R: Read>(rdr: R) -> Result<Vec<RunwayEndpoint>, Error> {
    let mut endpoints = Vec::new();
    for row in reader(rdr).deserialize() {
        endpoints.push(row?);
    }
    Ok(endpoints)
}

/// Rows of `flight_id,departure,lat,lon,heading,ground_speed`.
pub fn read_flights<R: Read>(rdr: R) -> Result<Vec<Flight>, Error> {
    let mut flights = Vec::new();
    for row in reader(rdr).deserialize() {
        let row: FlightRow = row?;
        flights.push(Flight {
            flight_id: row.flight_id,
            departure_airport_code: row.departure,
            lat: row.lat,
            lon: row.lon,
            heading_degrees: row.heading,
            ground_speed_knots: row.ground_speed,
        });
    }
    Ok(flights)
}

/// Writes `flight_id,time_s,distance_m,runway` rows in flight id order.
pub fn write_estimates<W: Write>(wtr: W, estimates: &Estimates) -> Result<(), Error> {
    let mut wtr = Writer::from_writer(wtr);
    wtr.write_record(["flight_id", "time_s", "distance_m", "runway"])?;
    for (id, est) in estimates {
        let time = est.time_seconds.to_string();
        let dist = est.distance_meters.to_string();
        wtr.write_record([
            id.as_str(),
            time.as_str(),
            dist.as_str(),
            est.runway_designator.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
