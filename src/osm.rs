use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use fnv::FnvHashMap;
use log::{debug, info};
use osmpbfreader::{NodeId, OsmObj, OsmPbfReader, Tags};

use crate::geo::haversine_meters;
use crate::graph::{RunwayEndpoint, TaxiwaySegment};
use crate::Error;

/// Keep only ways passing near a reference point (usually the aerodrome).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Around {
    pub lat: f64,
    pub lon: f64,
    pub taxiway_radius_m: f64,
    pub runway_radius_m: f64,
}

impl Around {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            taxiway_radius_m: 5_000.0,
            runway_radius_m: 14_000.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AirportGeometry {
    pub taxiway_segments: Vec<TaxiwaySegment>,
    pub runway_endpoints: Vec<RunwayEndpoint>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Aeroway {
    Taxiway,
    Runway,
}

fn aeroway(tags: &Tags) -> Option<Aeroway> {
    // Areas outline pavement, not centerlines.
    if tags.get("area").map(|v| v.as_str() == "yes").unwrap_or(false) {
        return None;
    }
    match tags.get("aeroway").map(|v| v.as_str()) {
        Some("taxiway") | Some("taxiway_link") => Some(Aeroway::Taxiway),
        Some("runway") => Some(Aeroway::Runway),
        _ => None,
    }
}

/// Splits a runway `ref` such as "07L/25R" into its two designators, in
/// way order. Single-digit headings are zero-padded ("7/25" -> "07", "25").
pub fn runway_designators(reference: &str) -> Option<(String, String)> {
    let (first, second) = reference.split_once('/')?;
    let (first, second) = (normalize_designator(first)?, normalize_designator(second)?);
    Some((first, second))
}

fn normalize_designator(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let digits = raw.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 1 {
        Some(format!("0{}", raw))
    } else {
        Some(raw.to_string())
    }
}

#[derive(Clone, Debug)]
struct WayLite {
    kind: Aeroway,
    nodes: Vec<NodeId>,
    reference: Option<String>,
}

/// Reads taxiway and runway geometry from `path`, optionally restricted to
/// ways passing within `around`.
pub fn read_airport_geometry(
    path: impl AsRef<Path>,
    around: Option<Around>,
) -> Result<AirportGeometry, Error> {
    let path = path.as_ref();

    // Pass 1: collect aeroways and the node ids they reference
    let mut pbf = OsmPbfReader::new(File::open(path)?);
    let mut needed_nodes: HashSet<NodeId> = HashSet::new();
    let mut ways: Vec<WayLite> = Vec::new();
    for obj in pbf.iter() {
        if let OsmObj::Way(w) = obj? {
            let Some(kind) = aeroway(&w.tags) else {
                continue;
            };
            if w.nodes.len() < 2 {
                continue;
            }
            needed_nodes.extend(w.nodes.iter().copied());
            ways.push(WayLite {
                kind,
                nodes: w.nodes.clone(),
                reference: w.tags.get("ref").map(|v| v.to_string()),
            });
        }
    }
    debug!(
        "{}: {} aeroways, {} node refs",
        path.display(),
        ways.len(),
        needed_nodes.len()
    );

    // Pass 2: coordinates of the referenced nodes
    let mut pbf = OsmPbfReader::new(File::open(path)?);
    let mut coords: FnvHashMap<NodeId, (f64, f64)> = FnvHashMap::default();
    for obj in pbf.iter() {
        if let OsmObj::Node(n) = obj? {
            if needed_nodes.contains(&n.id) {
                coords.insert(n.id, (n.lat(), n.lon()));
            }
        }
    }

    let geometry = assemble(&ways, &coords, around);
    info!(
        "{}: {} taxiway segments, {} runway endpoints",
        path.display(),
        geometry.taxiway_segments.len(),
        geometry.runway_endpoints.len()
    );
    Ok(geometry)
}

fn assemble(
    ways: &[WayLite],
    coords: &FnvHashMap<NodeId, (f64, f64)>,
    around: Option<Around>,
) -> AirportGeometry {
    let mut geometry = AirportGeometry::default();
    for w in ways {
        let points: Vec<(f64, f64)> = w.nodes.iter().filter_map(|n| coords.get(n).copied()).collect();
        if points.len() < 2 {
            continue;
        }
        if let Some(a) = around {
            let radius = match w.kind {
                Aeroway::Taxiway => a.taxiway_radius_m,
                Aeroway::Runway => a.runway_radius_m,
            };
            let near = points
                .iter()
                .any(|&(lat, lon)| haversine_meters(a.lat, a.lon, lat, lon) <= radius);
            if !near {
                continue;
            }
        }

        match w.kind {
            Aeroway::Taxiway => {
                for pair in w.nodes.windows(2) {
                    let (Some(&(lat1, lon1)), Some(&(lat2, lon2))) =
                        (coords.get(&pair[0]), coords.get(&pair[1]))
                    else {
                        continue;
                    };
                    geometry.taxiway_segments.push(TaxiwaySegment {
                        lat1,
                        lon1,
                        lat2,
                        lon2,
                    });
                }
            }
            Aeroway::Runway => {
                let Some((first, second)) = w.reference.as_deref().and_then(runway_designators)
                else {
                    debug!("runway way without usable ref {:?}, skipped", w.reference);
                    continue;
                };
                let (lat, lon) = points[0];
                geometry.runway_endpoints.push(RunwayEndpoint {
                    lat,
                    lon,
                    designator: first,
                });
                let (lat, lon) = points[points.len() - 1];
                geometry.runway_endpoints.push(RunwayEndpoint {
                    lat,
                    lon,
                    designator: second,
                });
            }
        }
    }
    geometry
}
