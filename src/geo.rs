/// Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Quantization factor for node identity (5 decimal degrees, ~1.1 m).
const NODE_KEY_SCALE: f64 = 100_000.0;

/// Edge length of a spatial grid cell in degrees (~555 m of latitude).
pub const GRID_CELL_DEG: f64 = 0.005;

/// Great-circle distance using the haversine formula.
/// Input lat/lon in degrees. Output in meters.
pub fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (
        lat1.to_radians(),
        lon1.to_radians(),
        lat2.to_radians(),
        lon2.to_radians(),
    );
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_M * c
}

/// Identity of a node: its coordinates quantized to 1e-5 degrees.
/// Two points are the same node iff their keys are equal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeKey(pub i64, pub i64);

impl NodeKey {
    pub fn from_coords(lat: f64, lon: f64) -> Self {
        NodeKey(quantize(lat), quantize(lon))
    }
}

fn quantize(deg: f64) -> i64 {
    (deg * NODE_KEY_SCALE).round() as i64
}

/// Address of a spatial grid cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CellKey(pub i64, pub i64);

impl CellKey {
    pub fn from_coords(lat: f64, lon: f64) -> Self {
        CellKey(
            (lat / GRID_CELL_DEG).floor() as i64,
            (lon / GRID_CELL_DEG).floor() as i64,
        )
    }

    pub fn offset(self, dlat: i64, dlon: i64) -> Self {
        CellKey(self.0 + dlat, self.1 + dlon)
    }
}

/// Signed difference `a - b` in degrees, normalized to (-180, 180].
pub fn angle_diff(a: f64, b: f64) -> f64 {
    let mut d = (a - b) % 360.0;
    if d <= -180.0 {
        d += 360.0;
    } else if d > 180.0 {
        d -= 360.0;
    }
    d
}

/// Runway heading in degrees from a designator such as "25C" (250).
/// Returns `None` when the designator does not start with two digits.
pub fn runway_heading(designator: &str) -> Option<f64> {
    let prefix = designator.get(..2)?;
    if !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    prefix.parse::<u32>().ok().map(|tens| f64::from(tens * 10))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_one_degree_of_latitude() {
        let d = haversine_meters(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_194.93).abs() < 0.01, "got {}", d);
        assert_eq!(haversine_meters(50.0, 8.0, 50.0, 8.0), 0.0);
    }

    #[test]
    fn haversine_is_symmetric() {
        let ab = haversine_meters(52.36, 13.50, 52.38, 13.52);
        let ba = haversine_meters(52.38, 13.52, 52.36, 13.50);
        assert_eq!(ab, ba);
    }

    #[test]
    fn node_keys_merge_nearby_points() {
        let a = NodeKey::from_coords(50.033_331, 8.570_001);
        let b = NodeKey::from_coords(50.033_329, 8.569_998);
        assert_eq!(a, b);
        assert_eq!(a, NodeKey(5_003_333, 857_000));
        assert_ne!(a, NodeKey::from_coords(50.033_36, 8.570_001));
    }

    #[test]
    fn cell_keys_floor_towards_negative_infinity() {
        assert_eq!(CellKey::from_coords(50.0026, 8.5701), CellKey(10000, 1714));
        assert_eq!(CellKey::from_coords(-0.001, -0.001), CellKey(-1, -1));
        assert_eq!(CellKey(3, 4).offset(-1, 2), CellKey(2, 6));
    }

    #[test]
    fn angle_diff_range() {
        assert_eq!(angle_diff(10.0, 350.0), 20.0);
        assert_eq!(angle_diff(350.0, 10.0), -20.0);
        assert_eq!(angle_diff(270.0, 90.0), 180.0);
        assert_eq!(angle_diff(90.0, 270.0), 180.0);
        assert_eq!(angle_diff(0.0, 0.0), 0.0);
        assert_eq!(angle_diff(720.0, 0.0), 0.0);
    }

    #[test]
    fn runway_heading_from_designator() {
        assert_eq!(runway_heading("25C"), Some(250.0));
        assert_eq!(runway_heading("09"), Some(90.0));
        assert_eq!(runway_heading("36R"), Some(360.0));
        assert_eq!(runway_heading("9"), None);
        assert_eq!(runway_heading("H1"), None);
        assert_eq!(runway_heading(""), None);
    }
}
