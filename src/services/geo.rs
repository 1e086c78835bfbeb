//! Geographic calculations

use crate::types::Coordinates;

/// Planar distance between two points, in degrees.
///
/// Latitude and longitude are treated as Cartesian units, so east-west
/// separation is overstated away from the equator. The value is only an
/// ordering key for sequencing and proximity search; switching to a
/// geodesic metric changes route orderings.
pub fn planar_distance(from: &Coordinates, to: &Coordinates) -> f64 {
    let d_lat = from.lat - to.lat;
    let d_lng = from.lng - to.lng;

    (d_lat * d_lat + d_lng * d_lng).sqrt()
}
