//! Geodesic primitives on the WGS84 ellipsoid
//!
//! Thin wrappers over the `geo` geodesic metric space, expressed in the
//! `(latitude, longitude)` degree order used throughout the track model.

use geo::{Bearing, Destination, Distance, Geodesic, Point};

/// WGS84 semi-major axis in meters
pub const WGS84_SEMI_MAJOR_AXIS: f64 = 6_378_137.0;

/// WGS84 flattening
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

/// Solution of the inverse geodesic problem between two positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inverse {
    /// Geodesic distance in meters
    pub distance: f64,
    /// Departure azimuth at the first position, degrees in [0, 360)
    pub azimuth: f64,
}

/// Solve the inverse problem: distance and departure azimuth from `(lat1, lon1)` to `(lat2, lon2)`
#[inline]
pub fn inverse(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Inverse {
    let origin = Point::new(lon1, lat1);
    let destination = Point::new(lon2, lat2);

    Inverse {
        distance: Geodesic.distance(origin, destination),
        azimuth: normalize_azimuth(Geodesic.bearing(origin, destination)),
    }
}

/// Solve the direct problem: the position reached from `(lat, lon)` after
/// `distance` meters along `azimuth` degrees
///
/// # Returns
/// A tuple of (latitude, longitude) in degrees
#[inline]
pub fn direct(lat: f64, lon: f64, azimuth: f64, distance: f64) -> (f64, f64) {
    let reached = Geodesic.destination(Point::new(lon, lat), azimuth, distance);
    (reached.y(), reached.x())
}

/// Fold any azimuth in degrees into [0, 360)
#[inline]
pub fn normalize_azimuth(azimuth: f64) -> f64 {
    let folded = azimuth.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if folded >= 360.0 { 0.0 } else { folded }
}

/// Linear interpolation of `y` at `x` on the line through `(x1, y1)` and `(x2, y2)`
#[inline]
pub fn lerp(x1: f64, y1: f64, x: f64, x2: f64, y2: f64) -> f64 {
    (x - x1) * (y2 - y1) / (x2 - x1) + y1
}
