//! Great-circle distance on a spherical Earth.
//!
//! Coordinates arrive as `f32` degrees and are widened to `f64` before any
//! trigonometry. All distances are in kilometers.

use crate::record::Coordinate;
use std::f64::consts::FRAC_PI_2;

/// Fixed Earth radius used by every distance in this crate.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two coordinates, in kilometers.
///
/// Non-negative, symmetric, and zero when both coordinates are numerically equal.
///
/// ```rust
/// use vehicle_locator::{Coordinate, distance::haversine_km};
///
/// let a = Coordinate::new(0.0, 0.0);
/// let b = Coordinate::new(0.1, 0.1);
/// let d = haversine_km(a, b);
/// assert!((d - 15.72).abs() < 0.01);
/// ```
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = f64::from(a.latitude).to_radians();
    let lon1 = f64::from(a.longitude).to_radians();
    let lat2 = f64::from(b.latitude).to_radians();
    let lon2 = f64::from(b.longitude).to_radians();

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1 for antipodal points.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Shortest distance from `from` to any point on the parallel at `latitude`.
pub fn distance_to_parallel_km(from: Coordinate, latitude: f32) -> f64 {
    let d_lat = (f64::from(latitude) - f64::from(from.latitude)).to_radians();
    EARTH_RADIUS_KM * d_lat.abs()
}

/// Shortest distance from `from` to any point on the half-meridian at `longitude`
/// (pole to pole).
pub fn distance_to_meridian_km(from: Coordinate, longitude: f32) -> f64 {
    let lat = f64::from(from.latitude).to_radians();
    let mut d_lon = (f64::from(longitude) - f64::from(from.longitude)).to_radians().abs();
    if d_lon > std::f64::consts::PI {
        d_lon = 2.0 * std::f64::consts::PI - d_lon;
    }

    if d_lon <= FRAC_PI_2 {
        let s = (lat.cos() * d_lon.sin()).clamp(-1.0, 1.0);
        EARTH_RADIUS_KM * s.asin()
    } else {
        // Perpendicular foot lands on the opposite half; nearest point is a pole.
        EARTH_RADIUS_KM * (FRAC_PI_2 - lat.abs())
    }
}
