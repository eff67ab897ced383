//! Vehicle position records and query coordinates.

use geo::Point;
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees, stored at the dataset's native `f32` precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f32,
    pub longitude: f32,
}

impl Coordinate {
    pub const fn new(latitude: f32, longitude: f32) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Value along the given splitting axis.
    #[inline]
    pub fn along(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Latitude => self.latitude,
            Axis::Longitude => self.longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

// geo points are (x, y) = (longitude, latitude).
impl From<Point<f32>> for Coordinate {
    fn from(point: Point<f32>) -> Self {
        Self::new(point.y(), point.x())
    }
}

impl From<Coordinate> for Point<f32> {
    fn from(coord: Coordinate) -> Self {
        Point::new(coord.longitude, coord.latitude)
    }
}

impl From<(f32, f32)> for Coordinate {
    fn from((latitude, longitude): (f32, f32)) -> Self {
        Self::new(latitude, longitude)
    }
}

/// Coordinate axis used to order and partition records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    /// Latitude at even depths, longitude at odd depths.
    #[inline]
    pub fn for_depth(depth: usize) -> Self {
        if depth % 2 == 0 {
            Axis::Latitude
        } else {
            Axis::Longitude
        }
    }
}

/// One decoded vehicle position. Immutable once decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleRecord {
    pub id: i32,
    pub registration: String,
    pub latitude: f32,
    pub longitude: f32,
    /// Opaque epoch-like value, carried through untouched.
    pub recorded_at: u64,
}

impl VehicleRecord {
    pub fn new(
        id: i32,
        registration: impl Into<String>,
        latitude: f32,
        longitude: f32,
        recorded_at: u64,
    ) -> Self {
        Self {
            id,
            registration: registration.into(),
            latitude,
            longitude,
            recorded_at,
        }
    }

    #[inline]
    pub fn location(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    pub fn point(&self) -> Point<f32> {
        self.location().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_conversion_swaps_axes() {
        let coord = Coordinate::new(34.5, -102.1);
        let point: Point<f32> = coord.into();
        assert_eq!(point.x(), -102.1);
        assert_eq!(point.y(), 34.5);
        assert_eq!(Coordinate::from(point), coord);
    }

    #[test]
    fn test_axis_alternates_by_depth() {
        assert_eq!(Axis::for_depth(0), Axis::Latitude);
        assert_eq!(Axis::for_depth(1), Axis::Longitude);
        assert_eq!(Axis::for_depth(2), Axis::Latitude);
        assert_eq!(Axis::for_depth(7), Axis::Longitude);
    }

    #[test]
    fn test_along() {
        let coord = Coordinate::new(1.5, -2.5);
        assert_eq!(coord.along(Axis::Latitude), 1.5);
        assert_eq!(coord.along(Axis::Longitude), -2.5);
    }

    #[test]
    fn test_record_location() {
        let record = VehicleRecord::new(7, "ABC123", 10.0, 20.0, 1_700_000_000);
        assert_eq!(record.location(), Coordinate::new(10.0, 20.0));
        assert_eq!(record.point().x(), 20.0);
    }
}
