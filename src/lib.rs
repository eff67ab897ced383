//! Nearest-vehicle lookup over binary vehicle position files.
//!
//! Records are decoded from a compact binary dump and indexed with either a
//! k-d tree, a spatial hash grid, or a plain linear scan. Distances are
//! great-circle (haversine) kilometers.
//!
//! ```rust
//! use vehicle_locator::{Coordinate, Locator, Strategy, VehicleRecord};
//!
//! let records = vec![
//!     VehicleRecord::new(1, "ABC123", 0.0, 0.0, 0),
//!     VehicleRecord::new(2, "XYZ789", 1.0, 1.0, 0),
//! ];
//! let locator = Locator::builder().strategy(Strategy::KdTree).build(records)?;
//!
//! let hit = locator.locate(Coordinate::new(0.1, 0.1)).unwrap();
//! assert_eq!(hit.record.id, 1);
//! # Ok::<(), vehicle_locator::LocatorError>(())
//! ```

pub mod config;
pub mod decoder;
pub mod distance;
pub mod error;
pub mod index;
pub mod locator;
pub mod record;

#[cfg(feature = "synthetic")]
pub mod synthetic;

pub use config::Config;
pub use decoder::{decode_records, encode_records, load_records, write_records};
pub use distance::{EARTH_RADIUS_KM, haversine_km};
pub use error::{LocatorError, Result};
pub use index::{KdTree, LinearScan, NearestIndex, Neighbor, Pruning, SpatialGrid, Strategy};
pub use locator::{
    Locator, LocatorBuilder, MatchedVehicle, QueryOutcome, RunReport, run, run_with_records,
};
pub use record::{Axis, Coordinate, VehicleRecord};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use crate::{Config, Locator, LocatorError, Result};

    pub use crate::{Coordinate, VehicleRecord};

    pub use crate::{NearestIndex, Pruning, Strategy};
}
