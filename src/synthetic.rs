//! Seeded random vehicle records for tests and benchmarks.
//!
//! Feature-gated behind `synthetic`.
//!
//! ```rust
//! use vehicle_locator::synthetic::SyntheticFleet;
//!
//! let records = SyntheticFleet::texas(1_000, 7).generate();
//! assert_eq!(records.len(), 1_000);
//! ```

use crate::record::{Coordinate, VehicleRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Parameters for a generated fleet.
#[derive(Debug, Clone)]
pub struct SyntheticFleet {
    pub count: usize,
    /// Southwest corner of the bounding box.
    pub min: Coordinate,
    /// Northeast corner of the bounding box.
    pub max: Coordinate,
    pub seed: u64,
}

impl SyntheticFleet {
    /// Fleet spread over the box covering the default query set.
    pub fn texas(count: usize, seed: u64) -> Self {
        Self {
            count,
            min: Coordinate::new(31.0, -103.0),
            max: Coordinate::new(36.0, -94.0),
            seed,
        }
    }

    /// Fleet spread over every longitude, so records straddle the antimeridian.
    pub fn global(count: usize, seed: u64) -> Self {
        Self {
            count,
            min: Coordinate::new(-80.0, -180.0),
            max: Coordinate::new(80.0, 180.0),
            seed,
        }
    }

    /// Records get ids `1..=count`. Ids are `i32`, so at most `i32::MAX`
    /// records are generated.
    pub fn generate(&self) -> Vec<VehicleRecord> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        (1..=i32::MAX)
            .take(self.count)
            .map(|id| {
                let latitude = rng.gen_range(self.min.latitude..=self.max.latitude);
                let longitude = rng.gen_range(self.min.longitude..=self.max.longitude);
                VehicleRecord {
                    id,
                    registration: registration(&mut rng),
                    latitude,
                    longitude,
                    recorded_at: rng.gen_range(1_500_000_000..1_700_000_000),
                }
            })
            .collect()
    }

    /// Random query points inside the same box.
    pub fn queries(&self, count: usize) -> Vec<Coordinate> {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(1));
        (0..count)
            .map(|_| {
                Coordinate::new(
                    rng.gen_range(self.min.latitude..=self.max.latitude),
                    rng.gen_range(self.min.longitude..=self.max.longitude),
                )
            })
            .collect()
    }
}

fn registration(rng: &mut StdRng) -> String {
    let len = rng.gen_range(4..=10);
    (0..len)
        .map(|_| {
            if rng.gen_bool(0.5) {
                char::from(rng.gen_range(b'A'..=b'Z'))
            } else {
                char::from(rng.gen_range(b'0'..=b'9'))
            }
        })
        .collect()
}
