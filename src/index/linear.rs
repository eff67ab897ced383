//! Brute-force scan over every record.
//!
//! Serves as the reference answer for the other indexes. Ties keep the first
//! record in input order.

use super::{NearestIndex, Neighbor};
use crate::distance::haversine_km;
use crate::record::{Coordinate, VehicleRecord};

#[derive(Debug, Clone, Default)]
pub struct LinearScan {
    records: Vec<VehicleRecord>,
}

impl LinearScan {
    pub fn build(records: Vec<VehicleRecord>) -> Self {
        log::info!("Built linear scan over {} records", records.len());
        Self { records }
    }

    pub fn records(&self) -> &[VehicleRecord] {
        &self.records
    }
}

impl NearestIndex for LinearScan {
    fn nearest(&self, target: Coordinate) -> Option<Neighbor<'_>> {
        self.records.iter().fold(None, |best, record| {
            let distance_km = haversine_km(target, record.location());
            match best {
                Some(b) if distance_km >= b.distance_km => Some(b),
                _ => Some(Neighbor {
                    record,
                    distance_km,
                }),
            }
        })
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn name(&self) -> &'static str {
        "linear"
    }
}
