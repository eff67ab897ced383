//! Uniform spatial hash grid.
//!
//! Records are bucketed by `(trunc(lat / cell_size), trunc(lon / cell_size))`.
//! Truncation is toward zero, not floor, so the cells touching 0° on each axis
//! extend to both sides of zero (e.g. latitude -0.05 lands in cell 0 with a
//! cell size of 0.1).
//!
//! Queries scan the 3×3 block of cells around the target's cell. This is an
//! approximate search: a nearer record two or more cells away is not seen.

use super::{NearestIndex, Neighbor};
use crate::distance::haversine_km;
use crate::error::{LocatorError, Result};
use crate::record::{Coordinate, VehicleRecord};
use rustc_hash::FxHashMap;

/// Integer cell coordinate: (latitude cell, longitude cell).
pub type CellKey = (i32, i32);

/// Default cell size in degrees.
pub const DEFAULT_CELL_SIZE: f32 = 0.1;

/// Fixed-cell-size bucket index. Immutable once built.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cells: FxHashMap<CellKey, Vec<VehicleRecord>>,
    cell_size: f32,
    len: usize,
}

impl SpatialGrid {
    /// Bucket every record. Fails only if `cell_size` is not a positive finite number.
    pub fn build(records: Vec<VehicleRecord>, cell_size: f32) -> Result<Self> {
        validate_cell_size(cell_size)?;

        let len = records.len();
        let mut cells: FxHashMap<CellKey, Vec<VehicleRecord>> = FxHashMap::default();
        for record in records {
            if !record.location().is_finite() {
                log::warn!(
                    "Vehicle {} has non-finite coordinates ({}, {})",
                    record.id,
                    record.latitude,
                    record.longitude
                );
            }
            let key = cell_key(record.location(), cell_size);
            cells.entry(key).or_default().push(record);
        }

        log::info!(
            "Built spatial grid: {} records in {} cells (cell size {}°)",
            len,
            cells.len(),
            cell_size
        );

        Ok(Self {
            cells,
            cell_size,
            len,
        })
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Records in a cell, in insertion order.
    pub fn cell(&self, key: CellKey) -> &[VehicleRecord] {
        self.cells.get(&key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Cell holding `coord` under this grid's cell size.
    pub fn key_for(&self, coord: Coordinate) -> CellKey {
        cell_key(coord, self.cell_size)
    }
}

impl NearestIndex for SpatialGrid {
    fn nearest(&self, target: Coordinate) -> Option<Neighbor<'_>> {
        let (lat_cell, lon_cell) = self.key_for(target);
        let mut best: Option<Neighbor<'_>> = None;

        for d_lat in -1..=1 {
            for d_lon in -1..=1 {
                let key = (lat_cell.saturating_add(d_lat), lon_cell.saturating_add(d_lon));
                for record in self.cell(key) {
                    let distance_km = haversine_km(target, record.location());
                    // `<=`: a later record at equal distance replaces the earlier one.
                    if best.is_none_or(|b| distance_km <= b.distance_km) {
                        best = Some(Neighbor {
                            record,
                            distance_km,
                        });
                    }
                }
            }
        }

        best
    }

    fn len(&self) -> usize {
        self.len
    }

    fn name(&self) -> &'static str {
        "grid"
    }
}

/// Truncating cell index for a coordinate.
pub fn cell_key(coord: Coordinate, cell_size: f32) -> CellKey {
    // `as` truncates toward zero (and saturates on overflow/NaN).
    (
        (coord.latitude / cell_size) as i32,
        (coord.longitude / cell_size) as i32,
    )
}

pub(crate) fn validate_cell_size(cell_size: f32) -> Result<()> {
    if cell_size.is_finite() && cell_size > 0.0 {
        Ok(())
    } else {
        Err(LocatorError::InvalidConfig(format!(
            "cell size must be a positive finite number of degrees, got {cell_size}"
        )))
    }
}
