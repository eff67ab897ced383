//! Nearest-neighbor indexes over decoded vehicle records.
//!
//! Every index is built once from the full record set and is read-only
//! afterwards, so a built index can be shared across threads for querying.
//!
//! - [`KdTree`]: median-split k-d tree with branch pruning
//! - [`SpatialGrid`]: fixed-size cell buckets with a 3×3 neighborhood scan (approximate)
//! - [`LinearScan`]: brute force over every record

pub mod grid;
pub mod kdtree;
pub mod linear;

pub use grid::{CellKey, SpatialGrid};
pub use kdtree::{KdNode, KdTree, Pruning};
pub use linear::LinearScan;

use crate::record::{Coordinate, VehicleRecord};
use serde::{Deserialize, Serialize};

/// Best match for a query: the record and its haversine distance in kilometers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<'a> {
    pub record: &'a VehicleRecord,
    pub distance_km: f64,
}

/// Common query surface for all index strategies.
pub trait NearestIndex: Send + Sync {
    /// Closest record to `target`, or `None` when the index (or the scanned
    /// neighborhood) holds nothing.
    fn nearest(&self, target: Coordinate) -> Option<Neighbor<'_>>;

    /// Number of records held by the index.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;
}

/// Which index the locator builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    KdTree,
    Grid,
    Linear,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::KdTree => "kd_tree",
            Strategy::Grid => "grid",
            Strategy::Linear => "linear",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kd_tree" | "kd-tree" | "kdtree" => Ok(Strategy::KdTree),
            "grid" => Ok(Strategy::Grid),
            "linear" => Ok(Strategy::Linear),
            other => Err(format!(
                "unknown strategy '{other}' (expected kd_tree, grid or linear)"
            )),
        }
    }
}
