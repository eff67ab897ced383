//! Query driver: builds the configured index and answers batches of queries.

use crate::config::Config;
use crate::decoder::load_records;
use crate::error::Result;
use crate::index::grid::DEFAULT_CELL_SIZE;
use crate::index::{KdTree, LinearScan, NearestIndex, Neighbor, Pruning, SpatialGrid, Strategy};
use crate::record::{Coordinate, VehicleRecord};
use std::time::{Duration, Instant};

/// Builder for a [`Locator`].
#[derive(Debug, Clone)]
pub struct LocatorBuilder {
    strategy: Strategy,
    cell_size: f32,
    pruning: Pruning,
}

impl LocatorBuilder {
    pub fn new() -> Self {
        Self {
            strategy: Strategy::default(),
            cell_size: DEFAULT_CELL_SIZE,
            pruning: Pruning::default(),
        }
    }

    /// Take strategy, cell size and pruning from a configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .strategy(config.strategy)
            .cell_size(config.cell_size)
            .pruning(config.pruning)
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Grid cell size in degrees. Ignored by other strategies.
    pub fn cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    /// K-d tree pruning rule. Ignored by other strategies.
    pub fn pruning(mut self, pruning: Pruning) -> Self {
        self.pruning = pruning;
        self
    }

    /// Build the index over `records`. An empty record set yields an empty index.
    pub fn build(self, records: Vec<VehicleRecord>) -> Result<Locator> {
        let index: Box<dyn NearestIndex> = match self.strategy {
            Strategy::KdTree => Box::new(KdTree::build_with_pruning(records, self.pruning)),
            Strategy::Grid => Box::new(SpatialGrid::build(records, self.cell_size)?),
            Strategy::Linear => Box::new(LinearScan::build(records)),
        };

        if index.is_empty() {
            log::warn!("Index built from an empty record set; every query will miss");
        }

        Ok(Locator {
            index,
            strategy: self.strategy,
        })
    }
}

impl Default for LocatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A built index plus the strategy that produced it.
pub struct Locator {
    index: Box<dyn NearestIndex>,
    strategy: Strategy,
}

impl std::fmt::Debug for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Locator")
            .field("strategy", &self.strategy)
            .field("records", &self.index.len())
            .finish()
    }
}

impl Locator {
    pub fn builder() -> LocatorBuilder {
        LocatorBuilder::new()
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Nearest record to `target`, or `None` when nothing matches.
    pub fn locate(&self, target: Coordinate) -> Option<Neighbor<'_>> {
        let found = self.index.nearest(target);
        match &found {
            Some(n) => log::debug!(
                "{} query ({}, {}) -> vehicle {} at {:.3} km",
                self.index.name(),
                target.latitude,
                target.longitude,
                n.record.id,
                n.distance_km
            ),
            None => log::debug!(
                "{} query ({}, {}) -> no match",
                self.index.name(),
                target.latitude,
                target.longitude
            ),
        }
        found
    }

    /// Answer every query in order.
    pub fn locate_all(&self, targets: &[Coordinate]) -> Vec<QueryOutcome> {
        targets
            .iter()
            .map(|&target| QueryOutcome {
                target,
                matched: self.locate(target).map(MatchedVehicle::from),
            })
            .collect()
    }
}

/// Owned copy of the matched record's identity and distance.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedVehicle {
    pub id: i32,
    pub registration: String,
    pub location: Coordinate,
    pub distance_km: f64,
}

impl From<Neighbor<'_>> for MatchedVehicle {
    fn from(n: Neighbor<'_>) -> Self {
        Self {
            id: n.record.id,
            registration: n.record.registration.clone(),
            location: n.record.location(),
            distance_km: n.distance_km,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub target: Coordinate,
    pub matched: Option<MatchedVehicle>,
}

/// Results of a full run plus the time spent building the index and querying.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub strategy: Strategy,
    pub record_count: usize,
    pub outcomes: Vec<QueryOutcome>,
    pub elapsed: Duration,
}

/// Build the configured index over `records` and answer the configured queries.
///
/// `elapsed` covers index construction and all queries, not decoding.
pub fn run_with_records(config: &Config, records: Vec<VehicleRecord>) -> Result<RunReport> {
    config.validate()?;
    answer_queries(config, records)
}

/// Load `config.data_path`, then answer the configured queries as [`run_with_records`] does.
///
/// The configuration is validated before the file is read.
pub fn run(config: &Config) -> Result<RunReport> {
    config.validate()?;
    let records = load_records(&config.data_path)?;
    answer_queries(config, records)
}

/// Expects an already validated `config`.
fn answer_queries(config: &Config, records: Vec<VehicleRecord>) -> Result<RunReport> {
    let record_count = records.len();

    let start = Instant::now();
    let locator = LocatorBuilder::from_config(config).build(records)?;
    let outcomes = locator.locate_all(&config.queries);
    let elapsed = start.elapsed();

    log::info!(
        "Answered {} queries with {} over {} records in {:?}",
        outcomes.len(),
        config.strategy,
        record_count,
        elapsed
    );

    Ok(RunReport {
        strategy: config.strategy,
        record_count,
        outcomes,
        elapsed,
    })
}
