//! Two-dimensional k-d tree over latitude/longitude.
//!
//! The tree alternates its splitting axis by depth (latitude at even depths,
//! longitude at odd depths) and places the lower-middle record of each
//! sorted subset at the node. It is built once and never mutated.
//!
//! # Pruning
//!
//! After searching the near side of a node, the far side is visited only if
//! the bound for the splitting plane is smaller than the best distance found
//! so far. Two bounds are available:
//!
//! - [`Pruning::Planar`] compares the raw coordinate difference in degrees
//!   against the best distance in kilometers. Units don't match, so this is
//!   not a valid bound in general; it is kept as the default so results match
//!   existing outputs. It skips a closer record in two situations. Near the
//!   poles (above roughly 89.5° latitude) a degree of longitude spans less
//!   than one kilometer. Across the antimeridian, a target at 179.9° and a
//!   record at -179.9° are a few kilometers apart but ~360 degrees apart in
//!   raw longitude, so the far branch is pruned at any latitude.
//! - [`Pruning::GreatCircle`] uses the true minimum great-circle distance from
//!   the target to the splitting parallel or meridian, which makes the search exact.

use super::{NearestIndex, Neighbor};
use crate::distance::{distance_to_meridian_km, distance_to_parallel_km, haversine_km};
use crate::record::{Axis, Coordinate, VehicleRecord};
use serde::{Deserialize, Serialize};

/// Far-side pruning rule used during queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Pruning {
    /// Degree difference against kilometer distance.
    #[default]
    Planar,
    /// Kilometer lower bound to the splitting parallel/meridian.
    GreatCircle,
}

impl std::str::FromStr for Pruning {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planar" => Ok(Pruning::Planar),
            "great_circle" | "great-circle" => Ok(Pruning::GreatCircle),
            other => Err(format!(
                "unknown pruning '{other}' (expected planar or great_circle)"
            )),
        }
    }
}

/// A tree node. Children are exclusively owned and built from disjoint
/// subsets of the parent's records.
#[derive(Debug, Clone)]
pub struct KdNode {
    record: VehicleRecord,
    axis: Axis,
    left: Option<Box<KdNode>>,
    right: Option<Box<KdNode>>,
}

impl KdNode {
    pub fn record(&self) -> &VehicleRecord {
        &self.record
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn left(&self) -> Option<&KdNode> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&KdNode> {
        self.right.as_deref()
    }

    #[inline]
    fn split_value(&self) -> f32 {
        self.record.location().along(self.axis)
    }
}

/// Median-split k-d tree.
///
/// ```rust
/// use vehicle_locator::{Coordinate, KdTree, NearestIndex, VehicleRecord};
///
/// let tree = KdTree::build(vec![
///     VehicleRecord::new(1, "A", 0.0, 0.0, 0),
///     VehicleRecord::new(2, "B", 1.0, 1.0, 0),
///     VehicleRecord::new(3, "C", 5.0, 5.0, 0),
/// ]);
///
/// let hit = tree.nearest(Coordinate::new(0.1, 0.1)).unwrap();
/// assert_eq!(hit.record.id, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct KdTree {
    root: Option<Box<KdNode>>,
    len: usize,
    pruning: Pruning,
}

impl KdTree {
    /// Build a tree using the default [`Pruning::Planar`] rule.
    pub fn build(records: Vec<VehicleRecord>) -> Self {
        Self::build_with_pruning(records, Pruning::default())
    }

    pub fn build_with_pruning(records: Vec<VehicleRecord>, pruning: Pruning) -> Self {
        let len = records.len();
        let root = build_subtree(records, 0);
        let tree = Self { root, len, pruning };

        log::info!(
            "Built k-d tree: {} records, depth {}, {:?} pruning",
            tree.len,
            tree.depth(),
            tree.pruning
        );
        tree
    }

    pub fn root(&self) -> Option<&KdNode> {
        self.root.as_deref()
    }

    pub fn pruning(&self) -> Pruning {
        self.pruning
    }

    /// Number of levels; 0 for an empty tree.
    pub fn depth(&self) -> usize {
        fn depth_of(node: Option<&KdNode>) -> usize {
            match node {
                None => 0,
                Some(n) => 1 + depth_of(n.left()).max(depth_of(n.right())),
            }
        }
        depth_of(self.root())
    }

    fn search<'a>(
        &'a self,
        node: Option<&'a KdNode>,
        target: Coordinate,
        mut best: Option<Neighbor<'a>>,
    ) -> Option<Neighbor<'a>> {
        let Some(node) = node else {
            return best;
        };

        let distance_km = haversine_km(target, node.record.location());
        // Strict comparison: on ties the earlier-visited record stays.
        if best.is_none_or(|b| distance_km < b.distance_km) {
            best = Some(Neighbor {
                record: &node.record,
                distance_km,
            });
        }

        let split = node.split_value();
        let (near, far) = if target.along(node.axis) < split {
            (node.left(), node.right())
        } else {
            (node.right(), node.left())
        };

        best = self.search(near, target, best);

        let best_km = best.map_or(f64::INFINITY, |b| b.distance_km);
        if self.plane_bound(node, target) < best_km {
            best = self.search(far, target, best);
        }

        best
    }

    fn plane_bound(&self, node: &KdNode, target: Coordinate) -> f64 {
        let split = node.split_value();
        match self.pruning {
            Pruning::Planar => f64::from((split - target.along(node.axis)).abs()),
            Pruning::GreatCircle => match node.axis {
                Axis::Latitude => distance_to_parallel_km(target, split),
                // The far wedge is bounded by the split meridian and the antimeridian.
                Axis::Longitude => distance_to_meridian_km(target, split)
                    .min(distance_to_meridian_km(target, 180.0)),
            },
        }
    }
}

impl NearestIndex for KdTree {
    fn nearest(&self, target: Coordinate) -> Option<Neighbor<'_>> {
        self.search(self.root(), target, None)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn name(&self) -> &'static str {
        "kd_tree"
    }
}

/// Each call owns its subset, so sorting never disturbs a sibling or parent.
fn build_subtree(mut records: Vec<VehicleRecord>, depth: usize) -> Option<Box<KdNode>> {
    if records.is_empty() {
        return None;
    }

    let axis = Axis::for_depth(depth);
    records.sort_by(|a, b| a.location().along(axis).total_cmp(&b.location().along(axis)));

    let median = records.len() / 2;
    let right = records.split_off(median + 1);
    let record = records.pop()?;
    let left = records;

    Some(Box::new(KdNode {
        record,
        axis,
        left: build_subtree(left, depth + 1),
        right: build_subtree(right, depth + 1),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::LinearScan;

    fn rec(id: i32, lat: f32, lon: f32) -> VehicleRecord {
        VehicleRecord::new(id, format!("REG{id}"), lat, lon, 0)
    }

    fn collect_values(node: Option<&KdNode>, axis: Axis, out: &mut Vec<f32>) {
        if let Some(n) = node {
            out.push(n.record().location().along(axis));
            collect_values(n.left(), axis, out);
            collect_values(n.right(), axis, out);
        }
    }

    fn assert_split_invariant(node: Option<&KdNode>, depth: usize) -> usize {
        let Some(n) = node else { return 0 };
        assert_eq!(n.axis(), Axis::for_depth(depth));
        let split = n.split_value();

        let mut left = Vec::new();
        collect_values(n.left(), n.axis(), &mut left);
        assert!(left.iter().all(|v| *v <= split));

        let mut right = Vec::new();
        collect_values(n.right(), n.axis(), &mut right);
        assert!(right.iter().all(|v| *v >= split));

        1 + assert_split_invariant(n.left(), depth + 1) + assert_split_invariant(n.right(), depth + 1)
    }

    fn grid_records(n: i32) -> Vec<VehicleRecord> {
        (0..n)
            .map(|i| rec(i, 30.0 + (i % 17) as f32 * 0.37, -100.0 + (i / 17) as f32 * 0.41))
            .collect()
    }

    #[test]
    fn test_empty_tree() {
        let tree = KdTree::build(Vec::new());
        assert!(tree.is_empty());
        assert!(tree.root().is_none());
        assert_eq!(tree.depth(), 0);
        assert!(tree.nearest(Coordinate::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn test_single_record() {
        let tree = KdTree::build(vec![rec(9, 10.0, 10.0)]);
        let hit = tree.nearest(Coordinate::new(-40.0, 120.0)).unwrap();
        assert_eq!(hit.record.id, 9);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_median_is_lower_middle() {
        let tree = KdTree::build(vec![
            rec(1, 4.0, 0.0),
            rec(2, 1.0, 0.0),
            rec(3, 3.0, 0.0),
            rec(4, 2.0, 0.0),
        ]);
        // Sorted by latitude: 1.0, 2.0, 3.0, 4.0 -> index 2.
        assert_eq!(tree.root().unwrap().record().id, 3);
        assert_eq!(tree.root().unwrap().left().unwrap().axis(), Axis::Longitude);
    }

    #[test]
    fn test_split_invariant_holds_everywhere() {
        let tree = KdTree::build(grid_records(500));
        let visited = assert_split_invariant(tree.root(), 0);
        assert_eq!(visited, 500);
        assert_eq!(tree.len(), 500);
        // Balanced: ceil(log2(501)) levels.
        assert_eq!(tree.depth(), 9);
    }

    #[test]
    fn test_three_point_scenario() {
        let tree = KdTree::build(vec![rec(1, 0.0, 0.0), rec(2, 1.0, 1.0), rec(3, 5.0, 5.0)]);
        let target = Coordinate::new(0.1, 0.1);

        let hit = tree.nearest(target).unwrap();
        assert_eq!(hit.record.id, 1);
        assert_eq!(
            hit.distance_km,
            haversine_km(target, Coordinate::new(0.0, 0.0))
        );
        assert!((hit.distance_km - 15.7).abs() < 0.1);
    }

    #[test]
    fn test_tie_keeps_first_visited() {
        // Stable sort keeps input order on equal latitude, so the root is id 2.
        let tree = KdTree::build(vec![rec(1, 0.0, 1.0), rec(2, 0.0, -1.0)]);
        assert_eq!(tree.root().unwrap().record().id, 2);

        let hit = tree.nearest(Coordinate::new(0.0, 0.0)).unwrap();
        assert_eq!(hit.record.id, 2);
    }

    #[test]
    fn test_matches_linear_scan_away_from_poles() {
        let records = grid_records(400);
        let linear = LinearScan::build(records.clone());
        let planar = KdTree::build(records.clone());
        let exact = KdTree::build_with_pruning(records, Pruning::GreatCircle);

        for i in 0..50 {
            let target = Coordinate::new(29.0 + i as f32 * 0.19, -101.0 + i as f32 * 0.23);
            let expected = linear.nearest(target).unwrap().distance_km;
            assert_eq!(planar.nearest(target).unwrap().distance_km, expected);
            assert_eq!(exact.nearest(target).unwrap().distance_km, expected);
        }
    }

    #[test]
    fn test_great_circle_is_exact_near_pole() {
        // Polar ring: longitude degrees are tiny here, so the planar bound over-prunes.
        let records: Vec<_> = (0..72)
            .map(|i| rec(i, 89.9, -180.0 + i as f32 * 5.0))
            .chain((0..20).map(|i| rec(100 + i, 89.0 + i as f32 * 0.04, 0.0)))
            .collect();
        let linear = LinearScan::build(records.clone());
        let exact = KdTree::build_with_pruning(records, Pruning::GreatCircle);

        for lon in [-170.0_f32, -92.5, -3.0, 0.0, 44.0, 137.5, 179.0] {
            let target = Coordinate::new(89.95, lon);
            assert_eq!(
                exact.nearest(target).unwrap().distance_km,
                linear.nearest(target).unwrap().distance_km,
                "lon {lon}"
            );
        }
    }

    fn antimeridian_records() -> Vec<VehicleRecord> {
        vec![
            rec(1, -0.1, -179.95),
            rec(2, -0.3, 0.0),
            rec(3, -0.2, 179.5),
            rec(4, 0.0, 90.0),
            rec(5, 0.1, 90.0),
            rec(6, 0.2, 91.0),
            rec(7, 0.3, 92.0),
        ]
    }

    #[test]
    fn test_planar_misses_across_antimeridian() {
        // Root is id 4; its left child splits on longitude at id 2 (0.0°),
        // with id 1 on the west side and id 3 on the east side.
        let tree = KdTree::build(antimeridian_records());
        let root = tree.root().unwrap();
        assert_eq!(root.record().id, 4);
        let left = root.left().unwrap();
        assert_eq!(left.record().id, 2);
        assert_eq!(left.axis(), Axis::Longitude);

        let target = Coordinate::new(-0.1, 179.95);
        let scan = LinearScan::build(antimeridian_records());
        let truth = scan
            .nearest(target)
            .unwrap();
        assert_eq!(truth.record.id, 1);
        assert!(truth.distance_km < 12.0);

        // 179.95 degrees to the split outweighs ~51 km to id 3.
        let hit = tree.nearest(target).unwrap();
        assert_eq!(hit.record.id, 3);
        assert!(hit.distance_km > 40.0);
    }

    #[test]
    fn test_great_circle_crosses_antimeridian() {
        let tree = KdTree::build_with_pruning(antimeridian_records(), Pruning::GreatCircle);
        let hit = tree.nearest(Coordinate::new(-0.1, 179.95)).unwrap();
        assert_eq!(hit.record.id, 1);
    }

    #[test]
    fn test_planar_bound_uses_degrees() {
        let tree = KdTree::build(vec![rec(1, 10.0, 0.0)]);
        let node = tree.root().unwrap();
        let bound = tree.plane_bound(node, Coordinate::new(12.5, 0.0));
        assert_eq!(bound, 2.5);
    }

    #[test]
    fn test_pruning_parse() {
        assert_eq!("planar".parse::<Pruning>().unwrap(), Pruning::Planar);
        assert_eq!(
            "great-circle".parse::<Pruning>().unwrap(),
            Pruning::GreatCircle
        );
        assert!("none".parse::<Pruning>().is_err());
    }
}
