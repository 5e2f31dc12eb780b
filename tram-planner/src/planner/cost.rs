//! Approximate station-to-station costs.
//!
//! A uniform-cost search over the route-level edges of the graph, ignoring
//! the calendar and time nodes. Results are memoised in a bounded cache
//! shared by every query.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use moka::sync::Cache as MokaCache;
use tracing::trace;

use crate::domain::StationId;
use crate::graph::{EdgeKind, GraphDatabase, NodeId, TransitGraph};

use super::QueryError;

/// Cache key: (from station, to station).
type CostKey = (StationId, StationId);

/// Computes and caches approximate costs between stations.
pub struct RouteCostCalculator {
    db: GraphDatabase,
    costs: MokaCache<CostKey, Option<u32>>,
}

impl RouteCostCalculator {
    pub fn new(db: GraphDatabase, max_capacity: u64) -> Self {
        let costs = MokaCache::builder().max_capacity(max_capacity).build();
        Self { db, costs }
    }

    /// Minimum summed edge cost from `from` to `to`, or `None` if the graph
    /// doesn't connect them.
    ///
    /// # Errors
    ///
    /// Returns `Err` if either station has no graph node.
    pub fn approximate_cost(&self, from: &StationId, to: &StationId) -> Result<Option<u32>, QueryError> {
        let key = (from.clone(), to.clone());
        if let Some(cost) = self.costs.get(&key) {
            return Ok(cost);
        }

        let tx = self.db.begin_tx();
        let start = tx
            .station_node(from)
            .ok_or_else(|| QueryError::UnknownStation(from.clone()))?;
        let end = tx
            .station_node(to)
            .ok_or_else(|| QueryError::UnknownStation(to.clone()))?;

        let cost = cheapest(&tx, start, end);
        trace!(from = %from, to = %to, ?cost, "computed approximate cost");
        self.costs.insert(key, cost);
        Ok(cost)
    }

    /// Number of cached results (for monitoring).
    pub fn entry_count(&self) -> u64 {
        self.costs.run_pending_tasks();
        self.costs.entry_count()
    }
}

fn traversable(kind: &EdgeKind) -> bool {
    matches!(
        kind,
        EdgeKind::Board
            | EdgeKind::Depart
            | EdgeKind::InterchangeBoard
            | EdgeKind::InterchangeDepart
            | EdgeKind::OnRoute { .. }
            | EdgeKind::Walk
            | EdgeKind::EnterPlatform
            | EdgeKind::LeavePlatform
    )
}

/// Dijkstra keyed on (cost, hops), so equal costs prefer fewer edges.
fn cheapest(graph: &TransitGraph, start: NodeId, end: NodeId) -> Option<u32> {
    let mut best: HashMap<NodeId, (u32, u32)> = HashMap::new();
    let mut heap = BinaryHeap::new();
    best.insert(start, (0, 0));
    heap.push(Reverse((0u32, 0u32, start)));

    while let Some(Reverse((cost, hops, node))) = heap.pop() {
        if node == end {
            return Some(cost);
        }
        if best.get(&node).is_some_and(|&b| b < (cost, hops)) {
            continue;
        }
        for edge in graph.outgoing(node).filter(|e| traversable(&e.kind)) {
            let next = (cost + edge.cost, hops + 1);
            if best.get(&edge.to).is_none_or(|&b| next < b) {
                best.insert(edge.to, next);
                heap.push(Reverse((next.0, next.1, edge.to)));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::test_network::TestNetwork;

    #[test]
    fn cost_along_route() {
        let network = TestNetwork::build();
        let calc = RouteCostCalculator::new(network.db.clone(), 100);

        // Board 2, Altrincham -> Cornbrook on route 1 is 20 minutes, interchange depart 1
        assert_eq!(
            calc.approximate_cost(&TestNetwork::station("ALT"), &TestNetwork::station("CRN"))
                .unwrap(),
            Some(23)
        );
        assert_eq!(
            calc.approximate_cost(&TestNetwork::station("ALT"), &TestNetwork::station("ALT"))
                .unwrap(),
            Some(0)
        );
    }

    #[test]
    fn unreachable_is_none() {
        let network = TestNetwork::build();
        let calc = RouteCostCalculator::new(network.db.clone(), 100);
        assert_eq!(
            calc.approximate_cost(&TestNetwork::station("ALT"), &TestNetwork::station("ISO"))
                .unwrap(),
            None
        );
    }

    #[test]
    fn unknown_station_is_error() {
        let network = TestNetwork::build();
        let calc = RouteCostCalculator::new(network.db.clone(), 100);
        assert!(matches!(
            calc.approximate_cost(&TestNetwork::station("ALT"), &StationId::new("NOPE")),
            Err(QueryError::UnknownStation(_))
        ));
    }

    #[test]
    fn results_are_cached_and_transactions_released() {
        let network = TestNetwork::build();
        let calc = RouteCostCalculator::new(network.db.clone(), 100);

        let from = TestNetwork::station("ALT");
        let to = TestNetwork::station("BUR");
        let first = calc.approximate_cost(&from, &to).unwrap();
        let second = calc.approximate_cost(&from, &to).unwrap();

        assert_eq!(first, second);
        assert_eq!(calc.entry_count(), 1);
        assert_eq!(network.db.open_transactions(), 0);
    }
}
