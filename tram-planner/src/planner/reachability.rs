//! Route-level reachability, ignoring the calendar.
//!
//! Answers questions like "can an interchange be reached from here on this
//! route" and "from which route stations can the destination be reached at
//! all". Works over `OnRoute` and `Walk` edges only.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use tracing::info;

use crate::domain::{Interchanges, RouteId, StationId};
use crate::graph::{EdgeKind, NodeId, NodeKind, NodeLabel, TransitGraph};

fn next_on_route(graph: &TransitGraph, rs: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    graph
        .outgoing(rs)
        .filter(|e| matches!(e.kind, EdgeKind::OnRoute { .. }))
        .map(|e| e.to)
}

fn station_of(graph: &TransitGraph, node: NodeId) -> Option<&StationId> {
    graph.node(node).and_then(|n| n.station())
}

/// Precomputed route-station facts, built once at startup.
#[derive(Debug, Clone)]
pub struct ReachabilityRepository {
    interchanges: Interchanges,
    route_stations_at: HashMap<StationId, Vec<NodeId>>,
    interchange_reachable: HashSet<NodeId>,
}

impl ReachabilityRepository {
    pub fn new(graph: &TransitGraph, interchanges: &Interchanges) -> Self {
        let mut route_stations_at: HashMap<StationId, Vec<NodeId>> = HashMap::new();
        for &rs in graph.nodes_with_label(NodeLabel::RouteStation) {
            if let Some(station) = station_of(graph, rs) {
                route_stations_at.entry(station.clone()).or_default().push(rs);
            }
        }

        let interchange_reachable: HashSet<NodeId> = graph
            .nodes_with_label(NodeLabel::RouteStation)
            .iter()
            .copied()
            .filter(|&rs| interchange_along_route(graph, interchanges, rs))
            .collect();

        info!(
            route_stations = graph.nodes_with_label(NodeLabel::RouteStation).len(),
            can_reach_interchange = interchange_reachable.len(),
            "computed route reachability"
        );

        Self {
            interchanges: interchanges.clone(),
            route_stations_at,
            interchange_reachable,
        }
    }

    /// True if an interchange lies further along the route from `rs`.
    pub fn is_interchange_reachable(&self, rs: NodeId) -> bool {
        self.interchange_reachable.contains(&rs)
    }

    pub fn route_stations_at(&self, station: &StationId) -> &[NodeId] {
        self.route_stations_at
            .get(station)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Route stations from which one of `destinations` can be reached,
    /// riding along routes, changing where allowed and walking between
    /// stations.
    ///
    /// With `change_anywhere` unset, passengers may only get off at
    /// interchanges or a destination.
    pub fn route_stations_reaching(
        &self,
        graph: &TransitGraph,
        destinations: &HashSet<StationId>,
        change_anywhere: bool,
    ) -> HashSet<NodeId> {
        let route_stations = graph.nodes_with_label(NodeLabel::RouteStation);
        let mut can_reach: HashSet<StationId> = destinations.clone();
        let mut can_alight: HashSet<StationId> = destinations.clone();
        let mut reaching: HashSet<NodeId> = HashSet::new();

        loop {
            let before = (reaching.len(), can_reach.len());

            for &rs in route_stations {
                if reaching.contains(&rs) {
                    continue;
                }
                let alight_here = station_of(graph, rs).is_some_and(|s| can_alight.contains(s));
                if alight_here || next_on_route(graph, rs).any(|n| reaching.contains(&n)) {
                    reaching.insert(rs);
                }
            }

            for &rs in &reaching {
                if let Some(station) = station_of(graph, rs) {
                    can_reach.insert(station.clone());
                }
            }

            for &node in graph
                .nodes_with_label(NodeLabel::TramStation)
                .iter()
                .chain(graph.nodes_with_label(NodeLabel::BusStation))
                .chain(graph.nodes_with_label(NodeLabel::TrainStation))
            {
                let Some(station) = station_of(graph, node) else {
                    continue;
                };
                if can_reach.contains(station) {
                    continue;
                }
                let walk_reaches = graph.outgoing(node).any(|e| {
                    e.kind.is_walk() && station_of(graph, e.to).is_some_and(|s| can_reach.contains(s))
                });
                if walk_reaches {
                    can_reach.insert(station.clone());
                }
            }

            for station in &can_reach {
                if change_anywhere || self.interchanges.is_interchange(station) {
                    can_alight.insert(station.clone());
                }
            }

            if (reaching.len(), can_reach.len()) == before {
                break;
            }
        }
        reaching
    }
}

fn interchange_along_route(graph: &TransitGraph, interchanges: &Interchanges, start: NodeId) -> bool {
    let mut seen = HashSet::from([start]);
    let mut queue: VecDeque<NodeId> = next_on_route(graph, start).collect();
    while let Some(rs) = queue.pop_front() {
        if !seen.insert(rs) {
            continue;
        }
        if station_of(graph, rs).is_some_and(|s| interchanges.is_interchange(s)) {
            return true;
        }
        queue.extend(next_on_route(graph, rs));
    }
    false
}

/// Route reachability queries against one read transaction.
pub struct RouteReachable<'g> {
    graph: &'g TransitGraph,
    repository: &'g ReachabilityRepository,
}

impl<'g> RouteReachable<'g> {
    pub fn new(graph: &'g TransitGraph, repository: &'g ReachabilityRepository) -> Self {
        Self { graph, repository }
    }

    /// True if nothing follows `rs` on its route.
    pub fn is_end_of_route(&self, rs: NodeId) -> bool {
        next_on_route(self.graph, rs).next().is_none()
    }

    pub fn is_interchange_reachable(&self, rs: NodeId) -> bool {
        self.repository.is_interchange_reachable(rs)
    }

    /// Stations reachable from `rs`, passing through at most one interchange.
    ///
    /// At the first interchange reached the search may switch to any route
    /// serving it; a second interchange is included but not passed.
    pub fn reachable_stations(&self, rs: NodeId) -> BTreeSet<StationId> {
        let mut found = BTreeSet::new();
        let mut seen: HashSet<(NodeId, u8)> = HashSet::new();
        let mut queue: VecDeque<(NodeId, u8)> =
            next_on_route(self.graph, rs).map(|n| (n, 0)).collect();

        while let Some((node, passed)) = queue.pop_front() {
            if !seen.insert((node, passed)) {
                continue;
            }
            let Some(station) = station_of(self.graph, node) else {
                continue;
            };
            found.insert(station.clone());

            if self.repository.interchanges.is_interchange(station) {
                if passed >= 1 {
                    continue;
                }
                for &other in self.repository.route_stations_at(station) {
                    queue.extend(next_on_route(self.graph, other).map(|n| (n, 1)));
                }
            } else {
                queue.extend(next_on_route(self.graph, node).map(|n| (n, passed)));
            }
        }
        found
    }

    /// Routes with a direct hop from `start` to `neighbour`.
    pub fn routes_from_start_to_neighbour(&self, start: &StationId, neighbour: &StationId) -> BTreeSet<RouteId> {
        let mut routes = BTreeSet::new();
        for &rs in self.repository.route_stations_at(start) {
            for edge in self.graph.outgoing(rs) {
                let EdgeKind::OnRoute { route } = &edge.kind else {
                    continue;
                };
                if station_of(self.graph, edge.to) == Some(neighbour) {
                    routes.insert(route.clone());
                }
            }
        }
        routes
    }

    /// The route station node for `station` on `route`, if any.
    pub fn route_station(&self, station: &StationId, route: &RouteId) -> Option<NodeId> {
        self.repository
            .route_stations_at(station)
            .iter()
            .copied()
            .find(|&rs| {
                matches!(
                    self.graph.node(rs).map(|n| &n.kind),
                    Some(NodeKind::RouteStation { id, .. }) if id.route_id() == route
                )
            })
    }
}
