//! Builds the time-expanded graph from transport data.
//!
//! For each selected route station the graph holds:
//!
//! ```text
//! Station <-> Platform <-> RouteStation -> Service -> Hour -> Minute -> RouteStation (next)
//! ```
//!
//! Platform-less modes board and alight straight from the station node.
//! Builds are cached: a stored graph is reused unless a rebuild is asked for
//! or its feed-version marker no longer matches the data.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, info, warn};

use crate::domain::{
    PlatformId, Route, RouteStationId, ServiceId, Station, StationId, TransportData, TramTime,
};
use crate::planner::PlannerConfig;
use crate::spatial::{StationLocations, walking_mins};

use super::model::{
    BOARDING_COST, DEPARTS_COST, INTERCHANGE_BOARD_COST, INTERCHANGE_DEPART_COST,
};
use super::{
    EdgeKind, GraphDatabase, GraphError, GraphFilter, NodeId, NodeKind, NodeLabel, TransitGraph,
    store, validate_feed_version,
};

/// What happened when the graph was opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub nodes: usize,
    pub edges: usize,
    /// False when a stored graph was reused.
    pub rebuilt: bool,
}

/// Transforms transport data into a stored graph.
pub struct GraphBuilder<'a> {
    data: &'a TransportData,
    filter: &'a GraphFilter,
    config: &'a PlannerConfig,
}

impl<'a> GraphBuilder<'a> {
    pub fn new(data: &'a TransportData, filter: &'a GraphFilter, config: &'a PlannerConfig) -> Self {
        Self {
            data,
            filter,
            config,
        }
    }

    /// Load the stored graph if it is current, otherwise build and store it.
    ///
    /// # Errors
    ///
    /// Returns `Err` on an unsupported transport mode or store failure.
    pub fn open(&self) -> Result<(GraphDatabase, BuildReport), GraphError> {
        let path = self.config.graph_path();

        if !self.config.rebuild_graph && path.exists() {
            let graph = store::load(&path)?;
            if validate_feed_version(&graph, self.data.feed_version()).is_valid() {
                let report = BuildReport {
                    nodes: graph.node_count(),
                    edges: graph.edge_count(),
                    rebuilt: false,
                };
                info!(path = %path.display(), "reusing stored graph");
                return Ok((GraphDatabase::new(graph), report));
            }
            warn!(path = %path.display(), "stored graph is stale, rebuilding");
        }

        let graph = self.build()?;
        store::save(&graph, &path)?;
        let report = BuildReport {
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            rebuilt: true,
        };
        Ok((GraphDatabase::new(graph), report))
    }

    /// Build the graph in memory.
    pub fn build(&self) -> Result<TransitGraph, GraphError> {
        let mut graph = TransitGraph::new();
        graph.add_node(
            NodeLabel::Version,
            NodeKind::Version {
                version: self.data.feed_version().to_string(),
            },
        );

        let routes: Vec<&Route> = self
            .data
            .routes()
            .filter(|r| self.filter.includes_route(&r.id))
            .collect();
        for route in &routes {
            NodeLabel::for_mode(route.mode)?;
        }

        let stations = self.add_stations(&mut graph)?;
        for route in &routes {
            self.add_route_stations(&mut graph, route)?;
            self.add_time_nodes(&mut graph, route);
        }
        if self.config.create_neighbours {
            self.add_neighbours(&mut graph, &stations);
        }

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            filtered = self.filter.is_filtered(),
            "built graph"
        );
        Ok(graph)
    }

    fn add_stations(&self, graph: &mut TransitGraph) -> Result<Vec<&'a Station>, GraphError> {
        let mut added = Vec::new();
        for station in self.data.stations() {
            if !self.filter.includes_station(&station.id)
                || !station.routes.iter().any(|r| self.filter.includes_route(r))
            {
                continue;
            }
            let label = NodeLabel::for_mode(station.mode)?;
            let node = graph.add_node(
                label,
                NodeKind::Station {
                    station: station.id.clone(),
                    mode: station.mode,
                },
            );
            if station.has_platforms() {
                for platform in &station.platforms {
                    let platform_node = graph.add_node(
                        NodeLabel::Platform,
                        NodeKind::Platform {
                            platform: platform.clone(),
                            station: station.id.clone(),
                        },
                    );
                    graph.add_edge(node, platform_node, EdgeKind::EnterPlatform, 0);
                    graph.add_edge(platform_node, node, EdgeKind::LeavePlatform, 0);
                }
            }
            added.push(station);
        }
        debug!(stations = added.len(), "added station nodes");
        Ok(added)
    }

    fn add_route_stations(&self, graph: &mut TransitGraph, route: &Route) -> Result<(), GraphError> {
        let platforms_used = self.platforms_used_by(route);

        for rs in self.data.route_stations_for(&route.id) {
            let station_id = rs.station();
            if !self.filter.includes_station(station_id) {
                continue;
            }
            let station_node = graph
                .station_node(station_id)
                .ok_or_else(|| GraphError::MissingNode(station_id.clone()))?;

            let rs_node = graph.add_node(
                NodeLabel::RouteStation,
                NodeKind::RouteStation {
                    id: rs.id.clone(),
                    mode: rs.mode,
                },
            );

            let (board, board_cost, depart, depart_cost) = if self.data.is_interchange(station_id) {
                (
                    EdgeKind::InterchangeBoard,
                    INTERCHANGE_BOARD_COST,
                    EdgeKind::InterchangeDepart,
                    INTERCHANGE_DEPART_COST,
                )
            } else {
                (EdgeKind::Board, BOARDING_COST, EdgeKind::Depart, DEPARTS_COST)
            };

            let mut stops: Vec<NodeId> = platforms_used
                .get(station_id)
                .into_iter()
                .flatten()
                .filter_map(|p| graph.platform_node(p))
                .collect();
            if stops.is_empty() {
                stops.push(station_node);
            }

            for stop in stops {
                graph.add_edge(stop, rs_node, board.clone(), board_cost);
                graph.add_edge(rs_node, stop, depart.clone(), depart_cost);
            }
        }
        Ok(())
    }

    fn platforms_used_by(&self, route: &Route) -> BTreeMap<StationId, BTreeSet<PlatformId>> {
        let mut used: BTreeMap<StationId, BTreeSet<PlatformId>> = BTreeMap::new();
        for service in route.services.iter().filter_map(|id| self.data.service(id)) {
            for trip in self.data.trips_for(service) {
                for call in trip.calls() {
                    if let Some(platform) = &call.platform {
                        used.entry(call.station.clone())
                            .or_default()
                            .insert(platform.clone());
                    }
                }
            }
        }
        used
    }

    fn add_time_nodes(&self, graph: &mut TransitGraph, route: &Route) {
        let mut services: HashMap<(NodeId, ServiceId), NodeId> = HashMap::new();
        let mut hours: HashMap<(NodeId, u32), NodeId> = HashMap::new();
        let mut minutes: HashMap<(NodeId, TramTime), NodeId> = HashMap::new();
        let mut on_route: BTreeMap<(NodeId, NodeId), u32> = BTreeMap::new();

        for service in route.services.iter().filter_map(|id| self.data.service(id)) {
            for trip in self.data.trips_for(service) {
                for (here, next) in trip.hops() {
                    if !self.filter.includes_station(&here.station)
                        || !self.filter.includes_station(&next.station)
                    {
                        continue;
                    }
                    let from_id = RouteStationId::new(here.station.clone(), route.id.clone());
                    let to_id = RouteStationId::new(next.station.clone(), route.id.clone());
                    let (Some(from_rs), Some(to_rs)) =
                        (graph.route_station_node(&from_id), graph.route_station_node(&to_id))
                    else {
                        continue;
                    };

                    let service_node = *services
                        .entry((from_rs, service.id.clone()))
                        .or_insert_with(|| {
                            let node = graph.add_node(
                                NodeLabel::Service,
                                NodeKind::Service {
                                    service: service.id.clone(),
                                    route_station: from_id.clone(),
                                },
                            );
                            graph.add_edge(from_rs, node, EdgeKind::ToService, 0);
                            node
                        });

                    let departs = here.departure;
                    let hour_node = *hours
                        .entry((service_node, departs.hour()))
                        .or_insert_with(|| {
                            let node = graph.add_node(
                                NodeLabel::Hour,
                                NodeKind::Hour {
                                    service: service.id.clone(),
                                    hour: departs.hour(),
                                },
                            );
                            graph.add_edge(service_node, node, EdgeKind::ToHour, 0);
                            node
                        });

                    let minute_node = *minutes.entry((hour_node, departs)).or_insert_with(|| {
                        let node = graph.add_node(
                            NodeLabel::Minute,
                            NodeKind::Minute {
                                service: service.id.clone(),
                                time: departs,
                            },
                        );
                        graph.add_edge(hour_node, node, EdgeKind::ToMinute, 0);
                        node
                    });

                    let cost = next.arrival.minutes_since(departs).max(0) as u32;
                    graph.add_edge(
                        minute_node,
                        to_rs,
                        EdgeKind::GoesTo {
                            trip: trip.id.clone(),
                            mode: route.mode,
                        },
                        cost,
                    );
                    on_route
                        .entry((from_rs, to_rs))
                        .and_modify(|c| *c = (*c).min(cost))
                        .or_insert(cost);
                }
            }
        }

        for ((from, to), cost) in on_route {
            graph.add_edge(
                from,
                to,
                EdgeKind::OnRoute {
                    route: route.id.clone(),
                },
                cost,
            );
        }
    }

    fn add_neighbours(&self, graph: &mut TransitGraph, stations: &[&Station]) {
        let locations = StationLocations::new(stations.iter().copied());
        let mut added = 0usize;
        for station in stations {
            let Some(from) = graph.station_node(&station.id) else {
                continue;
            };
            let nearby = locations.nearest_within(
                station.position,
                self.config.neighbour_distance_km,
                stations.len(),
            );
            for near in nearby.into_iter().filter(|n| n.station != station.id) {
                if let Some(to) = graph.station_node(&near.station) {
                    let cost = walking_mins(station.position, near.position, self.config.walking_mph);
                    graph.add_edge(from, to, EdgeKind::Walk, cost);
                    added += 1;
                }
            }
        }
        info!(walks = added, "added neighbour walks");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Agency, AgencyId, DaysOfWeek, FeedCall, FeedStation, FeedTrip, LatLong, RouteId, Service,
        TimetableFeed, TransportMode, TripId,
    };
    use crate::graph::Edge;

    fn time(s: &str) -> TramTime {
        TramTime::parse_hhmm(s).unwrap()
    }

    fn station(id: &str, lat: f64, mode: TransportMode, platforms: &[&str]) -> FeedStation {
        FeedStation {
            id: StationId::new(id),
            name: id.to_string(),
            area: String::new(),
            position: LatLong::new(lat, -2.2).unwrap(),
            mode,
            interchange: id == "B",
            platforms: platforms.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn call(sequence: u32, station: &str, platform: Option<&str>, at: &str) -> FeedCall {
        FeedCall {
            sequence,
            station: StationId::new(station),
            platform: platform.map(String::from),
            arrival: time(at),
            departure: time(at),
        }
    }

    /// A -> B -> C on one tram route, two trips at 10:00 and 10:15.
    fn feed(stop_mode: TransportMode) -> TimetableFeed {
        let trip = |id: &str, start: u32| FeedTrip {
            id: TripId::new(id),
            service: ServiceId::new("S1"),
            headsign: None,
            calls: vec![
                call(1, "A", Some("1"), &format!("10:{:02}", start)),
                call(2, "B", Some("1"), &format!("10:{:02}", start + 5)),
                call(3, "C", Some("1"), &format!("10:{:02}", start + 12)),
            ],
        };
        TimetableFeed {
            feed_version: "v1".into(),
            agencies: vec![Agency::new(AgencyId::new("MET"), "Metrolink")],
            routes: vec![Route::new(
                RouteId::new("R1"),
                "G",
                "Green",
                AgencyId::new("MET"),
                TransportMode::Tram,
            )],
            stations: vec![
                station("A", 53.400, stop_mode, &["1"]),
                station("B", 53.402, stop_mode, &["1"]),
                station("C", 53.450, stop_mode, &["1"]),
            ],
            services: vec![
                Service::new(ServiceId::new("S1"), RouteId::new("R1"))
                    .with_days(DaysOfWeek::from_bools(true, true, true, true, true, true, true))
                    .with_date_range(
                        chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                        chrono::NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
                    ),
            ],
            trips: vec![trip("T1", 0), trip("T2", 15)],
        }
    }

    fn data() -> TransportData {
        TransportData::from_feed(feed(TransportMode::Tram)).unwrap()
    }

    fn edges_of<'g>(graph: &'g TransitGraph, pred: impl Fn(&Edge) -> bool + 'g) -> Vec<&'g Edge> {
        graph.edges().iter().filter(|e| pred(e)).collect()
    }

    #[test]
    fn every_route_station_can_be_boarded_and_left() {
        let data = data();
        let config = PlannerConfig::default();
        let filter = GraphFilter::all();
        let graph = GraphBuilder::new(&data, &filter, &config).build().unwrap();

        let route_stations = graph.nodes_with_label(NodeLabel::RouteStation);
        assert_eq!(route_stations.len(), 3);
        for &rs in route_stations {
            assert!(graph.incoming(rs).any(|e| e.kind.is_boarding()), "no board edge into {rs}");
            assert!(graph.outgoing(rs).any(|e| e.kind.is_departing()), "no depart edge from {rs}");
        }
    }

    #[test]
    fn interchange_costs() {
        let data = data();
        let config = PlannerConfig::default();
        let filter = GraphFilter::all();
        let graph = GraphBuilder::new(&data, &filter, &config).build().unwrap();

        let b_platform = graph.platform_node(&PlatformId::new("B1")).unwrap();
        let boards: Vec<_> = graph.outgoing(b_platform).filter(|e| e.kind.is_boarding()).collect();
        assert_eq!(boards.len(), 1);
        assert_eq!(boards[0].kind, EdgeKind::InterchangeBoard);
        assert_eq!(boards[0].cost, INTERCHANGE_BOARD_COST);

        let a_platform = graph.platform_node(&PlatformId::new("A1")).unwrap();
        let board = graph.outgoing(a_platform).find(|e| e.kind.is_boarding()).unwrap();
        assert_eq!(board.kind, EdgeKind::Board);
        assert_eq!(board.cost, BOARDING_COST);
    }

    #[test]
    fn time_expansion() {
        let data = data();
        let config = PlannerConfig::default();
        let filter = GraphFilter::all();
        let graph = GraphBuilder::new(&data, &filter, &config).build().unwrap();

        // One service node at each of A and B, the terminus has none
        assert_eq!(graph.nodes_with_label(NodeLabel::Service).len(), 2);
        assert_eq!(graph.nodes_with_label(NodeLabel::Hour).len(), 2);
        // 10:00, 10:15 at A and 10:05, 10:20 at B
        assert_eq!(graph.nodes_with_label(NodeLabel::Minute).len(), 4);

        let goes_to = edges_of(&graph, |e| matches!(e.kind, EdgeKind::GoesTo { .. }));
        assert_eq!(goes_to.len(), 4);
        let mut costs: Vec<u32> = goes_to.iter().map(|e| e.cost).collect();
        costs.sort();
        assert_eq!(costs, vec![5, 5, 7, 7]);

        let on_route = edges_of(&graph, |e| matches!(e.kind, EdgeKind::OnRoute { .. }));
        assert_eq!(on_route.len(), 2);
    }

    #[test]
    fn version_marker_written() {
        let data = data();
        let config = PlannerConfig::default();
        let filter = GraphFilter::all();
        let graph = GraphBuilder::new(&data, &filter, &config).build().unwrap();
        assert!(validate_feed_version(&graph, "v1").is_valid());
    }

    #[test]
    fn bus_stations_board_from_station() {
        let mut feed = feed(TransportMode::Bus);
        feed.routes[0].mode = TransportMode::Bus;
        let data = TransportData::from_feed(feed).unwrap();
        let config = PlannerConfig::default();
        let filter = GraphFilter::all();
        let graph = GraphBuilder::new(&data, &filter, &config).build().unwrap();

        assert!(graph.nodes_with_label(NodeLabel::Platform).is_empty());
        assert_eq!(graph.nodes_with_label(NodeLabel::BusStation).len(), 3);
        let a = graph.station_node(&StationId::new("A")).unwrap();
        assert!(graph.outgoing(a).any(|e| e.kind == EdgeKind::Board));
    }

    #[test]
    fn unsupported_mode_aborts() {
        let mut feed = feed(TransportMode::Tram);
        feed.routes[0].mode = TransportMode::Ferry;
        let data = TransportData::from_feed(feed).unwrap();
        let config = PlannerConfig::default();
        let filter = GraphFilter::all();
        assert!(matches!(
            GraphBuilder::new(&data, &filter, &config).build(),
            Err(GraphError::UnsupportedMode(TransportMode::Ferry))
        ));
    }

    #[test]
    fn filter_limits_stations() {
        let data = data();
        let config = PlannerConfig::default();
        let filter = GraphFilter::all()
            .with_station(StationId::new("A"))
            .with_station(StationId::new("B"));
        let graph = GraphBuilder::new(&data, &filter, &config).build().unwrap();

        assert!(graph.station_node(&StationId::new("C")).is_none());
        assert_eq!(graph.nodes_with_label(NodeLabel::RouteStation).len(), 2);
        assert_eq!(edges_of(&graph, |e| matches!(e.kind, EdgeKind::GoesTo { .. })).len(), 2);
    }

    #[test]
    fn neighbours_when_enabled() {
        let data = data();
        let mut config = PlannerConfig::default();
        config.create_neighbours = true;
        let filter = GraphFilter::all();
        let graph = GraphBuilder::new(&data, &filter, &config).build().unwrap();

        // A and B are ~220m apart, C is several km away
        let walks = edges_of(&graph, |e| e.kind.is_walk());
        assert_eq!(walks.len(), 2);
        assert!(walks.iter().all(|w| w.cost == 3));
    }

    #[test]
    fn rebuild_is_idempotent() {
        let data = data();
        let config = PlannerConfig::default();
        let filter = GraphFilter::all();
        let builder = GraphBuilder::new(&data, &filter, &config);

        let first = builder.build().unwrap();
        let second = builder.build().unwrap();
        assert_eq!(first.shape(), second.shape());
        assert_eq!(first.node_count(), second.node_count());
        assert_eq!(first.edge_count(), second.edge_count());
    }

    #[test]
    fn open_reuses_current_store_and_rebuilds_stale_one() {
        let dir = tempfile::tempdir().unwrap();
        let config = PlannerConfig::new("builder_test", dir.path());
        let filter = GraphFilter::all();
        let data = data();

        let (_, first) = GraphBuilder::new(&data, &filter, &config).open().unwrap();
        assert!(first.rebuilt);

        let (db, second) = GraphBuilder::new(&data, &filter, &config).open().unwrap();
        assert!(!second.rebuilt);
        assert_eq!(second.nodes, first.nodes);
        assert_eq!(db.edge_count(), first.edges);

        let mut newer = feed(TransportMode::Tram);
        newer.feed_version = "v2".into();
        let newer = TransportData::from_feed(newer).unwrap();
        let (_, third) = GraphBuilder::new(&newer, &filter, &config).open().unwrap();
        assert!(third.rebuilt);

        let mut forced = config.clone();
        forced.rebuild_graph = true;
        let (_, fourth) = GraphBuilder::new(&newer, &filter, &forced).open().unwrap();
        assert!(fourth.rebuilt);
    }
}
