//! Journey planning entry point.
//!
//! A query runs one traversal per seed time, in order, and yields journeys
//! lazily. Journeys already produced by an earlier seed are skipped.
//!
//! A group of start stations can also be searched together against a set of
//! destinations, sharing one traversal between them.

use std::collections::{HashSet, VecDeque};

use tracing::{debug, info};

use crate::domain::{Journey, LatLong, StationId, TramTime, TransportData};
use crate::graph::{GraphDatabase, NodeId, ReadTx, TransitGraph};
use crate::spatial::{StationLocations, walking_mins};

use super::overlay::{QueryOverlay, QueryView};
use super::rank::SeenJourneys;
use super::state::{SearchContext, TraversalState};
use super::traverser::Traversal;
use super::{
    Endpoint, JourneyRequest, PlannerConfig, QueryError, ReachabilityRepository,
    RouteCostCalculator, deduplicate, query_times,
};

/// Plans journeys against a built graph.
///
/// Cheap to create; holds only references to shared, read-only state.
#[derive(Clone, Copy)]
pub struct RouteCalculator<'a> {
    data: &'a TransportData,
    db: &'a GraphDatabase,
    config: &'a PlannerConfig,
    reachability: &'a ReachabilityRepository,
    locations: &'a StationLocations,
    costs: &'a RouteCostCalculator,
}

/// Where a query starts.
struct Origin {
    node: NodeId,
    state: TraversalState,
    station: Option<StationId>,
}

impl<'a> RouteCalculator<'a> {
    pub fn new(
        data: &'a TransportData,
        db: &'a GraphDatabase,
        config: &'a PlannerConfig,
        reachability: &'a ReachabilityRepository,
        locations: &'a StationLocations,
        costs: &'a RouteCostCalculator,
    ) -> Self {
        Self {
            data,
            db,
            config,
            reachability,
            locations,
            costs,
        }
    }

    /// Journeys from `start` to `dest`, earliest arrival first within each
    /// seed time.
    ///
    /// Finding no journey is not an error: the stream is simply empty.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the request bounds are invalid, a station is not in
    /// the graph, or a position is out of range.
    pub fn calculate_route(
        &self,
        start: &Endpoint,
        dest: &Endpoint,
        request: &JourneyRequest,
    ) -> Result<JourneyStream<'a>, QueryError> {
        request.validate()?;
        if let (Endpoint::Station(a), Endpoint::Station(b)) = (start, dest) {
            if a == b {
                return Err(QueryError::InvalidQuery(format!(
                    "start and destination are both {a}"
                )));
            }
        }

        let tx = self.db.begin_tx();
        let mut overlay = QueryOverlay::new(&tx);

        let origin = match start {
            Endpoint::Station(id) => Origin {
                node: station_node(&tx, id)?,
                state: TraversalState::Start,
                station: Some(id.clone()),
            },
            Endpoint::Position(position) => {
                position.validate().map_err(QueryError::InvalidPosition)?;
                let node = overlay.add_query_node(*position);
                for (station, mins) in self.walkable(&tx, *position) {
                    overlay.add_walk(node, station, mins);
                }
                Origin {
                    node,
                    state: TraversalState::QueryNode,
                    station: None,
                }
            }
        };

        let (destination_nodes, destination_stations) = match dest {
            Endpoint::Station(id) => {
                let node = station_node(&tx, id)?;
                (HashSet::from([node]), HashSet::from([id.clone()]))
            }
            Endpoint::Position(position) => {
                position.validate().map_err(QueryError::InvalidPosition)?;
                let node = overlay.add_query_node(*position);
                let mut stations = HashSet::new();
                for (station, mins) in self.walkable(&tx, *position) {
                    overlay.add_walk(station, node, mins);
                    if let Some(id) = tx.node(station).and_then(|n| n.station()) {
                        stations.insert(id.clone());
                    }
                }
                (HashSet::from([node]), stations)
            }
        };

        let ctx = self.search_context(&tx, request, destination_nodes, destination_stations);

        let (depart_after, arrive_by) = if request.arrive_by {
            (self.departure_for_arrival(start, dest, request)?, Some(request.time))
        } else {
            (request.time, None)
        };
        let walk_at_start = matches!(start, Endpoint::Position(_));
        let seeds: VecDeque<TramTime> = query_times(depart_after, self.config, walk_at_start).into();

        info!(
            date = %request.date,
            time = %request.time,
            arrive_by = request.arrive_by,
            seeds = seeds.len(),
            running = ctx.running.len(),
            reaching = ctx.reaching.len(),
            walks = overlay.walk_count(),
            "planning journeys"
        );

        Ok(JourneyStream {
            tx,
            overlay,
            ctx,
            origin,
            seeds,
            current: None,
            seen: SeenJourneys::default(),
            arrive_by,
        })
    }

    /// Journeys from any of `starts` to any of `destinations`, leaving after
    /// the request time, earliest arrival first.
    ///
    /// The starts are searched as one group: a branch from one start that is
    /// no better than a branch from another at the same point is dropped, so
    /// the result holds the quickest ways out of the group rather than every
    /// start's own journeys. Starts that are themselves destinations are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the request is invalid or asks for arrive-by, there
    /// are no destinations, or a station is not in the graph.
    pub fn calculate_routes(
        &self,
        starts: &[StationId],
        destinations: &HashSet<StationId>,
        request: &JourneyRequest,
    ) -> Result<Vec<Journey>, QueryError> {
        request.validate()?;
        if request.arrive_by {
            return Err(QueryError::InvalidQuery(
                "arrive-by is not supported for grouped starts".to_string(),
            ));
        }
        if destinations.is_empty() {
            return Err(QueryError::InvalidQuery("no destinations given".to_string()));
        }

        let tx = self.db.begin_tx();
        let overlay = QueryOverlay::new(&tx);
        let destination_nodes = destinations
            .iter()
            .map(|id| station_node(&tx, id))
            .collect::<Result<HashSet<_>, _>>()?;
        let ctx = self.search_context(&tx, request, destination_nodes, destinations.clone());

        let mut traversal = Traversal::empty(request.time);
        let mut started = 0usize;
        for start in starts.iter().filter(|s| !destinations.contains(*s)) {
            traversal.add_start(station_node(&tx, start)?, TraversalState::Start, Some(start));
            started += 1;
        }
        info!(
            date = %request.date,
            time = %request.time,
            starts = started,
            destinations = destinations.len(),
            reaching = ctx.reaching.len(),
            "planning journeys for station group"
        );

        let view = QueryView::new(&tx, &overlay);
        let mut journeys = Vec::new();
        while let Some(journey) = traversal.next_journey(view, &ctx) {
            journeys.push(journey);
        }
        Ok(deduplicate(journeys))
    }

    /// Query facts shared by every traversal of one request.
    fn search_context(
        &self,
        graph: &TransitGraph,
        request: &JourneyRequest,
        destination_nodes: HashSet<NodeId>,
        destination_stations: HashSet<StationId>,
    ) -> SearchContext<'a> {
        let reaching = self.reachability.route_stations_reaching(
            graph,
            &destination_stations,
            !self.config.change_at_interchange_only,
        );
        SearchContext {
            data: self.data,
            running: self.data.services_operating_on(request.date).into_iter().collect(),
            reaching,
            destination_nodes,
            destination_stations,
            max_wait_mins: self.config.max_wait_mins,
            max_changes: request.max_changes,
            max_journey_mins: request.max_journey_mins,
            max_path_length: self.config.max_path_length,
            change_at_interchange_only: self.config.change_at_interchange_only,
        }
    }

    /// Stations within walking range of `position`, with walk times.
    fn walkable(&self, graph: &TransitGraph, position: LatLong) -> Vec<(NodeId, u32)> {
        self.locations
            .nearest_within(
                position,
                self.config.nearest_stops_range_km,
                self.config.num_of_nearest_stops,
            )
            .into_iter()
            .filter_map(|near| {
                let node = graph.station_node(&near.station)?;
                Some((node, walking_mins(position, near.position, self.config.walking_mph)))
            })
            .collect()
    }

    /// Nearest station to an endpoint, with the walk to reach it.
    fn representative(&self, endpoint: &Endpoint) -> Option<(StationId, u32)> {
        match endpoint {
            Endpoint::Station(id) => Some((id.clone(), 0)),
            Endpoint::Position(position) => self
                .locations
                .nearest_within(*position, self.config.nearest_stops_range_km, 1)
                .into_iter()
                .next()
                .map(|near| {
                    let mins = walking_mins(*position, near.position, self.config.walking_mph);
                    (near.station, mins)
                }),
        }
    }

    /// Time to start searching from to arrive by the requested time: the
    /// approximate cost back from the target, less half the wait window.
    fn departure_for_arrival(
        &self,
        start: &Endpoint,
        dest: &Endpoint,
        request: &JourneyRequest,
    ) -> Result<TramTime, QueryError> {
        let cost = match (self.representative(start), self.representative(dest)) {
            (Some((from, walk_from)), Some((to, walk_to))) if from != to => {
                self.costs.approximate_cost(&from, &to)?.unwrap_or(0) + walk_from + walk_to
            }
            (Some((_, walk_from)), Some((_, walk_to))) => walk_from + walk_to,
            _ => 0,
        };
        let depart = request
            .time
            .minus_minutes(cost)
            .minus_minutes(self.config.max_wait_mins / 2);
        debug!(arrive_by = %request.time, cost, %depart, "arrive-by search start");
        Ok(depart)
    }
}

fn station_node(graph: &TransitGraph, id: &StationId) -> Result<NodeId, QueryError> {
    graph
        .station_node(id)
        .ok_or_else(|| QueryError::UnknownStation(id.clone()))
}

/// Lazily produced journeys for one query.
///
/// Holds a read transaction on the graph until dropped.
pub struct JourneyStream<'a> {
    tx: ReadTx,
    overlay: QueryOverlay,
    ctx: SearchContext<'a>,
    origin: Origin,
    seeds: VecDeque<TramTime>,
    current: Option<Traversal>,
    seen: SeenJourneys,
    arrive_by: Option<TramTime>,
}

impl Iterator for JourneyStream<'_> {
    type Item = Journey;

    fn next(&mut self) -> Option<Journey> {
        loop {
            if self.current.is_none() {
                let seed = self.seeds.pop_front()?;
                debug!(%seed, "starting search");
                self.current = Some(Traversal::new(
                    self.origin.node,
                    self.origin.state,
                    seed,
                    self.origin.station.as_ref(),
                ));
            }
            let view = QueryView::new(&self.tx, &self.overlay);
            let traversal = self.current.as_mut()?;

            let Some(journey) = traversal.next_journey(view, &self.ctx) else {
                self.current = None;
                continue;
            };
            if self.arrive_by.is_some_and(|latest| journey.arrival_time() > latest) {
                continue;
            }
            if self.seen.first_sighting(&journey) {
                return Some(journey);
            }
        }
    }
}
