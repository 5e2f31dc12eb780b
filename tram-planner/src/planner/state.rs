//! Traversal states and the rules for moving between them.
//!
//! Each search branch is in exactly one state. An edge may only be followed
//! if the pair (state, edge kind) has a rule here, and the rule's checks
//! pass. The rules keep a branch on one trip once boarded, only board
//! services running on the query date, and respect the wait window.

use std::collections::HashSet;

use crate::domain::{Location, PlatformId, ServiceId, StationId, TramTime, TransportData, TripId};
use crate::graph::{Edge, EdgeKind, Node, NodeId, NodeKind};

use super::journey_state::JourneyState;
use super::overlay::QueryView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum TraversalState {
    /// At the start station, nothing travelled yet.
    Start,
    /// At a coordinate start or end point.
    QueryNode,
    Station,
    Platform,
    /// At a route station, service not yet chosen.
    JustBoarded,
    /// At a route station, aboard a trip.
    RouteStation,
    Service,
    Hour,
    Minute,
    /// Arrived by walking.
    Walking,
    Destination,
}

/// Facts fixed for the lifetime of one query.
pub(crate) struct SearchContext<'a> {
    pub data: &'a TransportData,
    pub running: HashSet<ServiceId>,
    /// Route stations from which a destination can be reached at all.
    pub reaching: HashSet<NodeId>,
    pub destination_nodes: HashSet<NodeId>,
    pub destination_stations: HashSet<StationId>,
    pub max_wait_mins: u32,
    pub max_changes: u32,
    pub max_journey_mins: u32,
    pub max_path_length: usize,
    pub change_at_interchange_only: bool,
}

impl SearchContext<'_> {
    /// A departure at `time` can be taken: not in the past and, unless
    /// already aboard, within the wait window.
    fn in_window(&self, time: TramTime, journey: &JourneyState) -> bool {
        let clock = journey.clock();
        time >= clock
            && (journey.is_aboard() || time.minutes_since(clock) <= self.max_wait_mins as i32)
    }

    /// Platform `trip` calls at when stopping at `station`.
    fn platform_at(&self, trip: &TripId, station: &StationId) -> Option<&PlatformId> {
        self.data
            .trip(trip)?
            .calls()
            .iter()
            .find(|call| call.station == *station)?
            .platform
            .as_ref()
    }
}

fn location(node: &Node) -> Option<Location> {
    match &node.kind {
        NodeKind::Station { station, .. } => Some(Location::Station(station.clone())),
        NodeKind::Query { position } => Some(Location::Position(*position)),
        _ => None,
    }
}

fn platform_of(node: &Node) -> Option<PlatformId> {
    match &node.kind {
        NodeKind::Platform { platform, .. } => Some(platform.clone()),
        _ => None,
    }
}

impl TraversalState {
    /// Follow `edge` from `from` to `to`, returning the new state and
    /// journey, or `None` if the edge can't be taken.
    pub(crate) fn step(
        self,
        edge: &Edge,
        from: &Node,
        to: &Node,
        view: QueryView<'_>,
        ctx: &SearchContext<'_>,
        journey: &JourneyState,
    ) -> Option<(TraversalState, JourneyState)> {
        use TraversalState as S;

        let (state, next) = match (self, &edge.kind) {
            (S::Destination, _) => return None,

            (S::Start | S::QueryNode | S::Station | S::Walking, EdgeKind::EnterPlatform) => {
                let mut next = journey.clone();
                next.advance(edge.cost);
                (S::Platform, next)
            }

            (S::Platform, EdgeKind::LeavePlatform) => {
                let mut next = journey.clone();
                next.advance(edge.cost);
                (S::Station, next)
            }

            (S::Start | S::Station | S::Walking | S::Platform, kind) if kind.is_boarding() => {
                if !ctx.reaching.contains(&to.id) {
                    return None;
                }
                let NodeKind::RouteStation { id, mode } = &to.kind else {
                    return None;
                };
                let station = from.station()?.clone();
                let mut next = journey.clone();
                next.begin_ride(id.route_id().clone(), *mode, station, platform_of(from));
                next.advance(edge.cost);
                (S::JustBoarded, next)
            }

            (S::Start | S::QueryNode | S::Station | S::Walking, EdgeKind::Walk) => {
                if journey.walk_used(from.id, to.id) {
                    return None;
                }
                let arriving = ctx.destination_nodes.contains(&to.id);
                if to.station().is_some_and(|s| journey.has_visited(s)) && !arriving {
                    return None;
                }
                let mut next = journey.clone();
                next.walk((from.id, to.id), location(from)?, location(to)?, edge.cost);
                (S::Walking, next)
            }

            (S::JustBoarded, EdgeKind::ToService) => {
                let NodeKind::Service { service, .. } = &to.kind else {
                    return None;
                };
                if !ctx.running.contains(service) {
                    return None;
                }
                let mut next = journey.clone();
                next.choose_service(service.clone());
                next.advance(edge.cost);
                (S::Service, next)
            }

            (S::RouteStation, EdgeKind::ToService) => {
                let NodeKind::Service { service, .. } = &to.kind else {
                    return None;
                };
                if journey.service() != Some(service) {
                    return None;
                }
                let mut next = journey.clone();
                next.pass_stop();
                next.advance(edge.cost);
                (S::Service, next)
            }

            (S::Service, EdgeKind::ToHour) => {
                let departs_in_window = view
                    .outgoing(to.id)
                    .filter_map(|e| match view.node(e.to).map(|n| &n.kind) {
                        Some(NodeKind::Minute { time, .. }) => Some(*time),
                        _ => None,
                    })
                    .any(|time| ctx.in_window(time, journey));
                if !departs_in_window {
                    return None;
                }
                let mut next = journey.clone();
                next.advance(edge.cost);
                (S::Hour, next)
            }

            (S::Hour, EdgeKind::ToMinute) => {
                let NodeKind::Minute { service, time } = &to.kind else {
                    return None;
                };
                if !ctx.in_window(*time, journey) || !ctx.running.contains(service) {
                    return None;
                }
                let mut next = journey.clone();
                next.wait_until(*time);
                (S::Minute, next)
            }

            (S::Minute, EdgeKind::GoesTo { trip, .. }) => {
                if journey.is_aboard() {
                    if journey.trip() != Some(trip) {
                        return None;
                    }
                } else if let (Some(boarded_at), Some(station)) =
                    (journey.board_platform(), journey.board_station())
                {
                    if ctx.platform_at(trip, station).is_some_and(|p| p != boarded_at) {
                        return None;
                    }
                }
                let mut next = journey.clone();
                if !next.is_aboard() {
                    next.board_trip(trip.clone());
                }
                next.advance(edge.cost);
                (S::RouteStation, next)
            }

            (S::RouteStation, kind) if kind.is_departing() => {
                let station = to.station()?;
                let arriving = ctx.destination_stations.contains(station);
                if ctx.change_at_interchange_only && !arriving && !ctx.data.is_interchange(station) {
                    return None;
                }
                if journey.has_visited(station) && !arriving {
                    return None;
                }
                let platform = platform_of(to);
                if let (Some(platform), Some(trip)) = (&platform, journey.trip()) {
                    if ctx.platform_at(trip, station).is_some_and(|p| p != platform) {
                        return None;
                    }
                }
                let state = if platform.is_some() { S::Platform } else { S::Station };
                let mut next = journey.clone();
                next.alight(station.clone(), platform);
                next.advance(edge.cost);
                (state, next)
            }

            _ => return None,
        };

        if ctx.destination_nodes.contains(&to.id) {
            return Some((S::Destination, next));
        }
        Some((state, next))
    }
}
