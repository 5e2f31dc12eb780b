//! Bookkeeping carried along each branch of a search.
//!
//! A branch owns its own copy; cloning is how a search forks.

use std::collections::HashSet;

use crate::domain::{
    DomainError, Journey, Location, PlatformId, RouteId, ServiceId, Stage, StationId, TramTime,
    TransportMode, TripId, VehicleStage, WalkingStage,
};
use crate::graph::NodeId;

/// A vehicle ride that has been boarded but not yet alighted from.
#[derive(Debug, Clone)]
struct Ride {
    route: RouteId,
    mode: TransportMode,
    board_station: StationId,
    board_platform: Option<PlatformId>,
    service: Option<ServiceId>,
    /// Unset until a departure minute has been chosen.
    trip: Option<TripId>,
    departure: TramTime,
    passed_stops: u32,
}

/// What two branches at the same node must share for one to rule out the
/// other: the trip once aboard, otherwise the platform a ride began from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub(crate) struct LabelKey {
    trip: Option<TripId>,
    platform: Option<PlatformId>,
}

#[derive(Debug, Clone)]
pub(crate) struct JourneyState {
    seed: TramTime,
    clock: TramTime,
    changes: u32,
    last_trip: Option<TripId>,
    ride: Option<Ride>,
    visited: HashSet<StationId>,
    walks_used: HashSet<(NodeId, NodeId)>,
    stages: Vec<Stage>,
    path_len: usize,
}

impl JourneyState {
    pub(crate) fn new(seed: TramTime, start: Option<&StationId>) -> Self {
        Self {
            seed,
            clock: seed,
            changes: 0,
            last_trip: None,
            ride: None,
            visited: start.into_iter().cloned().collect(),
            walks_used: HashSet::new(),
            stages: Vec::new(),
            path_len: 0,
        }
    }

    pub(crate) fn clock(&self) -> TramTime {
        self.clock
    }

    pub(crate) fn changes(&self) -> u32 {
        self.changes
    }

    pub(crate) fn path_len(&self) -> usize {
        self.path_len
    }

    /// Minutes since the seed time.
    pub(crate) fn elapsed_mins(&self) -> u32 {
        self.clock.minutes_since(self.seed).max(0) as u32
    }

    /// Trip currently being ridden.
    pub(crate) fn trip(&self) -> Option<&TripId> {
        self.ride.as_ref().and_then(|r| r.trip.as_ref())
    }

    pub(crate) fn service(&self) -> Option<&ServiceId> {
        self.ride.as_ref().and_then(|r| r.service.as_ref())
    }

    pub(crate) fn is_aboard(&self) -> bool {
        self.trip().is_some()
    }

    pub(crate) fn board_station(&self) -> Option<&StationId> {
        self.ride.as_ref().map(|r| &r.board_station)
    }

    pub(crate) fn board_platform(&self) -> Option<&PlatformId> {
        self.ride.as_ref().and_then(|r| r.board_platform.as_ref())
    }

    pub(crate) fn label_key(&self) -> LabelKey {
        match self.trip() {
            Some(trip) => LabelKey {
                trip: Some(trip.clone()),
                platform: None,
            },
            None => LabelKey {
                trip: None,
                platform: self.board_platform().cloned(),
            },
        }
    }

    pub(crate) fn has_visited(&self, station: &StationId) -> bool {
        self.visited.contains(station)
    }

    pub(crate) fn walk_used(&self, from: NodeId, to: NodeId) -> bool {
        self.walks_used.contains(&(from, to))
    }

    /// Follow an edge costing `mins`.
    pub(crate) fn advance(&mut self, mins: u32) {
        self.clock = self.clock.plus_minutes(mins);
        self.path_len += 1;
    }

    /// Follow an edge to a departure minute, waiting until `time`.
    pub(crate) fn wait_until(&mut self, time: TramTime) {
        self.clock = self.clock.max(time);
        self.path_len += 1;
    }

    pub(crate) fn begin_ride(
        &mut self,
        route: RouteId,
        mode: TransportMode,
        station: StationId,
        platform: Option<PlatformId>,
    ) {
        self.ride = Some(Ride {
            route,
            mode,
            board_station: station,
            board_platform: platform,
            service: None,
            trip: None,
            departure: self.clock,
            passed_stops: 0,
        });
    }

    pub(crate) fn choose_service(&mut self, service: ServiceId) {
        if let Some(ride) = self.ride.as_mut() {
            ride.service = Some(service);
        }
    }

    /// Bind the ride to `trip`, departing now. Counts a change when the
    /// previous ride was on a different trip.
    pub(crate) fn board_trip(&mut self, trip: TripId) {
        let Some(ride) = self.ride.as_mut() else {
            return;
        };
        if self.last_trip.as_ref().is_some_and(|last| *last != trip) {
            self.changes += 1;
        }
        ride.departure = self.clock;
        ride.trip = Some(trip.clone());
        self.last_trip = Some(trip);
    }

    pub(crate) fn pass_stop(&mut self) {
        if let Some(ride) = self.ride.as_mut() {
            ride.passed_stops += 1;
        }
    }

    /// Get off at `station`, closing the ride as a stage.
    pub(crate) fn alight(&mut self, station: StationId, platform: Option<PlatformId>) {
        let Some(ride) = self.ride.take() else {
            return;
        };
        if let Some(trip) = ride.trip {
            self.stages.push(Stage::Vehicle(VehicleStage {
                mode: ride.mode,
                route: ride.route,
                trip,
                first_station: ride.board_station,
                last_station: station.clone(),
                board_platform: ride.board_platform,
                alight_platform: platform,
                departure: ride.departure,
                arrival: self.clock,
                passed_stops: ride.passed_stops,
            }));
        }
        self.visited.insert(station);
    }

    /// Walk along the edge `from -> to`. A walk starts a fresh set of
    /// visited stations.
    pub(crate) fn walk(&mut self, edge: (NodeId, NodeId), from: Location, to: Location, mins: u32) {
        self.walks_used.insert(edge);
        self.visited.clear();
        if let Some(station) = to.station() {
            self.visited.insert(station.clone());
        }
        self.stages
            .push(Stage::Walk(WalkingStage::new(from, to, self.clock, mins)));
        self.advance(mins);
    }

    pub(crate) fn into_journey(self) -> Result<Journey, DomainError> {
        Journey::new(self.stages, self.seed)
    }
}
