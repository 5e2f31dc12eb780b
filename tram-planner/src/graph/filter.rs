//! Selection of the routes and stations that take part in a graph build.

use std::collections::BTreeSet;

use crate::domain::{RouteId, StationId};

/// Predicate over routes and stations.
///
/// An unrestricted filter includes everything. Adding routes or stations
/// restricts the build to just those.
#[derive(Debug, Clone, Default)]
pub struct GraphFilter {
    routes: Option<BTreeSet<RouteId>>,
    stations: Option<BTreeSet<StationId>>,
}

impl GraphFilter {
    /// A filter that includes everything.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_route(mut self, route: RouteId) -> Self {
        self.routes.get_or_insert_with(BTreeSet::new).insert(route);
        self
    }

    pub fn with_station(mut self, station: StationId) -> Self {
        self.stations.get_or_insert_with(BTreeSet::new).insert(station);
        self
    }

    pub fn includes_route(&self, route: &RouteId) -> bool {
        self.routes.as_ref().is_none_or(|routes| routes.contains(route))
    }

    pub fn includes_station(&self, station: &StationId) -> bool {
        self.stations
            .as_ref()
            .is_none_or(|stations| stations.contains(station))
    }

    pub fn is_filtered(&self) -> bool {
        self.routes.is_some() || self.stations.is_some()
    }
}
