//! Agencies and routes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{AgencyId, RouteId, RouteStationId, ServiceId, StationId, TransportMode};

/// An operator of routes.
///
/// Holds route ids only for reporting; routes point at their agency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agency {
    pub id: AgencyId,
    pub name: String,
    #[serde(default)]
    pub routes: BTreeSet<RouteId>,
}

impl Agency {
    pub fn new(id: AgencyId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            routes: BTreeSet::new(),
        }
    }
}

/// A named line operated in one direction by one agency.
///
/// Equality is by id only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub short_code: String,
    pub name: String,
    pub agency: AgencyId,
    pub mode: TransportMode,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub services: BTreeSet<ServiceId>,
    #[serde(default)]
    pub headsigns: BTreeSet<String>,
}

impl Route {
    pub fn new(
        id: RouteId,
        short_code: impl Into<String>,
        name: impl Into<String>,
        agency: AgencyId,
        mode: TransportMode,
    ) -> Self {
        Self {
            id,
            short_code: short_code.into(),
            name: name.into(),
            agency,
            mode,
            direction: None,
            services: BTreeSet::new(),
            headsigns: BTreeSet::new(),
        }
    }
}

impl PartialEq for Route {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Route {}

impl std::hash::Hash for Route {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// A station as served by one route.
///
/// The graph's time expansion hangs off these.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteStation {
    pub id: RouteStationId,
    pub mode: TransportMode,
}

impl RouteStation {
    pub fn new(station: StationId, route: RouteId, mode: TransportMode) -> Self {
        Self {
            id: RouteStationId::new(station, route),
            mode,
        }
    }

    pub fn station(&self) -> &StationId {
        self.id.station_id()
    }

    pub fn route(&self) -> &RouteId {
        self.id.route_id()
    }
}
