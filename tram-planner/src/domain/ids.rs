//! Identifier types for timetable entities.
//!
//! Identifiers wrap `Arc<str>` so cloning them into search state is cheap,
//! and compare by value so two separately-loaded ids for the same entity are
//! equal without relying on interning.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

macro_rules! impl_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn new(s: impl AsRef<str>) -> Self {
                Self(s.as_ref().into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s.into())
            }
        }
    };
}

impl_identifier!(
    /// Identifies an operating agency.
    AgencyId
);
impl_identifier!(
    /// Identifies a route.
    RouteId
);
impl_identifier!(
    /// Identifies a service (a calendar plus the trips that follow it).
    ServiceId
);
impl_identifier!(
    /// Identifies a single scheduled trip.
    TripId
);
impl_identifier!(
    /// Identifies a station.
    StationId
);
impl_identifier!(
    /// Identifies a platform within a station.
    PlatformId
);

impl PlatformId {
    /// Platform ids are derived from the owning station and the platform number.
    ///
    /// ```
    /// use tram_planner::domain::{PlatformId, StationId};
    ///
    /// let id = PlatformId::for_station(&StationId::new("9400ZZMAALT"), "1");
    /// assert_eq!(id.as_str(), "9400ZZMAALT1");
    /// ```
    pub fn for_station(station: &StationId, number: &str) -> Self {
        Self::new(format!("{}{}", station.as_str(), number))
    }
}

/// Identity of a station as served by one route.
///
/// The composite keeps both halves, so decomposing always yields the
/// original station and route ids.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouteStationId {
    station: StationId,
    route: RouteId,
}

impl RouteStationId {
    pub fn new(station: StationId, route: RouteId) -> Self {
        Self { station, route }
    }

    pub fn station_id(&self) -> &StationId {
        &self.station
    }

    pub fn route_id(&self) -> &RouteId {
        &self.route
    }

    /// Split back into the station and route ids.
    pub fn into_parts(self) -> (StationId, RouteId) {
        (self.station, self.route)
    }
}

impl fmt::Debug for RouteStationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteStationId({}, {})", self.station, self.route)
    }
}

impl fmt::Display for RouteStationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.station, self.route)
    }
}
