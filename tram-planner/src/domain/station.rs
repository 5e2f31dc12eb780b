//! Stations, platforms and positions.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::{AgencyId, DomainError, PlatformId, RouteId, StationId, TransportMode};

/// A WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLong {
    pub lat: f64,
    pub lon: f64,
}

impl LatLong {
    /// Construct a position, rejecting out-of-range or non-finite values.
    pub fn new(lat: f64, lon: f64) -> Result<Self, DomainError> {
        let position = Self { lat, lon };
        position.validate()?;
        Ok(position)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(DomainError::InvalidPosition("coordinates must be finite"));
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(DomainError::InvalidPosition("latitude must be within -90..90"));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(DomainError::InvalidPosition("longitude must be within -180..180"));
        }
        Ok(())
    }
}

impl fmt::Display for LatLong {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lon)
    }
}

/// A platform belonging to exactly one station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub id: PlatformId,
    pub station: StationId,
    pub number: String,
}

impl Platform {
    pub fn new(station: &StationId, number: impl Into<String>) -> Self {
        let number = number.into();
        Self {
            id: PlatformId::for_station(station, &number),
            station: station.clone(),
            number,
        }
    }
}

/// A stopping place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    #[serde(default)]
    pub area: String,
    pub position: LatLong,
    pub mode: TransportMode,
    /// Explicitly flagged as an interchange by the data source.
    #[serde(default)]
    pub interchange: bool,
    #[serde(default)]
    pub platforms: BTreeSet<PlatformId>,
    #[serde(default)]
    pub routes: BTreeSet<RouteId>,
    #[serde(default)]
    pub agencies: BTreeSet<AgencyId>,
}

impl Station {
    pub fn new(
        id: StationId,
        name: impl Into<String>,
        position: LatLong,
        mode: TransportMode,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            area: String::new(),
            position,
            mode,
            interchange: false,
            platforms: BTreeSet::new(),
            routes: BTreeSet::new(),
            agencies: BTreeSet::new(),
        }
    }

    pub fn has_platforms(&self) -> bool {
        self.mode.uses_platforms() && !self.platforms.is_empty()
    }
}

impl PartialEq for Station {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Station {}
