//! Interchange classification.
//!
//! A station is an interchange when the data says so, when it is a train
//! station served by two or more agencies, or when it is a bus station whose
//! name marks it as one.

use std::collections::BTreeSet;

use tracing::info;

use super::{Station, StationId, TransportMode};

/// The set of stations where changing vehicle is practical.
#[derive(Debug, Clone, Default)]
pub struct Interchanges {
    stations: BTreeSet<StationId>,
}

impl Interchanges {
    pub fn from_stations<'a>(stations: impl IntoIterator<Item = &'a Station>) -> Self {
        let mut found = BTreeSet::new();
        let (mut flagged, mut bus, mut train) = (0usize, 0usize, 0usize);

        for station in stations {
            if station.interchange {
                flagged += 1;
                found.insert(station.id.clone());
                continue;
            }
            match station.mode {
                TransportMode::Bus if is_bus_interchange_name(&station.name) => {
                    bus += 1;
                    found.insert(station.id.clone());
                }
                TransportMode::Train if station.agencies.len() >= 2 => {
                    train += 1;
                    found.insert(station.id.clone());
                }
                _ => {}
            }
        }

        info!(flagged, bus, train, "found interchanges");
        Self { stations: found }
    }

    pub fn is_interchange(&self, station: &StationId) -> bool {
        self.stations.contains(station)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StationId> {
        self.stations.iter()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

fn is_bus_interchange_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    if lower.contains("interchange") {
        return true;
    }
    lower.contains("bus station") && !lower.contains("adj bus station")
}
