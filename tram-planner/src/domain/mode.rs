//! Transport modes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Mode of a route or station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TransportMode {
    Tram,
    Bus,
    Train,
    Ferry,
    Subway,
    /// Not a vehicle mode; used for walking stages.
    Walk,
}

impl TransportMode {
    /// Modes whose stations are modelled with individual platforms.
    pub fn uses_platforms(&self) -> bool {
        matches!(self, TransportMode::Tram | TransportMode::Train)
    }

    /// True for modes that carry passengers on a timetabled vehicle.
    pub fn is_vehicle(&self) -> bool {
        !matches!(self, TransportMode::Walk)
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransportMode::Tram => "Tram",
            TransportMode::Bus => "Bus",
            TransportMode::Train => "Train",
            TransportMode::Ferry => "Ferry",
            TransportMode::Subway => "Subway",
            TransportMode::Walk => "Walk",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platforms_only_for_rail_modes() {
        assert!(TransportMode::Tram.uses_platforms());
        assert!(TransportMode::Train.uses_platforms());
        assert!(!TransportMode::Bus.uses_platforms());
        assert!(!TransportMode::Ferry.uses_platforms());
    }

    #[test]
    fn walk_is_not_a_vehicle() {
        assert!(!TransportMode::Walk.is_vehicle());
        assert!(TransportMode::Bus.is_vehicle());
    }
}
