//! Domain error types.
//!
//! These errors represent validation failures and data inconsistencies
//! in the timetable model. They are distinct from graph store and query
//! errors.

use super::{AgencyId, RouteId, ServiceId, StationId, TripId};

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, thiserror::Error)]
pub enum DomainError {
    /// A stop call that breaks trip ordering
    #[error("invalid stop call: {0}")]
    InvalidCall(String),

    /// Coordinates outside the valid range
    #[error("invalid position: {0}")]
    InvalidPosition(&'static str),

    #[error("unknown agency {0}")]
    UnknownAgency(AgencyId),

    #[error("unknown station {0}")]
    UnknownStation(StationId),

    #[error("unknown route {0}")]
    UnknownRoute(RouteId),

    #[error("unknown service {0}")]
    UnknownService(ServiceId),

    #[error("unknown trip {0}")]
    UnknownTrip(TripId),

    /// Journey has no stages
    #[error("journey must have at least one stage")]
    EmptyJourney,

    /// Consecutive stages don't meet at the same place
    #[error("stage {0} does not start where the previous stage ended")]
    StagesNotConnected(usize),

    /// A stage departs before the previous one arrives
    #[error("stage {0} departs before the previous stage arrives")]
    NegativeWait(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::InvalidPosition("latitude must be within -90..90");
        assert_eq!(err.to_string(), "invalid position: latitude must be within -90..90");

        let err = DomainError::UnknownStation(StationId::new("ALT"));
        assert_eq!(err.to_string(), "unknown station ALT");

        let err = DomainError::EmptyJourney;
        assert_eq!(err.to_string(), "journey must have at least one stage");

        let err = DomainError::NegativeWait(2);
        assert_eq!(err.to_string(), "stage 2 departs before the previous stage arrives");
    }
}
