//! Query errors.
//!
//! "No journeys found" is not an error: it is an empty journey stream.

use crate::domain::{DomainError, StationId};

/// Error from a journey query.
#[derive(Debug, Clone, thiserror::Error)]
pub enum QueryError {
    /// Request bounds or endpoints make no sense
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("unknown station {0}")]
    UnknownStation(StationId),

    /// Coordinate endpoint out of range
    #[error("{0}")]
    InvalidPosition(DomainError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = QueryError::InvalidQuery("max journey time must be positive".into());
        assert_eq!(err.to_string(), "invalid query: max journey time must be positive");

        let err = QueryError::UnknownStation(StationId::new("XYZ"));
        assert_eq!(err.to_string(), "unknown station XYZ");

        let err = QueryError::InvalidPosition(DomainError::InvalidPosition("latitude must be within -90..90"));
        assert_eq!(err.to_string(), "invalid position: latitude must be within -90..90");
    }
}
