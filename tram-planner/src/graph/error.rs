//! Graph construction and store errors.
//!
//! All of these are fatal at startup.

use std::path::PathBuf;

use crate::domain::{StationId, TransportMode};

#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// No graph labels exist for this mode
    #[error("unsupported transport mode {0}")]
    UnsupportedMode(TransportMode),

    #[error("graph store I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("graph store at {path} could not be (de)serialised: {source}")]
    Serde {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Stored edges refer to nodes that don't exist
    #[error("graph store is corrupt: {0}")]
    Corrupt(String),

    #[error("no graph node for station {0}")]
    MissingNode(StationId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = GraphError::UnsupportedMode(TransportMode::Ferry);
        assert_eq!(err.to_string(), "unsupported transport mode Ferry");

        let err = GraphError::MissingNode(StationId::new("ALT"));
        assert_eq!(err.to_string(), "no graph node for station ALT");
    }
}
