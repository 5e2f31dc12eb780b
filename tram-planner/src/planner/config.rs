//! Configuration for graph building and journey search.

use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::Deserialize;

/// Error loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Configuration parameters for graph building and journey search.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Name of the stored graph, used as its file name.
    pub graph_name: String,

    /// Directory holding stored graphs.
    pub graph_dir: PathBuf,

    /// Rebuild the graph even if a stored one exists.
    pub rebuild_graph: bool,

    /// Longest wait at a stop before boarding (minutes).
    pub max_wait_mins: u32,

    /// Gap between successive search seed times (minutes).
    pub query_interval_mins: u32,

    /// Number of search seed times per query.
    pub number_of_queries: u32,

    /// Maximum number of changes allowed.
    pub max_changes: u32,

    /// Maximum total journey time (minutes).
    /// Journeys longer than this are pruned during search.
    pub max_journey_mins: u32,

    pub walking_mph: f64,

    /// Radius for walks to and from coordinate endpoints (km).
    pub nearest_stops_range_km: f64,

    /// Most stations to walk to from a coordinate endpoint.
    pub num_of_nearest_stops: usize,

    /// Add walk edges between nearby stations during the build.
    pub create_neighbours: bool,

    pub neighbour_distance_km: f64,

    /// Only allow alighting mid-route at interchanges.
    pub change_at_interchange_only: bool,

    /// Longest path, in graph edges, a search will follow.
    pub max_path_length: usize,

    /// Entries kept in the station-to-station cost cache.
    pub cost_cache_capacity: u64,
}

impl PlannerConfig {
    /// Create a configuration storing its graph under `graph_dir`, with
    /// search defaults.
    pub fn new(graph_name: impl Into<String>, graph_dir: impl Into<PathBuf>) -> Self {
        Self {
            graph_name: graph_name.into(),
            graph_dir: graph_dir.into(),
            ..Self::default()
        }
    }

    /// Read a JSON configuration file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Returns the maximum wait as a Duration.
    pub fn max_wait(&self) -> Duration {
        Duration::minutes(self.max_wait_mins.into())
    }

    /// Returns the seed interval as a Duration.
    pub fn query_interval(&self) -> Duration {
        Duration::minutes(self.query_interval_mins.into())
    }

    /// Returns the maximum journey time as a Duration.
    pub fn max_journey(&self) -> Duration {
        Duration::minutes(self.max_journey_mins.into())
    }

    /// Path of the stored graph.
    pub fn graph_path(&self) -> PathBuf {
        crate::graph::store_path(&self.graph_dir, &self.graph_name)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            graph_name: "tramchester".to_string(),
            graph_dir: PathBuf::from("databases"),
            rebuild_graph: false,
            max_wait_mins: 25,
            query_interval_mins: 12,
            number_of_queries: 3,
            max_changes: 5,
            max_journey_mins: 120, // 2 hours
            walking_mph: 3.0,
            nearest_stops_range_km: 1.6,
            num_of_nearest_stops: 5,
            create_neighbours: false,
            neighbour_distance_km: 0.4,
            change_at_interchange_only: false,
            max_path_length: 400,
            cost_cache_capacity: 10_000,
        }
    }
}
