//! Journey planning over the time-expanded graph.
//!
//! A query is resolved to start and destination nodes, then searched from a
//! handful of seed times. Each search follows the graph under a small set of
//! traversal rules and yields journeys lazily through a [`JourneyStream`].

mod calculator;
mod config;
mod cost;
mod error;
mod journey_state;
mod overlay;
mod query_times;
mod rank;
mod reachability;
mod request;
mod state;
mod traverser;

#[cfg(test)]
pub(crate) mod test_network;

pub use calculator::{JourneyStream, RouteCalculator};
pub use config::{ConfigError, PlannerConfig};
pub use cost::RouteCostCalculator;
pub use error::QueryError;
pub use query_times::query_times;
pub use rank::{deduplicate, rank_journeys, remove_dominated};
pub use reachability::{ReachabilityRepository, RouteReachable};
pub use request::{Endpoint, JourneyRequest, ProvidesNow, SystemClock};
