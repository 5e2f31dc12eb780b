//! Time-expanded transit graph.
//!
//! The graph is built once from the timetable (or loaded from its store) and
//! is then shared read-only by every query.

mod builder;
mod error;
mod filter;
mod model;
pub mod store;
mod version;

pub use builder::{BuildReport, GraphBuilder};
pub use error::GraphError;
pub use filter::GraphFilter;
pub use model::{
    BOARDING_COST, DEPARTS_COST, Edge, EdgeKind, GraphShape, INTERCHANGE_BOARD_COST,
    INTERCHANGE_DEPART_COST, Node, NodeId, NodeKind, NodeLabel, TransitGraph,
};
pub use store::{GraphDatabase, ReadTx, store_path};
pub use version::{VersionCheck, validate_feed_version};
