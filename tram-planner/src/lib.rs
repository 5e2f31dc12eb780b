//! Tram journey planner.
//!
//! Loads a timetable, builds a time-expanded graph of stations, platforms,
//! routes and departures, and answers "how do I get from here to there,
//! leaving after (or arriving by) this time".

pub mod context;
pub mod domain;
pub mod graph;
pub mod planner;
pub mod spatial;

pub use context::PlannerContext;
