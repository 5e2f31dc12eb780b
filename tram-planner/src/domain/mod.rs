//! Core domain types for the tram journey planner.
//!
//! This module contains the fundamental types for representing the
//! timetable: agencies, routes, services with their running calendar,
//! trips and stop calls, stations and platforms, and the journeys the
//! planner produces.

mod error;
mod ids;
mod interchanges;
mod journey;
mod mode;
mod route;
mod service;
mod station;
mod time;
mod transport_data;
mod trip;

pub use error::DomainError;
pub use ids::{AgencyId, PlatformId, RouteId, RouteStationId, ServiceId, StationId, TripId};
pub use interchanges::Interchanges;
pub use journey::{Journey, JourneyKey, Location, Stage, VehicleStage, WalkingStage};
pub use mode::TransportMode;
pub use route::{Agency, Route, RouteStation};
pub use service::{DaysOfWeek, Service};
pub use station::{LatLong, Platform, Station};
pub use time::{TimeError, TramTime};
pub use transport_data::{FeedCall, FeedStation, FeedTrip, TimetableFeed, TransportData};
pub use trip::{StopCall, Trip};
