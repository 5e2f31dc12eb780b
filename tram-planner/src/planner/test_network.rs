//! A small tram network for planner tests.
//!
//! ```text
//! ALT - NAV - CRN* - PIC        route R1, every 12 minutes from 10:00
//!       ECC - CRN* - BUR        route R2, every 15 minutes from 10:17
//! ISO - ISN                     route R4, not connected to the rest
//! ```
//!
//! Cornbrook (CRN) is an interchange. R1 doesn't run on 2024-01-10, and
//! neither R1 nor R2 run at weekends.

use chrono::NaiveDate;

use crate::domain::{RouteId, StationId, TimetableFeed, TransportData};
use crate::graph::{GraphBuilder, GraphDatabase, GraphFilter};
use crate::spatial::StationLocations;

use super::{PlannerConfig, ReachabilityRepository, RouteCalculator, RouteCostCalculator};

const TIMETABLE: &str = include_str!("../../tests/data/timetable.json");

pub(crate) struct TestNetwork {
    pub data: TransportData,
    pub config: PlannerConfig,
    pub db: GraphDatabase,
    pub reachability: ReachabilityRepository,
    pub locations: StationLocations,
    pub costs: RouteCostCalculator,
}

impl TestNetwork {
    pub fn feed() -> TimetableFeed {
        serde_json::from_str(TIMETABLE).unwrap()
    }

    pub fn build() -> Self {
        Self::build_with(PlannerConfig::default())
    }

    /// The sample timetable plus the agencies, routes, stations, services
    /// and trips in `extra`, written in the same JSON form.
    pub fn feed_with(mut extra: serde_json::Value) -> TimetableFeed {
        extra["feed_version"] = serde_json::Value::from("");
        let extra: TimetableFeed = serde_json::from_value(extra).unwrap();
        let mut feed = Self::feed();
        feed.agencies.extend(extra.agencies);
        feed.routes.extend(extra.routes);
        feed.stations.extend(extra.stations);
        feed.services.extend(extra.services);
        feed.trips.extend(extra.trips);
        feed
    }

    pub fn build_with(config: PlannerConfig) -> Self {
        Self::from_feed(Self::feed(), config)
    }

    pub fn from_feed(feed: TimetableFeed, config: PlannerConfig) -> Self {
        let data = TransportData::from_feed(feed).unwrap();
        let graph = GraphBuilder::new(&data, &GraphFilter::all(), &config)
            .build()
            .unwrap();
        let db = GraphDatabase::new(graph);
        let reachability = {
            let tx = db.begin_tx();
            ReachabilityRepository::new(&tx, data.interchanges())
        };
        let locations = StationLocations::new(data.stations());
        let costs = RouteCostCalculator::new(db.clone(), config.cost_cache_capacity);
        Self {
            data,
            config,
            db,
            reachability,
            locations,
            costs,
        }
    }

    pub fn calculator(&self) -> RouteCalculator<'_> {
        RouteCalculator::new(
            &self.data,
            &self.db,
            &self.config,
            &self.reachability,
            &self.locations,
            &self.costs,
        )
    }

    pub fn station(id: &str) -> StationId {
        StationId::new(id)
    }

    pub fn route(id: &str) -> RouteId {
        RouteId::new(id)
    }

    /// A Monday on which every service runs.
    pub fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
    }
}
