//! Startup wiring.
//!
//! Opens (or builds) the graph, checks it matches the timetable, and
//! assembles the shared read-only state every query uses.

use tracing::info;

use crate::domain::TransportData;
use crate::graph::{
    BuildReport, GraphBuilder, GraphDatabase, GraphError, GraphFilter, validate_feed_version,
};
use crate::planner::{
    PlannerConfig, ReachabilityRepository, RouteCalculator, RouteCostCalculator, RouteReachable,
};
use crate::spatial::StationLocations;

/// Everything needed to answer journey queries.
///
/// Safe to share between threads; queries only read from it.
pub struct PlannerContext {
    data: TransportData,
    config: PlannerConfig,
    db: GraphDatabase,
    report: BuildReport,
    reachability: ReachabilityRepository,
    locations: StationLocations,
    costs: RouteCostCalculator,
}

impl PlannerContext {
    /// Open the graph for `data` and prepare for queries.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the graph can't be built, stored or loaded.
    pub fn start(data: TransportData, config: PlannerConfig, filter: GraphFilter) -> Result<Self, GraphError> {
        let (db, report) = GraphBuilder::new(&data, &filter, &config).open()?;

        let (reachability, locations) = {
            let tx = db.begin_tx();
            validate_feed_version(&tx, data.feed_version());
            let reachability = ReachabilityRepository::new(&tx, data.interchanges());
            let locations =
                StationLocations::new(data.stations().filter(|s| tx.station_node(&s.id).is_some()));
            (reachability, locations)
        };
        let costs = RouteCostCalculator::new(db.clone(), config.cost_cache_capacity);

        info!(
            nodes = report.nodes,
            edges = report.edges,
            rebuilt = report.rebuilt,
            stations = locations.len(),
            "planner ready"
        );

        Ok(Self {
            data,
            config,
            db,
            report,
            reachability,
            locations,
            costs,
        })
    }

    pub fn route_calculator(&self) -> RouteCalculator<'_> {
        RouteCalculator::new(
            &self.data,
            &self.db,
            &self.config,
            &self.reachability,
            &self.locations,
            &self.costs,
        )
    }

    /// Run `f` with route reachability queries against one transaction.
    pub fn with_route_reachable<R>(&self, f: impl FnOnce(&RouteReachable<'_>) -> R) -> R {
        let tx = self.db.begin_tx();
        let reachable = RouteReachable::new(&tx, &self.reachability);
        f(&reachable)
    }

    pub fn cost_calculator(&self) -> &RouteCostCalculator {
        &self.costs
    }

    pub fn data(&self) -> &TransportData {
        &self.data
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn database(&self) -> &GraphDatabase {
        &self.db
    }

    pub fn build_report(&self) -> &BuildReport {
        &self.report
    }

    pub fn locations(&self) -> &StationLocations {
        &self.locations
    }
}
