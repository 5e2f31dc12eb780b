//! Central timetable repository.
//!
//! Entities refer to each other by id; `TransportData` owns them all and
//! resolves ids. It is assembled once from a `TimetableFeed` and is read-only
//! afterwards.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::{
    Agency, AgencyId, DomainError, Interchanges, LatLong, Platform, PlatformId, Route, RouteId,
    RouteStation, RouteStationId, Service, ServiceId, Station, StationId, StopCall, TramTime,
    TransportMode, Trip, TripId,
};

/// A station as it appears in a feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedStation {
    pub id: StationId,
    pub name: String,
    #[serde(default)]
    pub area: String,
    pub position: LatLong,
    pub mode: TransportMode,
    #[serde(default)]
    pub interchange: bool,
    /// Platform numbers, for modes that use platforms.
    #[serde(default)]
    pub platforms: Vec<String>,
}

/// A stop call as it appears in a feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedCall {
    pub sequence: u32,
    pub station: StationId,
    #[serde(default)]
    pub platform: Option<String>,
    pub arrival: TramTime,
    pub departure: TramTime,
}

/// A trip as it appears in a feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedTrip {
    pub id: TripId,
    pub service: ServiceId,
    #[serde(default)]
    pub headsign: Option<String>,
    pub calls: Vec<FeedCall>,
}

/// Parsed timetable data, prior to cross-referencing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimetableFeed {
    pub feed_version: String,
    #[serde(default)]
    pub agencies: Vec<Agency>,
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub stations: Vec<FeedStation>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub trips: Vec<FeedTrip>,
}

/// Read-only repository of the loaded timetable.
#[derive(Debug, Clone)]
pub struct TransportData {
    feed_version: String,
    agencies: BTreeMap<AgencyId, Agency>,
    routes: BTreeMap<RouteId, Route>,
    services: BTreeMap<ServiceId, Service>,
    trips: BTreeMap<TripId, Trip>,
    stations: BTreeMap<StationId, Station>,
    platforms: BTreeMap<PlatformId, Platform>,
    route_stations: BTreeMap<RouteStationId, RouteStation>,
    interchanges: Interchanges,
}

impl TransportData {
    /// Cross-reference a feed into a repository.
    ///
    /// # Errors
    ///
    /// Returns `Err` if an entity refers to an id the feed does not define,
    /// a position is out of range, or a trip's calls are out of order.
    pub fn from_feed(feed: TimetableFeed) -> Result<Self, DomainError> {
        let mut agencies: BTreeMap<AgencyId, Agency> = feed
            .agencies
            .into_iter()
            .map(|a| (a.id.clone(), Agency { routes: BTreeSet::new(), ..a }))
            .collect();

        let mut routes = BTreeMap::new();
        for mut route in feed.routes {
            let agency = agencies
                .get_mut(&route.agency)
                .ok_or_else(|| DomainError::UnknownAgency(route.agency.clone()))?;
            agency.routes.insert(route.id.clone());
            route.services.clear();
            route.headsigns.clear();
            routes.insert(route.id.clone(), route);
        }

        let mut stations = BTreeMap::new();
        let mut platforms = BTreeMap::new();
        for fs in feed.stations {
            fs.position.validate()?;
            let mut station = Station::new(fs.id.clone(), fs.name, fs.position, fs.mode);
            station.area = fs.area;
            station.interchange = fs.interchange;
            if fs.mode.uses_platforms() {
                for number in fs.platforms {
                    let platform = Platform::new(&fs.id, number);
                    station.platforms.insert(platform.id.clone());
                    platforms.insert(platform.id.clone(), platform);
                }
            }
            stations.insert(fs.id, station);
        }

        let mut services = BTreeMap::new();
        for mut service in feed.services {
            let route = routes
                .get_mut(&service.route)
                .ok_or_else(|| DomainError::UnknownRoute(service.route.clone()))?;
            route.services.insert(service.id.clone());
            service.trips.clear();
            services.insert(service.id.clone(), service);
        }

        let mut trips = BTreeMap::new();
        let mut route_stations = BTreeMap::new();
        for ft in feed.trips {
            let service: &mut Service = services
                .get_mut(&ft.service)
                .ok_or_else(|| DomainError::UnknownService(ft.service.clone()))?;
            let route: &mut Route = routes
                .get_mut(&service.route)
                .ok_or_else(|| DomainError::UnknownRoute(service.route.clone()))?;

            let mut trip = Trip::new(ft.id.clone(), ft.service.clone());
            trip.headsign = ft.headsign.clone();
            if let Some(headsign) = ft.headsign {
                route.headsigns.insert(headsign);
            }

            for fc in ft.calls {
                let station: &mut Station = stations
                    .get_mut(&fc.station)
                    .ok_or_else(|| DomainError::UnknownStation(fc.station.clone()))?;
                let mut call = StopCall::new(ft.id.clone(), fc.sequence, fc.station.clone(), fc.arrival, fc.departure);
                if let Some(number) = fc.platform.filter(|_| station.mode.uses_platforms()) {
                    let platform = platforms
                        .entry(PlatformId::for_station(&station.id, &number))
                        .or_insert_with(|| Platform::new(&station.id, number));
                    station.platforms.insert(platform.id.clone());
                    call = call.with_platform(platform.id.clone());
                }
                station.routes.insert(route.id.clone());
                station.agencies.insert(route.agency.clone());
                let rs = RouteStation::new(station.id.clone(), route.id.clone(), route.mode);
                route_stations.entry(rs.id.clone()).or_insert(rs);
                trip.add_call(call)?;
            }

            if let (Some(earliest), Some(latest)) = (trip.earliest_depart_time(), trip.latest_depart_time()) {
                service.update_timings(earliest, latest);
            }
            service.trips.insert(trip.id.clone());
            trips.insert(trip.id.clone(), trip);
        }

        for service in services.values().filter(|s| s.has_missing_dates()) {
            error!(service = %service.id, dates = %service.summarise_dates(), "service has missing dates");
        }

        let interchanges = Interchanges::from_stations(stations.values());

        info!(
            feed_version = %feed.feed_version,
            routes = routes.len(),
            services = services.len(),
            trips = trips.len(),
            stations = stations.len(),
            route_stations = route_stations.len(),
            "loaded transport data"
        );

        Ok(Self {
            feed_version: feed.feed_version,
            agencies,
            routes,
            services,
            trips,
            stations,
            platforms,
            route_stations,
            interchanges,
        })
    }

    /// Version string of the feed this data came from.
    pub fn feed_version(&self) -> &str {
        &self.feed_version
    }

    pub fn agency(&self, id: &AgencyId) -> Option<&Agency> {
        self.agencies.get(id)
    }

    pub fn route(&self, id: &RouteId) -> Option<&Route> {
        self.routes.get(id)
    }

    pub fn service(&self, id: &ServiceId) -> Option<&Service> {
        self.services.get(id)
    }

    pub fn trip(&self, id: &TripId) -> Option<&Trip> {
        self.trips.get(id)
    }

    pub fn station(&self, id: &StationId) -> Option<&Station> {
        self.stations.get(id)
    }

    pub fn platform(&self, id: &PlatformId) -> Option<&Platform> {
        self.platforms.get(id)
    }

    pub fn route_station(&self, id: &RouteStationId) -> Option<&RouteStation> {
        self.route_stations.get(id)
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.values()
    }

    pub fn services(&self) -> impl Iterator<Item = &Service> {
        self.services.values()
    }

    pub fn trips(&self) -> impl Iterator<Item = &Trip> {
        self.trips.values()
    }

    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }

    pub fn route_stations(&self) -> impl Iterator<Item = &RouteStation> {
        self.route_stations.values()
    }

    /// Stations served by a route, in id order.
    pub fn route_stations_for(&self, route: &RouteId) -> Vec<&RouteStation> {
        self.route_stations
            .values()
            .filter(|rs| rs.route() == route)
            .collect()
    }

    /// Trips belonging to a service, in id order.
    pub fn trips_for(&self, service: &Service) -> impl Iterator<Item = &Trip> {
        service.trips.iter().filter_map(|id| self.trips.get(id))
    }

    pub fn services_operating_on(&self, date: NaiveDate) -> BTreeSet<ServiceId> {
        self.services
            .values()
            .filter(|s| s.operates_on(date))
            .map(|s| s.id.clone())
            .collect()
    }

    pub fn interchanges(&self) -> &Interchanges {
        &self.interchanges
    }

    pub fn is_interchange(&self, station: &StationId) -> bool {
        self.interchanges.is_interchange(station)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DaysOfWeek;

    fn time(s: &str) -> TramTime {
        TramTime::parse_hhmm(s).unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn station(id: &str, platforms: &[&str]) -> FeedStation {
        FeedStation {
            id: StationId::new(id),
            name: format!("Station {id}"),
            area: String::new(),
            position: LatLong::new(53.4, -2.2).unwrap(),
            mode: TransportMode::Tram,
            interchange: false,
            platforms: platforms.iter().map(|p| p.to_string()).collect(),
        }
    }

    fn call(sequence: u32, station: &str, platform: Option<&str>, at: &str) -> FeedCall {
        FeedCall {
            sequence,
            station: StationId::new(station),
            platform: platform.map(String::from),
            arrival: time(at),
            departure: time(at),
        }
    }

    fn feed() -> TimetableFeed {
        TimetableFeed {
            feed_version: "v1".into(),
            agencies: vec![Agency::new(AgencyId::new("MET"), "Metrolink")],
            routes: vec![Route::new(
                RouteId::new("R1"),
                "G",
                "Green",
                AgencyId::new("MET"),
                TransportMode::Tram,
            )],
            stations: vec![station("A", &["1"]), station("B", &[])],
            services: vec![
                Service::new(ServiceId::new("S1"), RouteId::new("R1"))
                    .with_days(DaysOfWeek::from_bools(true, true, true, true, true, false, false))
                    .with_date_range(date(1), date(31)),
            ],
            trips: vec![FeedTrip {
                id: TripId::new("T1"),
                service: ServiceId::new("S1"),
                headsign: Some("Bury".into()),
                calls: vec![
                    call(1, "A", Some("1"), "10:00"),
                    call(2, "B", Some("2"), "10:05"),
                ],
            }],
        }
    }

    #[test]
    fn cross_references() {
        let data = TransportData::from_feed(feed()).unwrap();

        assert_eq!(data.feed_version(), "v1");
        let route = data.route(&RouteId::new("R1")).unwrap();
        assert!(route.services.contains(&ServiceId::new("S1")));
        assert!(route.headsigns.contains("Bury"));
        assert!(data.agency(&AgencyId::new("MET")).unwrap().routes.contains(&RouteId::new("R1")));

        let service = data.service(&ServiceId::new("S1")).unwrap();
        assert_eq!(service.earliest_depart_time(), Some(time("10:00")));
        assert_eq!(service.latest_depart_time(), Some(time("10:05")));
        assert_eq!(data.trips_for(service).count(), 1);

        let b = data.station(&StationId::new("B")).unwrap();
        assert!(b.platforms.contains(&PlatformId::new("B2")));
        assert!(b.routes.contains(&RouteId::new("R1")));
        assert!(data.platform(&PlatformId::new("A1")).is_some());

        assert_eq!(data.route_stations_for(&RouteId::new("R1")).len(), 2);
    }

    #[test]
    fn services_on_date() {
        let data = TransportData::from_feed(feed()).unwrap();
        // 2024-01-08 is a Monday, 2024-01-13 a Saturday
        assert!(data.services_operating_on(date(8)).contains(&ServiceId::new("S1")));
        assert!(data.services_operating_on(date(13)).is_empty());
    }

    #[test]
    fn unknown_references_rejected() {
        let mut bad = feed();
        bad.trips[0].calls.push(call(3, "Z", None, "10:10"));
        assert!(matches!(
            TransportData::from_feed(bad),
            Err(DomainError::UnknownStation(_))
        ));

        let mut bad = feed();
        bad.trips[0].service = ServiceId::new("S9");
        assert!(matches!(
            TransportData::from_feed(bad),
            Err(DomainError::UnknownService(_))
        ));

        let mut bad = feed();
        bad.routes[0].agency = AgencyId::new("XX");
        assert!(matches!(
            TransportData::from_feed(bad),
            Err(DomainError::UnknownAgency(_))
        ));
    }

    #[test]
    fn feed_from_json() {
        let json = r#"{
            "feed_version": "20240101",
            "agencies": [{"id": "MET", "name": "Metrolink"}],
            "routes": [{"id": "R1", "short_code": "G", "name": "Green", "agency": "MET", "mode": "Tram"}],
            "stations": [
                {"id": "A", "name": "Alpha", "position": {"lat": 53.4, "lon": -2.2}, "mode": "Tram"},
                {"id": "B", "name": "Beta", "position": {"lat": 53.41, "lon": -2.2}, "mode": "Tram"}
            ],
            "services": [{"id": "S1", "route": "R1", "days": ["Mon"], "start_date": "2024-01-01", "end_date": "2024-01-31"}],
            "trips": [{"id": "T1", "service": "S1", "calls": [
                {"sequence": 1, "station": "A", "arrival": "10:00", "departure": "10:00"},
                {"sequence": 2, "station": "B", "arrival": "10:04", "departure": "10:04"}
            ]}]
        }"#;
        let feed: TimetableFeed = serde_json::from_str(json).unwrap();
        let data = TransportData::from_feed(feed).unwrap();

        assert_eq!(data.trips().count(), 1);
        assert!(data.services_operating_on(date(8)).contains(&ServiceId::new("S1")));
    }
}
