//! Journey types.
//!
//! A `Journey` represents a complete trip from origin to destination,
//! potentially including multiple vehicle stages and walks.

use std::fmt;

use super::{DomainError, LatLong, PlatformId, RouteId, StationId, TramTime, TransportMode, TripId};

/// Where a stage starts or ends.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Station(StationId),
    /// An ad-hoc coordinate, used for walks to or from a query position.
    Position(LatLong),
}

impl Location {
    pub fn station(&self) -> Option<&StationId> {
        match self {
            Location::Station(id) => Some(id),
            Location::Position(_) => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Station(id) => write!(f, "{id}"),
            Location::Position(pos) => write!(f, "{pos}"),
        }
    }
}

/// A ride on one trip between two stations.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleStage {
    pub mode: TransportMode,
    pub route: RouteId,
    pub trip: TripId,
    pub first_station: StationId,
    pub last_station: StationId,
    pub board_platform: Option<PlatformId>,
    pub alight_platform: Option<PlatformId>,
    pub departure: TramTime,
    pub arrival: TramTime,
    /// Intermediate stops the vehicle calls at without the passenger alighting.
    pub passed_stops: u32,
}

impl VehicleStage {
    pub fn duration_mins(&self) -> u32 {
        self.arrival.minutes_since(self.departure).max(0) as u32
    }
}

/// A walk between stations or to/from a query position.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkingStage {
    pub from: Location,
    pub to: Location,
    pub departure: TramTime,
    pub duration_mins: u32,
}

impl WalkingStage {
    pub fn new(from: Location, to: Location, departure: TramTime, duration_mins: u32) -> Self {
        Self {
            from,
            to,
            departure,
            duration_mins,
        }
    }

    pub fn arrival(&self) -> TramTime {
        self.departure.plus_minutes(self.duration_mins)
    }
}

/// A stage of a journey: either a vehicle ride or a walk.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Vehicle(VehicleStage),
    Walk(WalkingStage),
}

impl Stage {
    /// Returns where this stage starts.
    pub fn origin(&self) -> Location {
        match self {
            Stage::Vehicle(ride) => Location::Station(ride.first_station.clone()),
            Stage::Walk(walk) => walk.from.clone(),
        }
    }

    /// Returns where this stage ends.
    pub fn destination(&self) -> Location {
        match self {
            Stage::Vehicle(ride) => Location::Station(ride.last_station.clone()),
            Stage::Walk(walk) => walk.to.clone(),
        }
    }

    pub fn departure(&self) -> TramTime {
        match self {
            Stage::Vehicle(ride) => ride.departure,
            Stage::Walk(walk) => walk.departure,
        }
    }

    pub fn arrival(&self) -> TramTime {
        match self {
            Stage::Vehicle(ride) => ride.arrival,
            Stage::Walk(walk) => walk.arrival(),
        }
    }

    pub fn mode(&self) -> TransportMode {
        match self {
            Stage::Vehicle(ride) => ride.mode,
            Stage::Walk(_) => TransportMode::Walk,
        }
    }

    pub fn trip(&self) -> Option<&TripId> {
        self.as_vehicle().map(|ride| &ride.trip)
    }

    pub fn is_walk(&self) -> bool {
        matches!(self, Stage::Walk(_))
    }

    pub fn as_vehicle(&self) -> Option<&VehicleStage> {
        match self {
            Stage::Vehicle(ride) => Some(ride),
            Stage::Walk(_) => None,
        }
    }

    pub fn as_walk(&self) -> Option<&WalkingStage> {
        match self {
            Stage::Vehicle(_) => None,
            Stage::Walk(walk) => Some(walk),
        }
    }
}

/// Identity of a journey for de-duplication across search seeds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JourneyKey {
    trips: Vec<TripId>,
    stations: Vec<String>,
}

/// A complete journey from origin to destination.
///
/// # Invariants
///
/// - At least one stage
/// - Consecutive stages connect (destination of one = origin of next)
/// - No stage departs before the previous one arrives
#[derive(Debug, Clone)]
pub struct Journey {
    stages: Vec<Stage>,
    query_time: TramTime,
}

impl Journey {
    /// Constructs a journey from stages in travel order.
    ///
    /// # Errors
    ///
    /// Returns `Err` if:
    /// - Stages list is empty
    /// - Stages don't connect
    /// - A stage departs before its predecessor arrives
    pub fn new(stages: Vec<Stage>, query_time: TramTime) -> Result<Self, DomainError> {
        if stages.is_empty() {
            return Err(DomainError::EmptyJourney);
        }

        for (i, window) in stages.windows(2).enumerate() {
            if window[0].destination() != window[1].origin() {
                return Err(DomainError::StagesNotConnected(i + 1));
            }
            if window[1].departure() < window[0].arrival() {
                return Err(DomainError::NegativeWait(i + 1));
            }
        }

        Ok(Journey { stages, query_time })
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// The seed time the search producing this journey started from.
    pub fn query_time(&self) -> TramTime {
        self.query_time
    }

    pub fn origin(&self) -> Location {
        self.stages[0].origin()
    }

    pub fn destination(&self) -> Location {
        self.stages[self.stages.len() - 1].destination()
    }

    pub fn departure_time(&self) -> TramTime {
        self.stages[0].departure()
    }

    pub fn arrival_time(&self) -> TramTime {
        self.stages[self.stages.len() - 1].arrival()
    }

    pub fn duration_mins(&self) -> u32 {
        self.arrival_time().minutes_since(self.departure_time()).max(0) as u32
    }

    /// Returns all vehicle stages in order.
    pub fn rides(&self) -> impl Iterator<Item = &VehicleStage> {
        self.stages.iter().filter_map(Stage::as_vehicle)
    }

    /// Returns the number of changes between vehicles.
    pub fn change_count(&self) -> usize {
        self.rides().count().saturating_sub(1)
    }

    pub fn total_walk_mins(&self) -> u32 {
        self.stages
            .iter()
            .filter_map(Stage::as_walk)
            .map(|w| w.duration_mins)
            .sum()
    }

    /// Trip sequence plus stage-boundary sequence.
    pub fn key(&self) -> JourneyKey {
        let trips = self.rides().map(|r| r.trip.clone()).collect();
        let mut stations = Vec::with_capacity(self.stages.len() + 1);
        stations.push(self.origin().to_string());
        for stage in &self.stages {
            stations.push(stage.destination().to_string());
        }
        JourneyKey { trips, stations }
    }
}

impl fmt::Display for Journey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stage) in self.stages.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            match stage {
                Stage::Vehicle(ride) => write!(
                    f,
                    "{} {} {} {}-{} {}",
                    ride.mode, ride.route, ride.first_station, ride.departure, ride.arrival, ride.last_station
                )?,
                Stage::Walk(walk) => write!(
                    f,
                    "Walk {} {}mins {}",
                    walk.from, walk.duration_mins, walk.to
                )?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(s: &str) -> TramTime {
        TramTime::parse_hhmm(s).unwrap()
    }

    fn station(s: &str) -> StationId {
        StationId::new(s)
    }

    fn ride(trip: &str, from: &str, to: &str, dep: &str, arr: &str) -> Stage {
        Stage::Vehicle(VehicleStage {
            mode: TransportMode::Tram,
            route: RouteId::new("R1"),
            trip: TripId::new(trip),
            first_station: station(from),
            last_station: station(to),
            board_platform: None,
            alight_platform: None,
            departure: time(dep),
            arrival: time(arr),
            passed_stops: 0,
        })
    }

    fn walk(from: &str, to: &str, dep: &str, mins: u32) -> Stage {
        Stage::Walk(WalkingStage::new(
            Location::Station(station(from)),
            Location::Station(station(to)),
            time(dep),
            mins,
        ))
    }

    #[test]
    fn single_stage() {
        let journey = Journey::new(vec![ride("T1", "A", "B", "10:00", "10:20")], time("09:55")).unwrap();

        assert_eq!(journey.change_count(), 0);
        assert_eq!(journey.origin(), Location::Station(station("A")));
        assert_eq!(journey.destination(), Location::Station(station("B")));
        assert_eq!(journey.duration_mins(), 20);
        assert_eq!(journey.query_time(), time("09:55"));
    }

    #[test]
    fn change_with_walk() {
        let journey = Journey::new(
            vec![
                ride("T1", "A", "B", "10:00", "10:20"),
                walk("B", "C", "10:20", 4),
                ride("T2", "C", "D", "10:30", "10:45"),
            ],
            time("10:00"),
        )
        .unwrap();

        assert_eq!(journey.change_count(), 1);
        assert_eq!(journey.total_walk_mins(), 4);
        assert_eq!(journey.arrival_time(), time("10:45"));
        assert_eq!(
            journey.to_string(),
            "Tram R1 A 10:00-10:20 B -> Walk B 4mins C -> Tram R1 C 10:30-10:45 D"
        );
    }

    #[test]
    fn empty_journey_rejected() {
        assert!(matches!(
            Journey::new(vec![], time("10:00")),
            Err(DomainError::EmptyJourney)
        ));
    }

    #[test]
    fn disconnected_stages_rejected() {
        let result = Journey::new(
            vec![
                ride("T1", "A", "B", "10:00", "10:20"),
                ride("T2", "C", "D", "10:30", "10:45"),
            ],
            time("10:00"),
        );
        assert!(matches!(result, Err(DomainError::StagesNotConnected(1))));
    }

    #[test]
    fn negative_wait_rejected() {
        let result = Journey::new(
            vec![
                ride("T1", "A", "B", "10:00", "10:20"),
                ride("T2", "B", "D", "10:15", "10:45"),
            ],
            time("10:00"),
        );
        assert!(matches!(result, Err(DomainError::NegativeWait(1))));
    }

    #[test]
    fn key_ignores_times() {
        let early = Journey::new(vec![ride("T1", "A", "B", "10:00", "10:20")], time("09:50")).unwrap();
        let late = Journey::new(vec![ride("T1", "A", "B", "10:00", "10:20")], time("10:00")).unwrap();
        let other = Journey::new(vec![ride("T9", "A", "B", "10:00", "10:20")], time("10:00")).unwrap();

        assert_eq!(early.key(), late.key());
        assert_ne!(early.key(), other.key());
    }
}
