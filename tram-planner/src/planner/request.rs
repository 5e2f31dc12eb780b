//! Journey requests.

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::domain::{LatLong, StationId, TramTime};

use super::{PlannerConfig, QueryError};

/// Start or end of a journey.
#[derive(Debug, Clone, PartialEq)]
pub enum Endpoint {
    Station(StationId),
    Position(LatLong),
}

impl From<StationId> for Endpoint {
    fn from(station: StationId) -> Self {
        Endpoint::Station(station)
    }
}

impl From<LatLong> for Endpoint {
    fn from(position: LatLong) -> Self {
        Endpoint::Position(position)
    }
}

/// Source of the current date and time.
pub trait ProvidesNow {
    fn now(&self) -> NaiveDateTime;
}

/// The local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ProvidesNow for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// When to travel and within which bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyRequest {
    pub date: NaiveDate,
    pub time: TramTime,
    /// Treat `time` as the latest arrival rather than earliest departure.
    pub arrive_by: bool,
    pub max_changes: u32,
    pub max_journey_mins: u32,
}

impl JourneyRequest {
    /// Depart after `time` on `date`, with limits from `config`.
    pub fn new(date: NaiveDate, time: TramTime, config: &PlannerConfig) -> Self {
        Self {
            date,
            time,
            arrive_by: false,
            max_changes: config.max_changes,
            max_journey_mins: config.max_journey_mins,
        }
    }

    /// Depart after the current time.
    pub fn departing_now(clock: &impl ProvidesNow, config: &PlannerConfig) -> Self {
        let now = clock.now();
        // hour() is always below 24, minute() below 60
        let time = TramTime::of(now.hour(), now.minute()).unwrap_or_default();
        Self::new(now.date(), time, config)
    }

    pub fn arriving_by(mut self) -> Self {
        self.arrive_by = true;
        self
    }

    pub fn with_max_changes(mut self, max_changes: u32) -> Self {
        self.max_changes = max_changes;
        self
    }

    pub fn with_max_journey_mins(mut self, mins: u32) -> Self {
        self.max_journey_mins = mins;
        self
    }

    /// Validate the request bounds.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.max_journey_mins == 0 {
            return Err(QueryError::InvalidQuery(
                "max journey time must be positive".to_string(),
            ));
        }
        if self.time.checked_add_minutes(self.max_journey_mins).is_none() && !self.arrive_by {
            return Err(QueryError::InvalidQuery(
                "journey window runs past the following service day".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClock(NaiveDateTime);

    impl ProvidesNow for FixedClock {
        fn now(&self) -> NaiveDateTime {
            self.0
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
    }

    #[test]
    fn defaults_from_config() {
        let config = PlannerConfig::default();
        let request = JourneyRequest::new(date(), TramTime::of(10, 0).unwrap(), &config);

        assert!(!request.arrive_by);
        assert_eq!(request.max_changes, 5);
        assert_eq!(request.max_journey_mins, 120);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn now_from_clock() {
        let clock = FixedClock(date().and_hms_opt(14, 37, 12).unwrap());
        let request = JourneyRequest::departing_now(&clock, &PlannerConfig::default());

        assert_eq!(request.date, date());
        assert_eq!(request.time, TramTime::of(14, 37).unwrap());
    }

    #[test]
    fn invalid_bounds() {
        let config = PlannerConfig::default();
        let base = JourneyRequest::new(date(), TramTime::of(10, 0).unwrap(), &config);

        assert!(matches!(
            base.clone().with_max_journey_mins(0).validate(),
            Err(QueryError::InvalidQuery(_))
        ));

        let late = JourneyRequest::new(date(), TramTime::of(47, 30).unwrap(), &config);
        assert!(late.validate().is_err());
        assert!(late.arriving_by().validate().is_ok());
    }

    #[test]
    fn endpoints_from_ids_and_positions() {
        let station: Endpoint = StationId::new("ALT").into();
        assert_eq!(station, Endpoint::Station(StationId::new("ALT")));

        let position: Endpoint = LatLong::new(53.4, -2.2).unwrap().into();
        assert!(matches!(position, Endpoint::Position(_)));
    }
}
