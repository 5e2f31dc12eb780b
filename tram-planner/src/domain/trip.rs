//! Trips and their stop calls.
//!
//! A `StopCall` is a station stop on a trip with arrival and departure
//! times. Calls are kept in sequence order; sequence numbers are monotonic
//! but may skip.

use serde::{Deserialize, Serialize};

use super::{DomainError, PlatformId, ServiceId, StationId, TramTime, TripId};

/// A stop on a trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopCall {
    pub trip: TripId,
    pub sequence: u32,
    pub station: StationId,
    #[serde(default)]
    pub platform: Option<PlatformId>,
    pub arrival: TramTime,
    pub departure: TramTime,
}

impl StopCall {
    pub fn new(
        trip: TripId,
        sequence: u32,
        station: StationId,
        arrival: TramTime,
        departure: TramTime,
    ) -> Self {
        Self {
            trip,
            sequence,
            station,
            platform: None,
            arrival,
            departure,
        }
    }

    pub fn with_platform(mut self, platform: PlatformId) -> Self {
        self.platform = Some(platform);
        self
    }
}

/// One scheduled run of a vehicle along a route.
#[derive(Debug, Clone)]
pub struct Trip {
    pub id: TripId,
    pub service: ServiceId,
    pub headsign: Option<String>,
    calls: Vec<StopCall>,
}

impl Trip {
    pub fn new(id: TripId, service: ServiceId) -> Self {
        Self {
            id,
            service,
            headsign: None,
            calls: Vec::new(),
        }
    }

    /// Add a call, keeping calls ordered by sequence number.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the call belongs to another trip, departs before it
    /// arrives, or breaks time ordering with its neighbours.
    pub fn add_call(&mut self, call: StopCall) -> Result<(), DomainError> {
        if call.trip != self.id {
            return Err(DomainError::InvalidCall(format!(
                "call for trip {} added to trip {}",
                call.trip, self.id
            )));
        }
        if call.departure < call.arrival {
            return Err(DomainError::InvalidCall(format!(
                "departure before arrival at {} on trip {}",
                call.station, self.id
            )));
        }

        let pos = self.calls.partition_point(|c| c.sequence < call.sequence);
        if let Some(prev) = pos.checked_sub(1).and_then(|i| self.calls.get(i)) {
            if prev.departure > call.arrival {
                return Err(DomainError::InvalidCall(format!(
                    "arrival at {} earlier than previous departure on trip {}",
                    call.station, self.id
                )));
            }
        }
        if let Some(next) = self.calls.get(pos) {
            if next.sequence == call.sequence {
                return Err(DomainError::InvalidCall(format!(
                    "duplicate sequence {} on trip {}",
                    call.sequence, self.id
                )));
            }
            if call.departure > next.arrival {
                return Err(DomainError::InvalidCall(format!(
                    "departure from {} later than next arrival on trip {}",
                    call.station, self.id
                )));
            }
        }

        self.calls.insert(pos, call);
        Ok(())
    }

    /// Calls in sequence order.
    pub fn calls(&self) -> &[StopCall] {
        &self.calls
    }

    pub fn earliest_depart_time(&self) -> Option<TramTime> {
        self.calls.iter().map(|c| c.departure).min()
    }

    pub fn latest_depart_time(&self) -> Option<TramTime> {
        self.calls.iter().map(|c| c.departure).max()
    }

    /// Consecutive pairs of calls, i.e. each hop the vehicle makes.
    pub fn hops(&self) -> impl Iterator<Item = (&StopCall, &StopCall)> {
        self.calls.windows(2).map(|pair| (&pair[0], &pair[1]))
    }

    pub fn calls_at(&self, station: &StationId) -> bool {
        self.calls.iter().any(|c| &c.station == station)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(s: &str) -> TramTime {
        TramTime::parse_hhmm(s).unwrap()
    }

    fn call(seq: u32, station: &str, arr: &str, dep: &str) -> StopCall {
        StopCall::new(TripId::new("T1"), seq, StationId::new(station), time(arr), time(dep))
    }

    #[test]
    fn calls_sorted_by_sequence() {
        let mut trip = Trip::new(TripId::new("T1"), ServiceId::new("S1"));
        trip.add_call(call(5, "C", "10:20", "10:21")).unwrap();
        trip.add_call(call(1, "A", "10:00", "10:00")).unwrap();
        trip.add_call(call(3, "B", "10:10", "10:11")).unwrap();

        let stations: Vec<_> = trip.calls().iter().map(|c| c.station.as_str()).collect();
        assert_eq!(stations, vec!["A", "B", "C"]);
        assert_eq!(trip.hops().count(), 2);
    }

    #[test]
    fn earliest_and_latest() {
        let mut trip = Trip::new(TripId::new("T1"), ServiceId::new("S1"));
        trip.add_call(call(1, "A", "10:00", "10:01")).unwrap();
        trip.add_call(call(2, "B", "10:10", "10:11")).unwrap();
        assert_eq!(trip.earliest_depart_time(), Some(time("10:01")));
        assert_eq!(trip.latest_depart_time(), Some(time("10:11")));
        assert!(trip.calls_at(&StationId::new("B")));
        assert!(!trip.calls_at(&StationId::new("Z")));
    }

    #[test]
    fn rejects_bad_calls() {
        let mut trip = Trip::new(TripId::new("T1"), ServiceId::new("S1"));
        assert!(trip.add_call(call(1, "A", "10:05", "10:00")).is_err());

        trip.add_call(call(1, "A", "10:00", "10:05")).unwrap();
        assert!(trip.add_call(call(2, "B", "10:04", "10:06")).is_err());
        assert!(trip.add_call(call(1, "B", "10:10", "10:10")).is_err());

        let other = StopCall::new(TripId::new("T2"), 2, StationId::new("B"), time("10:10"), time("10:10"));
        assert!(trip.add_call(other).is_err());
    }
}
