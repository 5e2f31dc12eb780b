//! Timetable time handling.
//!
//! Timetables express calls as "HH:MM" relative to the start of the service
//! day. Trips that run past midnight keep counting upwards ("24:15", "25:02"),
//! so a `TramTime` is a minute offset from service-day midnight rather than a
//! wall-clock time.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Latest representable time: the end of the day after the service day.
const MAX_MINUTES: u16 = 48 * 60 - 1;

/// Error returned when parsing or constructing an invalid time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Minutes after midnight on the service day.
///
/// # Examples
///
/// ```
/// use tram_planner::domain::TramTime;
///
/// let time = TramTime::parse_hhmm("14:30").unwrap();
/// assert_eq!(time.to_string(), "14:30");
/// assert_eq!(time.minutes_of_day(), 14 * 60 + 30);
///
/// // Past-midnight times carry on counting
/// let late = TramTime::parse_hhmm("24:10").unwrap();
/// assert!(late > time);
/// ```
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TramTime(u16);

impl TramTime {
    /// Create a time from hour and minute components.
    pub fn of(hour: u32, minute: u32) -> Result<Self, TimeError> {
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        if hour > 47 {
            return Err(TimeError::new("hour must be 0-47"));
        }
        Ok(Self((hour * 60 + minute) as u16))
    }

    /// Create a time from minutes after midnight.
    pub fn from_minutes(minutes: u32) -> Result<Self, TimeError> {
        if minutes > MAX_MINUTES as u32 {
            return Err(TimeError::new("beyond the following service day"));
        }
        Ok(Self(minutes as u16))
    }

    /// Parse a time from "HH:MM" format.
    ///
    /// Hours up to 47 are accepted for trips running past midnight.
    ///
    /// # Examples
    ///
    /// ```
    /// use tram_planner::domain::TramTime;
    ///
    /// assert!(TramTime::parse_hhmm("00:00").is_ok());
    /// assert!(TramTime::parse_hhmm("25:59").is_ok());
    ///
    /// assert!(TramTime::parse_hhmm("1430").is_err());
    /// assert!(TramTime::parse_hhmm("14:3").is_err());
    /// assert!(TramTime::parse_hhmm("48:00").is_err());
    /// ```
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();

        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;

        Self::of(hour, minute)
    }

    /// Returns the hour, which may exceed 23 for past-midnight times.
    pub fn hour(&self) -> u32 {
        self.0 as u32 / 60
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        self.0 as u32 % 60
    }

    /// Returns the number of minutes after service-day midnight.
    pub fn minutes_of_day(&self) -> u32 {
        self.0 as u32
    }

    /// Add minutes, returning `None` past the following service day.
    pub fn checked_add_minutes(&self, minutes: u32) -> Option<Self> {
        let total = self.0 as u32 + minutes;
        if total > MAX_MINUTES as u32 {
            return None;
        }
        Some(Self(total as u16))
    }

    /// Add minutes, clamping at the latest representable time.
    pub fn plus_minutes(&self, minutes: u32) -> Self {
        self.checked_add_minutes(minutes)
            .unwrap_or(Self(MAX_MINUTES))
    }

    /// Subtract minutes, clamping at midnight.
    pub fn minus_minutes(&self, minutes: u32) -> Self {
        Self(self.0.saturating_sub(minutes.min(u16::MAX as u32) as u16))
    }

    /// Signed minutes from `other` to `self`.
    ///
    /// Negative when `self` is earlier than `other`.
    pub fn minutes_since(&self, other: Self) -> i32 {
        self.0 as i32 - other.0 as i32
    }

    /// True if `self` lies in `[start, start + window]`.
    pub fn between(&self, start: Self, window_mins: u32) -> bool {
        *self >= start && self.minutes_since(start) <= window_mins as i32
    }
}

impl fmt::Debug for TramTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TramTime({:02}:{:02})", self.hour(), self.minute())
    }
}

impl fmt::Display for TramTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl TryFrom<String> for TramTime {
    type Error = TimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hhmm(&value)
    }
}

impl From<TramTime> for String {
    fn from(value: TramTime) -> Self {
        value.to_string()
    }
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(s: &str) -> TramTime {
        TramTime::parse_hhmm(s).unwrap()
    }

    #[test]
    fn parse_valid_times() {
        assert_eq!(time("00:00").minutes_of_day(), 0);
        assert_eq!(time("09:05").minutes_of_day(), 545);
        assert_eq!(time("23:59").minutes_of_day(), 1439);
        assert_eq!(time("24:00").minutes_of_day(), 1440);
        assert_eq!(time("47:59").minutes_of_day(), 2879);
    }

    #[test]
    fn parse_invalid_format() {
        assert!(TramTime::parse_hhmm("").is_err());
        assert!(TramTime::parse_hhmm("9:05").is_err());
        assert!(TramTime::parse_hhmm("09-05").is_err());
        assert!(TramTime::parse_hhmm("0a:05").is_err());
        assert!(TramTime::parse_hhmm("09:05:00").is_err());
    }

    #[test]
    fn parse_invalid_values() {
        assert!(TramTime::parse_hhmm("48:00").is_err());
        assert!(TramTime::parse_hhmm("12:60").is_err());
    }

    #[test]
    fn display_and_debug() {
        assert_eq!(time("07:03").to_string(), "07:03");
        assert_eq!(format!("{:?}", time("25:10")), "TramTime(25:10)");
    }

    #[test]
    fn arithmetic() {
        assert_eq!(time("10:50").plus_minutes(15), time("11:05"));
        assert_eq!(time("23:50").plus_minutes(20), time("24:10"));
        assert_eq!(time("00:10").minus_minutes(30), time("00:00"));
        assert_eq!(time("47:50").checked_add_minutes(10), None);
        assert_eq!(time("10:00").minutes_since(time("10:45")), -45);
    }

    #[test]
    fn between_window() {
        let start = time("10:00");
        assert!(time("10:00").between(start, 25));
        assert!(time("10:25").between(start, 25));
        assert!(!time("10:26").between(start, 25));
        assert!(!time("09:59").between(start, 25));
    }

    #[test]
    fn serde_as_string() {
        let json = serde_json::to_string(&time("08:15")).unwrap();
        assert_eq!(json, "\"08:15\"");
        let back: TramTime = serde_json::from_str(&json).unwrap();
        assert_eq!(back, time("08:15"));
        assert!(serde_json::from_str::<TramTime>("\"8:15\"").is_err());
    }
}
