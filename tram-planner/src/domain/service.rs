//! Services and their running calendar.
//!
//! A `Service` groups the trips that share one calendar: a weekly pattern
//! valid over a date range, adjusted by explicit additional and removed
//! dates.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::{RouteId, ServiceId, TramTime, TripId};

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Compact set of weekdays a service runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Weekday>", into = "Vec<Weekday>")]
pub struct DaysOfWeek(u8);

impl DaysOfWeek {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn from_bools(mon: bool, tue: bool, wed: bool, thu: bool, fri: bool, sat: bool, sun: bool) -> Self {
        let mut days = Self::new();
        for (flag, day) in [mon, tue, wed, thu, fri, sat, sun].into_iter().zip(WEEK) {
            if flag {
                days.insert(day);
            }
        }
        days
    }

    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_monday();
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        WEEK.into_iter().filter(|day| self.contains(*day))
    }
}

impl From<Vec<Weekday>> for DaysOfWeek {
    fn from(days: Vec<Weekday>) -> Self {
        let mut set = Self::new();
        for day in days {
            set.insert(day);
        }
        set
    }
}

impl From<DaysOfWeek> for Vec<Weekday> {
    fn from(days: DaysOfWeek) -> Self {
        days.iter().collect()
    }
}

/// A set of trips sharing one running calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub route: RouteId,
    #[serde(default)]
    pub trips: BTreeSet<TripId>,
    #[serde(default)]
    pub days: DaysOfWeek,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub additional: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub removed: BTreeSet<NaiveDate>,
    #[serde(default)]
    earliest_depart: Option<TramTime>,
    #[serde(default)]
    latest_depart: Option<TramTime>,
}

impl Service {
    pub fn new(id: ServiceId, route: RouteId) -> Self {
        Self {
            id,
            route,
            trips: BTreeSet::new(),
            days: DaysOfWeek::new(),
            start_date: None,
            end_date: None,
            additional: BTreeSet::new(),
            removed: BTreeSet::new(),
            earliest_depart: None,
            latest_depart: None,
        }
    }

    pub fn with_days(mut self, days: DaysOfWeek) -> Self {
        self.days = days;
        self
    }

    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn add_additional_date(&mut self, date: NaiveDate) {
        self.additional.insert(date);
    }

    pub fn add_removed_date(&mut self, date: NaiveDate) {
        self.removed.insert(date);
    }

    /// Whether the service runs on `date`.
    ///
    /// Additional dates always win, then removed dates; inside the validity
    /// range the weekly pattern decides, and the range end points always run.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use tram_planner::domain::{DaysOfWeek, RouteId, Service, ServiceId};
    ///
    /// let jan = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
    /// let service = Service::new(ServiceId::new("S1"), RouteId::new("R1"))
    ///     .with_days(DaysOfWeek::from_bools(true, false, false, false, false, false, false))
    ///     .with_date_range(jan(1), jan(31));
    ///
    /// assert!(service.operates_on(jan(8)));
    /// assert!(!service.operates_on(jan(9)));
    /// ```
    pub fn operates_on(&self, date: NaiveDate) -> bool {
        if self.additional.contains(&date) {
            return true;
        }
        if self.removed.contains(&date) {
            return false;
        }

        let (Some(begin), Some(end)) = (self.start_date, self.end_date) else {
            return false;
        };

        if date > begin && date < end {
            return self.days.contains(date.weekday());
        }
        date == begin || date == end
    }

    /// True when the service can only run through additional dates.
    pub fn has_missing_dates(&self) -> bool {
        if !self.additional.is_empty() {
            return false;
        }
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => {
                if start == NaiveDate::MIN && end == NaiveDate::MAX {
                    return true;
                }
                self.days.is_empty()
            }
            _ => true,
        }
    }

    /// Fold one trip's departure window into the cached earliest/latest.
    pub fn update_timings(&mut self, earliest: TramTime, latest: TramTime) {
        self.earliest_depart = Some(match self.earliest_depart {
            Some(current) => current.min(earliest),
            None => earliest,
        });
        self.latest_depart = Some(match self.latest_depart {
            Some(current) => current.max(latest),
            None => latest,
        });
    }

    pub fn earliest_depart_time(&self) -> Option<TramTime> {
        self.earliest_depart
    }

    pub fn latest_depart_time(&self) -> Option<TramTime> {
        self.latest_depart
    }

    /// One-line description of when the service runs, for logging.
    pub fn summarise_dates(&self) -> String {
        let mut out = String::new();
        let fmt_date = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "-".into());
        let _ = write!(
            out,
            "starts {} ends {} days {}",
            fmt_date(self.start_date),
            fmt_date(self.end_date),
            self.report_days()
        );
        if let (Some(earliest), Some(latest)) = (self.earliest_depart, self.latest_depart) {
            let _ = write!(out, " earliest {earliest} latest {latest}");
        }
        if !self.additional.is_empty() {
            let _ = write!(out, " additional on {:?}", self.additional);
        }
        if !self.removed.is_empty() {
            let _ = write!(out, " not running on {:?}", self.removed);
        }
        out
    }

    fn report_days(&self) -> String {
        if self.days.is_empty() {
            return "SPECIAL".to_string();
        }
        self.days
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl PartialEq for Service {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Service {}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn mondays_in_january() -> Service {
        Service::new(ServiceId::new("S1"), RouteId::new("R1"))
            .with_days(DaysOfWeek::from_bools(true, false, false, false, false, false, false))
            .with_date_range(jan(1), jan(31))
    }

    #[test]
    fn weekly_pattern_inside_range() {
        let service = mondays_in_january();
        assert!(service.operates_on(jan(8)));
        assert!(!service.operates_on(jan(9)));
        assert!(service.operates_on(jan(15)));
    }

    #[test]
    fn removed_date_stops_running() {
        let mut service = mondays_in_january();
        service.add_removed_date(jan(8));
        assert!(!service.operates_on(jan(8)));
        assert!(service.operates_on(jan(15)));
    }

    #[test]
    fn additional_date_forces_running() {
        let mut service = mondays_in_january();
        service.add_additional_date(jan(9));
        assert!(service.operates_on(jan(9)));
    }

    #[test]
    fn additional_wins_over_removed() {
        let mut service = mondays_in_january();
        service.add_additional_date(jan(10));
        service.add_removed_date(jan(10));
        assert!(service.operates_on(jan(10)));
    }

    #[test]
    fn range_end_points_always_run() {
        // 31st Jan 2024 is a Wednesday, not in the pattern
        let service = mondays_in_january();
        assert!(service.operates_on(jan(31)));
        assert!(service.operates_on(jan(1)));
    }

    #[test]
    fn outside_range_never_runs() {
        let service = mondays_in_january();
        assert!(!service.operates_on(NaiveDate::from_ymd_opt(2023, 12, 25).unwrap()));
        assert!(!service.operates_on(NaiveDate::from_ymd_opt(2024, 2, 5).unwrap()));
    }

    #[test]
    fn missing_dates() {
        assert!(!mondays_in_january().has_missing_dates());

        let no_range = Service::new(ServiceId::new("S2"), RouteId::new("R1"));
        assert!(no_range.has_missing_dates());
        assert!(!no_range.operates_on(jan(8)));

        let open_range = Service::new(ServiceId::new("S3"), RouteId::new("R1"))
            .with_days(DaysOfWeek::from_bools(true, true, true, true, true, true, true))
            .with_date_range(NaiveDate::MIN, NaiveDate::MAX);
        assert!(open_range.has_missing_dates());

        let mut special = Service::new(ServiceId::new("S4"), RouteId::new("R1"))
            .with_date_range(jan(1), jan(31));
        assert!(special.has_missing_dates());
        special.add_additional_date(jan(20));
        assert!(!special.has_missing_dates());
        assert!(special.operates_on(jan(20)));
        assert!(!special.operates_on(jan(21)));
    }

    #[test]
    fn timings_track_extremes() {
        let mut service = mondays_in_january();
        let t = |s| TramTime::parse_hhmm(s).unwrap();
        service.update_timings(t("08:00"), t("09:00"));
        service.update_timings(t("07:30"), t("08:30"));
        assert_eq!(service.earliest_depart_time(), Some(t("07:30")));
        assert_eq!(service.latest_depart_time(), Some(t("09:00")));
    }

    #[test]
    fn summary_mentions_special() {
        let special = Service::new(ServiceId::new("S4"), RouteId::new("R1"));
        assert!(special.summarise_dates().contains("SPECIAL"));
        assert!(mondays_in_january().summarise_dates().contains("Mon"));
    }

    #[test]
    fn days_serde_as_list() {
        let days = DaysOfWeek::from_bools(true, false, true, false, false, false, true);
        let json = serde_json::to_string(&days).unwrap();
        assert_eq!(json, r#"["Mon","Wed","Sun"]"#);
        let back: DaysOfWeek = serde_json::from_str(&json).unwrap();
        assert_eq!(back, days);
    }
}
