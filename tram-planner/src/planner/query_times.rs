//! Seed times for a query.

use crate::domain::TramTime;

use super::PlannerConfig;

/// Times to run independent searches from, earliest first.
///
/// A search starting with a walk only uses the requested time, since the
/// walk already absorbs the wait for a departure.
pub fn query_times(time: TramTime, config: &PlannerConfig, walk_at_start: bool) -> Vec<TramTime> {
    if walk_at_start {
        return vec![time];
    }

    let mut times = Vec::with_capacity(config.number_of_queries as usize);
    for i in 0..config.number_of_queries.max(1) {
        let Some(seed) = time.checked_add_minutes(i * config.query_interval_mins) else {
            break;
        };
        if times.last() != Some(&seed) {
            times.push(seed);
        }
    }
    times
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(s: &str) -> TramTime {
        TramTime::parse_hhmm(s).unwrap()
    }

    #[test]
    fn seeds_at_intervals() {
        let config = PlannerConfig::default();
        assert_eq!(
            query_times(time("10:00"), &config, false),
            vec![time("10:00"), time("10:12"), time("10:24")]
        );
    }

    #[test]
    fn walk_at_start_uses_one_seed() {
        let config = PlannerConfig::default();
        assert_eq!(query_times(time("10:00"), &config, true), vec![time("10:00")]);
    }

    #[test]
    fn at_least_one_seed() {
        let mut config = PlannerConfig::default();
        config.number_of_queries = 0;
        assert_eq!(query_times(time("10:00"), &config, false), vec![time("10:00")]);

        config.number_of_queries = 3;
        config.query_interval_mins = 0;
        assert_eq!(query_times(time("10:00"), &config, false), vec![time("10:00")]);
    }

    #[test]
    fn stops_at_end_of_range() {
        let config = PlannerConfig::default();
        assert_eq!(
            query_times(time("47:40"), &config, false),
            vec![time("47:40"), time("47:52")]
        );
    }
}
