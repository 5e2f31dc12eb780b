//! Journey ranking for search results.
//!
//! Ranks journeys by a combination of factors to present the most useful
//! options first.

use std::collections::HashSet;

use crate::domain::{Journey, JourneyKey};

/// Rank journeys by preference.
///
/// Journeys are ranked by:
/// 1. Arrival time (earlier is better)
/// 2. Number of changes (fewer is better)
/// 3. Total duration (shorter is better)
///
/// Returns journeys sorted best-first.
pub fn rank_journeys(mut journeys: Vec<Journey>) -> Vec<Journey> {
    journeys.sort_by(|a, b| {
        a.arrival_time()
            .cmp(&b.arrival_time())
            .then_with(|| a.change_count().cmp(&b.change_count()))
            .then_with(|| a.duration_mins().cmp(&b.duration_mins()))
    });
    journeys
}

fn dominates(better: &Journey, worse: &Journey) -> bool {
    better.arrival_time() <= worse.arrival_time()
        && better.change_count() <= worse.change_count()
        && better.duration_mins() <= worse.duration_mins()
        // Must be strictly better in at least one dimension
        && (better.arrival_time() < worse.arrival_time()
            || better.change_count() < worse.change_count()
            || better.duration_mins() < worse.duration_mins())
}

/// Remove dominated journeys.
///
/// A journey is dominated if another journey arrives no later, has no more
/// changes and takes no longer, while being strictly better in one of them.
pub fn remove_dominated(journeys: Vec<Journey>) -> Vec<Journey> {
    if journeys.len() <= 1 {
        return journeys;
    }

    let mut result: Vec<Journey> = Vec::with_capacity(journeys.len());
    for journey in journeys {
        if result.iter().any(|existing| dominates(existing, &journey)) {
            continue;
        }
        result.retain(|existing| !dominates(&journey, existing));
        result.push(journey);
    }
    result
}

/// Journeys already produced, by the trips and stations they use.
#[derive(Debug, Default)]
pub(crate) struct SeenJourneys(HashSet<JourneyKey>);

impl SeenJourneys {
    /// True the first time a journey with these trips and stations is offered.
    pub(crate) fn first_sighting(&mut self, journey: &Journey) -> bool {
        self.0.insert(journey.key())
    }
}

/// Drop journeys using the same trips between the same stations, keeping
/// the first seen.
pub fn deduplicate(journeys: Vec<Journey>) -> Vec<Journey> {
    let mut seen = SeenJourneys::default();
    journeys
        .into_iter()
        .filter(|journey| seen.first_sighting(journey))
        .collect()
}
