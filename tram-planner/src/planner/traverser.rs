//! Best-first traversal of the graph from one seed time.
//!
//! Branches are expanded earliest-clock first, then fewest changes, so
//! journeys come out in arrival order. A branch reaching a node no better
//! than one already seen there (same trip, or same boarding platform while
//! waiting for one, no earlier, no fewer changes) is dropped.
//!
//! A traversal may start from several nodes at once; they then share one
//! set of labels.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use tracing::{trace, warn};

use crate::domain::{Journey, StationId, TramTime};
use crate::graph::NodeId;

use super::journey_state::{JourneyState, LabelKey};
use super::overlay::QueryView;
use super::state::{SearchContext, TraversalState};

struct Branch {
    node: NodeId,
    state: TraversalState,
    journey: JourneyState,
    seq: u64,
}

impl Branch {
    fn key(&self) -> (TramTime, u32, u64) {
        (self.journey.clock(), self.journey.changes(), self.seq)
    }
}

impl PartialEq for Branch {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Branch {}

impl PartialOrd for Branch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Branch {
    // Reversed so the max-heap pops the earliest branch first.
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

/// (clock, changes) pairs already reached at a node, none dominating another.
type Labels = Vec<(TramTime, u32)>;

pub(crate) struct Traversal {
    seed: TramTime,
    heap: BinaryHeap<Branch>,
    labels: HashMap<(NodeId, LabelKey), Labels>,
    seq: u64,
    expanded: usize,
}

impl Traversal {
    pub(crate) fn new(
        start: NodeId,
        state: TraversalState,
        seed: TramTime,
        start_station: Option<&StationId>,
    ) -> Self {
        let mut traversal = Self::empty(seed);
        traversal.add_start(start, state, start_station);
        traversal
    }

    /// A traversal with nothing to expand yet.
    pub(crate) fn empty(seed: TramTime) -> Self {
        Self {
            seed,
            heap: BinaryHeap::new(),
            labels: HashMap::new(),
            seq: 0,
            expanded: 0,
        }
    }

    /// Begin another branch at `start`, at the seed time.
    pub(crate) fn add_start(&mut self, start: NodeId, state: TraversalState, station: Option<&StationId>) {
        let journey = JourneyState::new(self.seed, station);
        if self.record(start, &journey) {
            self.push(start, state, journey);
        }
    }

    pub(crate) fn seed(&self) -> TramTime {
        self.seed
    }

    fn push(&mut self, node: NodeId, state: TraversalState, journey: JourneyState) {
        self.seq += 1;
        self.heap.push(Branch {
            node,
            state,
            journey,
            seq: self.seq,
        });
    }

    /// Keep the label unless an existing one is at least as good.
    fn record(&mut self, node: NodeId, journey: &JourneyState) -> bool {
        let clock = journey.clock();
        let changes = journey.changes();
        let labels = self
            .labels
            .entry((node, journey.label_key()))
            .or_default();
        if labels.iter().any(|&(c, n)| c <= clock && n <= changes) {
            return false;
        }
        labels.retain(|&(c, n)| !(clock <= c && changes <= n));
        labels.push((clock, changes));
        true
    }

    /// Expand until the next journey is found, or the search is exhausted.
    pub(crate) fn next_journey(&mut self, view: QueryView<'_>, ctx: &SearchContext<'_>) -> Option<Journey> {
        while let Some(branch) = self.heap.pop() {
            if branch.state == TraversalState::Destination {
                match branch.journey.into_journey() {
                    Ok(journey) => {
                        trace!(seed = %self.seed, expanded = self.expanded, %journey, "found journey");
                        return Some(journey);
                    }
                    Err(err) => {
                        warn!(seed = %self.seed, %err, "discarding malformed journey");
                        continue;
                    }
                }
            }

            self.expanded += 1;
            let Some(from) = view.node(branch.node) else {
                continue;
            };
            for edge in view.outgoing(branch.node) {
                let Some(to) = view.node(edge.to) else {
                    continue;
                };
                let Some((state, journey)) = branch.state.step(edge, from, to, view, ctx, &branch.journey) else {
                    continue;
                };
                if journey.changes() > ctx.max_changes
                    || journey.elapsed_mins() > ctx.max_journey_mins
                    || journey.path_len() > ctx.max_path_length
                {
                    continue;
                }
                if !self.record(edge.to, &journey) {
                    continue;
                }
                self.push(edge.to, state, journey);
            }
        }
        trace!(seed = %self.seed, expanded = self.expanded, "search exhausted");
        None
    }
}
