//! Feed-version marker check.
//!
//! A built graph carries exactly one `Version` node holding the feed version
//! it was built from. Anything else means the graph may be stale.

use tracing::{debug, error};

use super::{NodeKind, NodeLabel, TransitGraph};

/// Outcome of comparing the graph's marker with the loaded feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionCheck {
    Matches,
    Missing,
    Duplicate(usize),
    Mismatch { stored: String, expected: String },
}

impl VersionCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, VersionCheck::Matches)
    }
}

/// Compare the graph's version marker against the feed version.
///
/// Problems are logged at error level and returned, never raised.
pub fn validate_feed_version(graph: &TransitGraph, expected: &str) -> VersionCheck {
    let markers: Vec<&str> = graph
        .nodes_with_label(NodeLabel::Version)
        .iter()
        .filter_map(|&id| match graph.node(id).map(|n| &n.kind) {
            Some(NodeKind::Version { version }) => Some(version.as_str()),
            _ => None,
        })
        .collect();

    let check = match markers.as_slice() {
        [] => VersionCheck::Missing,
        [stored] if *stored == expected => VersionCheck::Matches,
        [stored] => VersionCheck::Mismatch {
            stored: stored.to_string(),
            expected: expected.to_string(),
        },
        many => VersionCheck::Duplicate(many.len()),
    };

    match &check {
        VersionCheck::Matches => debug!(version = expected, "graph version matches feed"),
        VersionCheck::Missing => error!("graph has no feed version marker"),
        VersionCheck::Duplicate(count) => error!(count, "graph has more than one feed version marker"),
        VersionCheck::Mismatch { stored, expected } => error!(
            stored = %stored,
            expected = %expected,
            "graph feed version does not match loaded data"
        ),
    }
    check
}
