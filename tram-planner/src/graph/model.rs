//! Graph nodes, edges and the in-memory multigraph.
//!
//! Node and edge variants are closed enums. Every edge carries its own cost,
//! so traversal never has to look behaviour up elsewhere.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{
    LatLong, PlatformId, RouteId, RouteStationId, ServiceId, StationId, TramTime, TransportMode,
    TripId,
};

use super::GraphError;

/// Cost of boarding at an ordinary station.
pub const BOARDING_COST: u32 = 2;
/// Cost of alighting at an ordinary station.
pub const DEPARTS_COST: u32 = 1;
pub const INTERCHANGE_BOARD_COST: u32 = 1;
pub const INTERCHANGE_DEPART_COST: u32 = 1;

/// Index of a node within a graph.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Label of a node, used to find nodes by type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeLabel {
    TramStation,
    BusStation,
    TrainStation,
    Platform,
    RouteStation,
    Service,
    Hour,
    Minute,
    Query,
    Version,
}

impl NodeLabel {
    /// Station label for a transport mode.
    ///
    /// # Errors
    ///
    /// Returns `Err` for modes the graph has no station label for.
    pub fn for_mode(mode: TransportMode) -> Result<Self, GraphError> {
        match mode {
            TransportMode::Tram => Ok(NodeLabel::TramStation),
            TransportMode::Bus => Ok(NodeLabel::BusStation),
            TransportMode::Train => Ok(NodeLabel::TrainStation),
            other => Err(GraphError::UnsupportedMode(other)),
        }
    }

    pub fn is_station(&self) -> bool {
        matches!(
            self,
            NodeLabel::TramStation | NodeLabel::BusStation | NodeLabel::TrainStation
        )
    }
}

/// What a node stands for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Station {
        station: StationId,
        mode: TransportMode,
    },
    Platform {
        platform: PlatformId,
        station: StationId,
    },
    RouteStation {
        id: RouteStationId,
        mode: TransportMode,
    },
    /// A service as it passes one route station.
    Service {
        service: ServiceId,
        route_station: RouteStationId,
    },
    Hour {
        service: ServiceId,
        hour: u32,
    },
    /// Departures at one absolute time.
    Minute {
        service: ServiceId,
        time: TramTime,
    },
    /// Ad-hoc start or end point given as a coordinate.
    Query {
        position: LatLong,
    },
    /// Marks which feed the graph was built from.
    Version {
        version: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub label: NodeLabel,
    pub kind: NodeKind,
}

impl Node {
    /// The station this node belongs to, for station and platform nodes.
    pub fn station(&self) -> Option<&StationId> {
        match &self.kind {
            NodeKind::Station { station, .. } | NodeKind::Platform { station, .. } => Some(station),
            NodeKind::RouteStation { id, .. } => Some(id.station_id()),
            _ => None,
        }
    }
}

/// Relationship type of an edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    Board,
    Depart,
    InterchangeBoard,
    InterchangeDepart,
    ToService,
    ToHour,
    ToMinute,
    /// A vehicle travelling from a minute node to the next route station.
    GoesTo { trip: TripId, mode: TransportMode },
    /// Route-level adjacency, ignoring time. Not used by journey search.
    OnRoute { route: RouteId },
    Walk,
    EnterPlatform,
    LeavePlatform,
}

impl EdgeKind {
    pub fn is_boarding(&self) -> bool {
        matches!(self, EdgeKind::Board | EdgeKind::InterchangeBoard)
    }

    pub fn is_departing(&self) -> bool {
        matches!(self, EdgeKind::Depart | EdgeKind::InterchangeDepart)
    }

    pub fn is_interchange(&self) -> bool {
        matches!(self, EdgeKind::InterchangeBoard | EdgeKind::InterchangeDepart)
    }

    pub fn is_walk(&self) -> bool {
        matches!(self, EdgeKind::Walk)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
    pub kind: EdgeKind,
    pub cost: u32,
}

/// Stored form of a graph: just nodes and edges.
#[derive(Serialize)]
pub(super) struct GraphRecordRef<'a> {
    nodes: &'a [Node],
    edges: &'a [Edge],
}

#[derive(Deserialize)]
pub(super) struct GraphRecord {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

/// Directed multigraph with lookup indexes.
#[derive(Debug, Default)]
pub struct TransitGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    outgoing: Vec<Vec<usize>>,
    incoming: Vec<Vec<usize>>,
    stations: HashMap<StationId, NodeId>,
    platforms: HashMap<PlatformId, NodeId>,
    route_stations: HashMap<RouteStationId, NodeId>,
    labels: BTreeMap<NodeLabel, Vec<NodeId>>,
}

impl TransitGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn add_node(&mut self, label: NodeLabel, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let node = Node { id, label, kind };
        self.index_node(&node);
        self.nodes.push(node);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        id
    }

    pub(super) fn add_edge(&mut self, from: NodeId, to: NodeId, kind: EdgeKind, cost: u32) {
        let index = self.edges.len();
        self.edges.push(Edge { from, to, kind, cost });
        self.outgoing[from.index()].push(index);
        self.incoming[to.index()].push(index);
    }

    fn index_node(&mut self, node: &Node) {
        match &node.kind {
            NodeKind::Station { station, .. } => {
                self.stations.insert(station.clone(), node.id);
            }
            NodeKind::Platform { platform, .. } => {
                self.platforms.insert(platform.clone(), node.id);
            }
            NodeKind::RouteStation { id, .. } => {
                self.route_stations.insert(id.clone(), node.id);
            }
            _ => {}
        }
        self.labels.entry(node.label).or_default().push(node.id);
    }

    pub(super) fn record(&self) -> GraphRecordRef<'_> {
        GraphRecordRef {
            nodes: &self.nodes,
            edges: &self.edges,
        }
    }

    /// Rebuild adjacency and indexes from stored nodes and edges.
    pub(super) fn from_record(record: GraphRecord) -> Result<Self, GraphError> {
        let mut graph = TransitGraph::new();
        for (expected, node) in record.nodes.into_iter().enumerate() {
            if node.id.index() != expected {
                return Err(GraphError::Corrupt(format!(
                    "node {} stored at position {expected}",
                    node.id
                )));
            }
            graph.add_node(node.label, node.kind);
        }
        let count = graph.nodes.len();
        for edge in record.edges {
            if edge.from.index() >= count || edge.to.index() >= count {
                return Err(GraphError::Corrupt(format!(
                    "edge {} -> {} refers to a missing node",
                    edge.from, edge.to
                )));
            }
            graph.add_edge(edge.from, edge.to, edge.kind, edge.cost);
        }
        Ok(graph)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.outgoing
            .get(id.index())
            .into_iter()
            .flatten()
            .map(|&i| &self.edges[i])
    }

    pub fn incoming(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.incoming
            .get(id.index())
            .into_iter()
            .flatten()
            .map(|&i| &self.edges[i])
    }

    pub fn station_node(&self, station: &StationId) -> Option<NodeId> {
        self.stations.get(station).copied()
    }

    pub fn platform_node(&self, platform: &PlatformId) -> Option<NodeId> {
        self.platforms.get(platform).copied()
    }

    pub fn route_station_node(&self, id: &RouteStationId) -> Option<NodeId> {
        self.route_stations.get(id).copied()
    }

    pub fn nodes_with_label(&self, label: NodeLabel) -> &[NodeId] {
        self.labels.get(&label).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Node and edge counts per label and kind, for comparing builds.
    pub fn shape(&self) -> GraphShape {
        let mut nodes = BTreeMap::new();
        for node in &self.nodes {
            *nodes.entry(node.label).or_insert(0) += 1;
        }
        let mut edges = BTreeMap::new();
        for edge in &self.edges {
            *edges.entry(edge_kind_name(&edge.kind)).or_insert(0) += 1;
        }
        GraphShape { nodes, edges }
    }
}

fn edge_kind_name(kind: &EdgeKind) -> &'static str {
    match kind {
        EdgeKind::Board => "Board",
        EdgeKind::Depart => "Depart",
        EdgeKind::InterchangeBoard => "InterchangeBoard",
        EdgeKind::InterchangeDepart => "InterchangeDepart",
        EdgeKind::ToService => "ToService",
        EdgeKind::ToHour => "ToHour",
        EdgeKind::ToMinute => "ToMinute",
        EdgeKind::GoesTo { .. } => "GoesTo",
        EdgeKind::OnRoute { .. } => "OnRoute",
        EdgeKind::Walk => "Walk",
        EdgeKind::EnterPlatform => "EnterPlatform",
        EdgeKind::LeavePlatform => "LeavePlatform",
    }
}

/// Per-label node counts and per-kind edge counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphShape {
    pub nodes: BTreeMap<NodeLabel, usize>,
    pub edges: BTreeMap<&'static str, usize>,
}
