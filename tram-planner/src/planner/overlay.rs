//! Per-query additions to the shared graph.
//!
//! Coordinate endpoints get their own nodes and walk edges. These live only
//! as long as the query; the stored graph is never touched.

use crate::domain::LatLong;
use crate::graph::{Edge, EdgeKind, Node, NodeId, NodeKind, NodeLabel, TransitGraph};

#[derive(Debug, Clone)]
pub(crate) struct QueryOverlay {
    base: u32,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl QueryOverlay {
    pub(crate) fn new(graph: &TransitGraph) -> Self {
        Self {
            base: graph.node_count() as u32,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub(crate) fn add_query_node(&mut self, position: LatLong) -> NodeId {
        let id = NodeId(self.base + self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            label: NodeLabel::Query,
            kind: NodeKind::Query { position },
        });
        id
    }

    pub(crate) fn add_walk(&mut self, from: NodeId, to: NodeId, cost: u32) {
        self.edges.push(Edge {
            from,
            to,
            kind: EdgeKind::Walk,
            cost,
        });
    }

    pub(crate) fn walk_count(&self) -> usize {
        self.edges.len()
    }
}

/// The shared graph as seen by one query.
#[derive(Clone, Copy)]
pub(crate) struct QueryView<'q> {
    graph: &'q TransitGraph,
    overlay: &'q QueryOverlay,
}

impl<'q> QueryView<'q> {
    pub(crate) fn new(graph: &'q TransitGraph, overlay: &'q QueryOverlay) -> Self {
        Self { graph, overlay }
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&'q Node> {
        match id.0.checked_sub(self.overlay.base) {
            Some(offset) => self.overlay.nodes.get(offset as usize),
            None => self.graph.node(id),
        }
    }

    pub(crate) fn outgoing(self, id: NodeId) -> impl Iterator<Item = &'q Edge> + 'q {
        self.graph
            .outgoing(id)
            .chain(self.overlay.edges.iter().filter(move |e| e.from == id))
    }
}
