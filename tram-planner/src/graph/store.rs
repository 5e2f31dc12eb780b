//! Persisted graph store and read transactions.
//!
//! The graph lives in a JSON file named after the configured graph. Once
//! built or loaded it is shared read-only; every reader takes a `ReadTx`,
//! which is counted so leaked readers can be detected.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, info};

use super::model::GraphRecord;
use super::{GraphError, TransitGraph};

/// Location of the stored graph for a graph name.
pub fn store_path(dir: &Path, graph_name: &str) -> PathBuf {
    dir.join(format!("{graph_name}.json"))
}

/// Write a graph to `path`, creating parent directories.
pub fn save(graph: &TransitGraph, path: &Path) -> Result<(), GraphError> {
    let io_err = |source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &graph.record()).map_err(|source| GraphError::Serde {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_err)?;
    info!(path = %path.display(), nodes = graph.node_count(), edges = graph.edge_count(), "saved graph");
    Ok(())
}

/// Read a graph previously written by [`save`].
pub fn load(path: &Path) -> Result<TransitGraph, GraphError> {
    let file = File::open(path).map_err(|source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let record: GraphRecord =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| GraphError::Serde {
            path: path.to_path_buf(),
            source,
        })?;
    let graph = TransitGraph::from_record(record)?;
    info!(path = %path.display(), nodes = graph.node_count(), edges = graph.edge_count(), "loaded graph");
    Ok(graph)
}

/// Shared, read-only handle on a built graph.
#[derive(Debug, Clone)]
pub struct GraphDatabase {
    graph: Arc<TransitGraph>,
    open: Arc<AtomicUsize>,
}

impl GraphDatabase {
    pub fn new(graph: TransitGraph) -> Self {
        Self {
            graph: Arc::new(graph),
            open: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Open a read transaction. It is released when dropped.
    pub fn begin_tx(&self) -> ReadTx {
        let now_open = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(open = now_open, "begin read transaction");
        ReadTx {
            graph: Arc::clone(&self.graph),
            open: Arc::clone(&self.open),
        }
    }

    /// Number of read transactions not yet released.
    pub fn open_transactions(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// A read transaction against the graph.
#[derive(Debug)]
pub struct ReadTx {
    graph: Arc<TransitGraph>,
    open: Arc<AtomicUsize>,
}

impl Deref for ReadTx {
    type Target = TransitGraph;

    fn deref(&self) -> &TransitGraph {
        &self.graph
    }
}

impl Drop for ReadTx {
    fn drop(&mut self) {
        let was_open = self.open.fetch_sub(1, Ordering::SeqCst);
        debug!(open = was_open.saturating_sub(1), "end read transaction");
    }
}
