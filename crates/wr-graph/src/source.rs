//! Read-only access to the node/edge store.

use std::path::PathBuf;

use crate::{GraphResult, NetworkSnapshot, load_network_csv};

/// Supplies the current nodes and edges.  The engine never writes back.
///
/// Called once per request; implementations should not cache on the engine's
/// behalf.
pub trait NetworkSource: Send + Sync {
    fn snapshot(&self) -> GraphResult<NetworkSnapshot>;
}

/// A fixed in-memory network.
impl NetworkSource for NetworkSnapshot {
    fn snapshot(&self) -> GraphResult<NetworkSnapshot> {
        Ok(self.clone())
    }
}

/// Re-reads a pair of CSV files on every call.
#[derive(Debug, Clone)]
pub struct CsvNetwork {
    pub nodes_path: PathBuf,
    pub edges_path: PathBuf,
}

impl CsvNetwork {
    pub fn new(nodes_path: impl Into<PathBuf>, edges_path: impl Into<PathBuf>) -> Self {
        Self { nodes_path: nodes_path.into(), edges_path: edges_path.into() }
    }
}

impl NetworkSource for CsvNetwork {
    fn snapshot(&self) -> GraphResult<NetworkSnapshot> {
        load_network_csv(&self.nodes_path, &self.edges_path)
    }
}
