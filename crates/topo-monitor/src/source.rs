//! Snapshot sources polled by the live monitor.

use std::sync::Arc;

use async_trait::async_trait;
use topo_core::error::Result;
use topo_core::time_util::now_ms;
use topo_core::types::Snapshot;
use topo_core::{AccessNetwork, Catalog};
use topo_sim::{LatencySynthesizer, generate_snapshot};

use crate::probe::ProbeStats;

/// Produces one snapshot per monitor tick.
///
/// Implementations must be cheap to call repeatedly; the monitor never calls
/// `snapshot` concurrently on the same source.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Human-readable source name used in log lines.
    fn name(&self) -> &str;

    /// Produce a fresh snapshot. Errors are logged by the monitor and the
    /// tick is skipped.
    async fn snapshot(&self) -> Result<Snapshot>;

    /// Measured / simulated counts of the last snapshot, for sources that
    /// time real endpoints.
    fn measurement_stats(&self) -> Option<Arc<ProbeStats>> {
        None
    }
}

/// Distance-based synthesis over the full catalog cross product.
#[derive(Debug, Clone)]
pub struct SimulatedSource {
    catalog: Catalog,
    synth: LatencySynthesizer,
}

impl SimulatedSource {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog, synth: LatencySynthesizer::new() }
    }

    pub fn with_access_network(mut self, access_network: Option<AccessNetwork>) -> Self {
        self.synth = self.synth.with_access_network(access_network);
        self
    }

    fn generate(&self) -> Snapshot {
        generate_snapshot(&self.catalog, &self.synth, now_ms(), &mut rand::thread_rng())
    }
}

#[async_trait]
impl SnapshotSource for SimulatedSource {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn snapshot(&self) -> Result<Snapshot> {
        Ok(self.generate())
    }
}
