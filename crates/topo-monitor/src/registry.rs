//! Factory for snapshot sources and monitors from config.

use std::sync::Arc;

use topo_core::Catalog;
use topo_core::config::{MonitorConfig, SourceKind};
use topo_core::error::Result;

use crate::connectivity::ConnectivityChecker;
use crate::monitor::LiveMonitor;
use crate::probe::{HttpProber, ProbingSource};
use crate::source::{SimulatedSource, SnapshotSource};

/// Create the [`SnapshotSource`] selected by `config.source`.
pub fn create_source(config: &MonitorConfig, catalog: Catalog) -> Result<Arc<dyn SnapshotSource>> {
    Ok(match config.source {
        SourceKind::Simulated => {
            Arc::new(SimulatedSource::new(catalog).with_access_network(config.access_network))
        }
        SourceKind::Probe => Arc::new(ProbingSource::new(
            catalog,
            Arc::new(HttpProber::new()?),
            config.effective_probe_timeout(),
            config.effective_probe_concurrency(),
        )),
    })
}

/// Create a stopped [`LiveMonitor`] over the configured source.
pub fn create_monitor(config: &MonitorConfig, catalog: Catalog) -> Result<LiveMonitor> {
    let source = create_source(config, catalog.clone())?;
    Ok(LiveMonitor::new(source, catalog, config.effective_interval()))
}

/// Create the connectivity checker, if a URL is configured.
pub fn create_connectivity_checker(config: &MonitorConfig) -> Result<Option<ConnectivityChecker>> {
    let Some(url) = config.connectivity_url.as_deref() else {
        return Ok(None);
    };
    Ok(Some(ConnectivityChecker::new(
        url,
        Arc::new(HttpProber::new()?),
        config.effective_connectivity_interval(),
        config.effective_probe_timeout(),
    )))
}
