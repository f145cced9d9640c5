//! Configuration parsing for the topology engine.
//!
//! All settings come from a single JSON config file. Every block and field is
//! optional; the `effective_*` accessors supply defaults.
//!
//! # Example config
//!
//! ```json
//! {
//!   "logging": { "module_name": "topo", "log_path": "/tmp/log", "log_format": "json" },
//!   "monitor": {
//!     "interval_ms": 5000,
//!     "source": "probe",
//!     "probe_timeout_ms": 2000,
//!     "probe_concurrency": 16,
//!     "connectivity_url": "https://www.cloudflare.com"
//!   },
//!   "history": { "points": 200, "buffer_capacity": 1000 },
//!   "filters": { "exchanges": [], "cloud_providers": ["AWS", "GCP"], "latency_range": [0, 300] }
//! }
//! ```

use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::catalog::{Catalog, builtin_exchanges, builtin_regions};
use crate::filter::FilterState;
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::logging::LogFormat;
use crate::types::{AccessNetwork, CloudRegion, Exchange};

/// Default monitor tick period.
pub const DEFAULT_INTERVAL_MS: u64 = 5000;

/// Default number of points per historical series.
pub const DEFAULT_HISTORY_POINTS: usize = 200;

/// Top-level application config, deserialized from a JSON file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Logging metadata (module name, log path).
    #[serde(default)]
    pub logging: Option<LoggingConfig>,

    #[serde(default)]
    pub monitor: Option<MonitorConfig>,

    #[serde(default)]
    pub history: Option<HistoryConfig>,

    /// Initial filter selection applied by the runner.
    #[serde(default)]
    pub filters: Option<FilterState>,

    /// Replaces the built-in exchange list when present.
    #[serde(default)]
    pub exchanges: Option<Vec<Exchange>>,

    /// Replaces the built-in region list when present.
    #[serde(default)]
    pub regions: Option<Vec<CloudRegion>>,
}

/// Logging metadata block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    pub module_name: Option<String>,
    pub log_path: Option<String>,
    /// File line format, `text` (default) or `json`.
    pub log_format: Option<LogFormat>,
}

/// Which snapshot source the monitor polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Distance-based synthesis only.
    #[default]
    Simulated,
    /// Best-effort HTTP probes with simulated fallback.
    Probe,
}

/// Live monitor settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonitorConfig {
    /// Tick period in milliseconds (default: 5000).
    pub interval_ms: Option<u64>,

    #[serde(default)]
    pub source: SourceKind,

    /// Observer access network; adds a fixed overhead to simulated latency.
    pub access_network: Option<AccessNetwork>,

    /// Per-probe timeout in milliseconds (default: 2000).
    pub probe_timeout_ms: Option<u64>,

    /// Maximum probes in flight (default: 16).
    pub probe_concurrency: Option<usize>,

    /// URL checked to decide whether the network is reachable. When absent the
    /// monitor assumes it is always online.
    pub connectivity_url: Option<String>,

    /// Reachability check period in seconds (default: 10).
    pub connectivity_interval_sec: Option<u64>,
}

impl MonitorConfig {
    pub fn effective_interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.unwrap_or(DEFAULT_INTERVAL_MS).max(1))
    }

    pub fn effective_probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms.unwrap_or(2000).max(1))
    }

    pub fn effective_probe_concurrency(&self) -> usize {
        self.probe_concurrency.unwrap_or(16).max(1)
    }

    pub fn effective_connectivity_interval(&self) -> Duration {
        Duration::from_secs(self.connectivity_interval_sec.unwrap_or(10).max(1))
    }
}

/// History generation settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryConfig {
    /// Points per series (default: 200).
    pub points: Option<usize>,
    /// Consumer buffer capacity (default: 1000).
    pub buffer_capacity: Option<usize>,
}

impl AppConfig {
    pub fn module_name(&self) -> String {
        self.logging.as_ref().and_then(|l| l.module_name.clone()).unwrap_or_else(|| "topo".into())
    }

    pub fn log_path(&self) -> Option<String> {
        self.logging.as_ref().and_then(|l| l.log_path.clone())
    }

    pub fn log_format(&self) -> LogFormat {
        self.logging.as_ref().and_then(|l| l.log_format).unwrap_or_default()
    }

    pub fn monitor(&self) -> MonitorConfig {
        self.monitor.clone().unwrap_or_default()
    }

    pub fn effective_history_points(&self) -> usize {
        self.history.as_ref().and_then(|h| h.points).unwrap_or(DEFAULT_HISTORY_POINTS)
    }

    pub fn effective_history_capacity(&self) -> usize {
        self.history.as_ref().and_then(|h| h.buffer_capacity).unwrap_or(DEFAULT_HISTORY_CAPACITY)
    }

    pub fn effective_filters(&self) -> FilterState {
        self.filters.clone().unwrap_or_default()
    }

    /// Build the catalog: built-in lists unless overridden.
    pub fn build_catalog(&self) -> anyhow::Result<Catalog> {
        let exchanges = self.exchanges.clone().unwrap_or_else(builtin_exchanges);
        let regions = self.regions.clone().unwrap_or_else(builtin_regions);
        Ok(Catalog::new(exchanges, regions)?)
    }
}

/// Load and parse a JSON config file.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: AppConfig = serde_json::from_str(&content)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}
