//! # topo-monitor
//!
//! Live latency monitoring on top of `topo-core` and `topo-sim`.
//!
//! ## Components
//!
//! - [`source`]: `SnapshotSource` trait and the distance-based `SimulatedSource`
//! - [`probe`]: `ProbingSource`: concurrent HTTP probes with simulated fallback
//! - [`monitor`]: `LiveMonitor`: tick loop, subscribers, pause / resume / offline
//! - [`connectivity`]: periodic reachability check feeding the monitor
//! - [`registry`]: builds sources / monitors from `MonitorConfig`
//!
//! ## Data flow
//!
//! ```text
//! SnapshotSource ──tick──► LiveMonitor ──► retain_known ──► latest + subscribers
//!                              ▲
//! ConnectivityChecker ──watch──┘
//! ```

pub mod connectivity;
pub mod monitor;
pub mod probe;
pub mod registry;
pub mod source;

pub use connectivity::ConnectivityChecker;
pub use monitor::{LiveMonitor, MonitorState, MonitorStats, SnapshotCallback, Subscription};
pub use probe::{HttpProber, ProbeStats, Prober, ProbingSource};
pub use registry::{create_connectivity_checker, create_monitor, create_source};
pub use source::{SimulatedSource, SnapshotSource};
