//! # topo-sim
//!
//! Synthetic latency generation for exchange ↔ cloud-region pairs.
//!
//! ## Components
//!
//! - [`synth`]: per-pair latency + packet loss from great-circle distance
//! - [`snapshot`]: full cross-product snapshot of both catalogs
//! - [`history`]: fixed-length time series with daily cycle, trend and spikes
//!
//! Everything here is pure: randomness is injected through a `rand::Rng` and
//! the current time through a `now_ms` argument, so callers (and tests) decide
//! both.

pub mod history;
pub mod snapshot;
pub mod synth;

pub use history::HistoryGenerator;
pub use snapshot::generate_snapshot;
pub use synth::{LatencySynthesizer, SyntheticLatency};
