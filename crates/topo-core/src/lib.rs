//! # topo-core
//!
//! Core crate of the latency topology engine, providing:
//!
//! - **Types** (`types`): exchanges, cloud regions, samples, snapshots, series
//! - **Catalog** (`catalog`): the static exchange / region lists with id indexes
//! - **Geo** (`geo`): Haversine great-circle distance
//! - **Statistics** (`stats`): snapshot aggregation, health score, summaries
//! - **Filters** (`filter`): exchange / provider / latency-range selection
//! - **Search** (`search`): ranked free-text search over the catalogs
//! - **History buffer** (`history`): bounded store of historical points
//! - **Export** (`export`): JSON, CSV and analysis-report formats
//! - **Configuration** (`config`): JSON config deserialization
//! - **Error types** (`error`): domain-specific `TopoError` via thiserror
//! - **Time utilities** (`time_util`): epoch milliseconds and ISO-8601
//! - **Logging** (`logging`): tracing-based structured logging

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod geo;
pub mod history;
pub mod logging;
pub mod search;
pub mod stats;
pub mod time_util;
pub mod types;

// Re-export types at crate root for convenience.
pub use catalog::Catalog;
pub use error::TopoError;
pub use types::*;
