//! Typed error definitions for the topology engine.
//!
//! Provides [`TopoError`] for domain-specific errors that are more informative
//! than plain `anyhow::Error` strings. All variants implement `std::error::Error`
//! via `thiserror`, so they integrate with `anyhow::Result` in the runner.
//!
//! Empty catalogs or snapshots are not errors: every aggregate over them is a
//! total function returning zero values.

use thiserror::Error;

use crate::types::EntityKind;

/// Domain-specific errors for the topology engine.
#[derive(Debug, Error)]
pub enum TopoError {
    /// A requested exchange or region id is absent from the catalog.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// A caller supplied an argument outside the supported domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration parsing or validation error.
    #[error("config error: {0}")]
    Config(String),

    /// A latency probe failed or timed out. Recovered inside the probing
    /// source by substituting a simulated value.
    #[error("probe error: {0}")]
    Probe(String),

    /// A snapshot source could not produce a snapshot for this tick.
    #[error("source error: {0}")]
    Source(String),

    /// Export formatting error.
    #[error("export error: {0}")]
    Export(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl TopoError {
    pub fn exchange_not_found(id: impl Into<String>) -> Self {
        Self::NotFound { kind: EntityKind::Exchange, id: id.into() }
    }

    pub fn region_not_found(id: impl Into<String>) -> Self {
        Self::NotFound { kind: EntityKind::CloudRegion, id: id.into() }
    }
}

/// Convenience alias used by library APIs.
pub type Result<T> = std::result::Result<T, TopoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message() {
        let e = TopoError::region_not_found("aws-mars-1");
        assert_eq!(e.to_string(), "cloud region not found: aws-mars-1");
        assert!(matches!(e, TopoError::NotFound { kind: EntityKind::CloudRegion, .. }));
    }
}
