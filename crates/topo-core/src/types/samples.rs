//! Latency samples, snapshots and historical series.
//!
//! # Timestamp convention
//!
//! All timestamps are **milliseconds since Unix epoch**, the resolution the
//! export formats carry.

use serde::{Deserialize, Serialize};

use super::enums::TimeWindow;

/// One timestamped latency estimate for an (exchange, cloud region) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencySample {
    pub exchange_id: String,
    pub cloud_region_id: String,
    /// Round-trip latency in milliseconds, always `>= 1`.
    #[serde(rename = "latency")]
    pub latency_ms: u32,
    #[serde(rename = "timestamp")]
    pub timestamp_ms: u64,
    /// Packet loss percentage in `[0, 100)`.
    #[serde(rename = "packetLoss")]
    pub packet_loss_pct: f64,
}

impl LatencySample {
    /// `(exchange_id, cloud_region_id)` key of this sample.
    pub fn pair(&self) -> (&str, &str) {
        (&self.exchange_id, &self.cloud_region_id)
    }
}

/// The full set of samples for every pair at one instant.
///
/// Published behind an `Arc` and never mutated afterwards, so consumers never
/// observe a partially updated snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub taken_at_ms: u64,
    pub samples: Vec<LatencySample>,
}

impl Snapshot {
    pub fn new(taken_at_ms: u64, samples: Vec<LatencySample>) -> Self {
        Self { taken_at_ms, samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// One point of a [`HistoricalSeries`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    #[serde(rename = "timestamp")]
    pub timestamp_ms: u64,
    #[serde(rename = "latency")]
    pub latency_ms: u32,
    #[serde(rename = "packetLoss")]
    pub packet_loss_pct: f64,
}

/// Time-ordered samples for one fixed pair over a requested window.
///
/// Timestamps are strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalSeries {
    pub exchange_id: String,
    pub cloud_region_id: String,
    pub window: TimeWindow,
    pub points: Vec<HistoryPoint>,
}

impl HistoricalSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Elapsed time between the first and last point.
    pub fn span_ms(&self) -> u64 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => last.timestamp_ms - first.timestamp_ms,
            _ => 0,
        }
    }
}

/// How a latency value was obtained.
///
/// Callers of the snapshot API cannot tell the two apart; the tag is kept for
/// diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measurement {
    /// Timed against a live endpoint.
    Measured(u32),
    /// Substituted after a failed or unavailable probe.
    Simulated(u32),
}

impl Measurement {
    pub fn latency_ms(&self) -> u32 {
        match *self {
            Self::Measured(ms) | Self::Simulated(ms) => ms,
        }
    }

    pub fn is_measured(&self) -> bool {
        matches!(self, Self::Measured(_))
    }
}
