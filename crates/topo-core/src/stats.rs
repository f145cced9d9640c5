//! Snapshot statistics.
//!
//! [`compute_statistics`] reduces a snapshot into the summary values every
//! consumer panel shows: average / min / max latency, how many pairs are
//! "active" (below [`ACTIVE_THRESHOLD_MS`]), and mean packet loss. It is a
//! total function: an empty snapshot yields zeros and `"0.00"`.
//!
//! The scoring helpers ([`performance_score`], [`recommendations`]) derive a
//! coarse health grade from those statistics.

use serde::{Deserialize, Serialize};

use crate::types::LatencySample;

/// A pair is considered active/healthy below this latency.
pub const ACTIVE_THRESHOLD_MS: u32 = 200;

/// Summary values recomputed from every new snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedStatistics {
    pub avg_latency: u32,
    pub min_latency: u32,
    pub max_latency: u32,
    pub active_connections: usize,
    pub total_connections: usize,
    /// Mean packet loss formatted with two decimals.
    pub avg_packet_loss: String,
}

impl AggregatedStatistics {
    /// Mean packet loss as a number (parsed back from the formatted field).
    pub fn avg_packet_loss_value(&self) -> f64 {
        self.avg_packet_loss.parse().unwrap_or(0.0)
    }

    /// Fraction of pairs that are active, `0.0` when there are none.
    pub fn active_ratio(&self) -> f64 {
        if self.total_connections == 0 {
            0.0
        } else {
            self.active_connections as f64 / self.total_connections as f64
        }
    }
}

impl std::fmt::Display for AggregatedStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "n={} active={} avg={}ms min={}ms max={}ms loss={}%",
            self.total_connections,
            self.active_connections,
            self.avg_latency,
            self.min_latency,
            self.max_latency,
            self.avg_packet_loss,
        )
    }
}

/// Reduce a snapshot into [`AggregatedStatistics`].
pub fn compute_statistics(samples: &[LatencySample]) -> AggregatedStatistics {
    if samples.is_empty() {
        return AggregatedStatistics {
            avg_latency: 0,
            min_latency: 0,
            max_latency: 0,
            active_connections: 0,
            total_connections: 0,
            avg_packet_loss: "0.00".into(),
        };
    }

    let n = samples.len() as f64;
    let mut sum = 0u64;
    let mut min = u32::MAX;
    let mut max = 0u32;
    let mut active = 0usize;
    let mut loss = 0.0f64;

    for s in samples {
        sum += u64::from(s.latency_ms);
        min = min.min(s.latency_ms);
        max = max.max(s.latency_ms);
        if s.latency_ms < ACTIVE_THRESHOLD_MS {
            active += 1;
        }
        loss += s.packet_loss_pct;
    }

    AggregatedStatistics {
        avg_latency: (sum as f64 / n).round() as u32,
        min_latency: min,
        max_latency: max,
        active_connections: active,
        total_connections: samples.len(),
        avg_packet_loss: format!("{:.2}", loss / n),
    }
}

// ---------------------------------------------------------------------------
// Latency tiers and scoring
// ---------------------------------------------------------------------------

/// Qualitative bucket for an average latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LatencyTier {
    Excellent,
    Good,
    Poor,
}

impl LatencyTier {
    pub fn classify(latency_ms: u32) -> Self {
        if latency_ms < 50 {
            Self::Excellent
        } else if latency_ms < 150 {
            Self::Good
        } else {
            Self::Poor
        }
    }
}

/// Letter grade derived from [`performance_score`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceGrade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
}

impl PerformanceGrade {
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => Self::APlus,
            80..=89 => Self::A,
            70..=79 => Self::B,
            60..=69 => Self::C,
            _ => Self::D,
        }
    }
}

impl std::fmt::Display for PerformanceGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        };
        f.write_str(s)
    }
}

/// Health score in `[0, 100]`.
///
/// Starts at 100 and deducts for high average latency, packet loss, and a low
/// share of active pairs.
pub fn performance_score(stats: &AggregatedStatistics) -> u8 {
    let mut score: i32 = 100;

    score -= match stats.avg_latency {
        151.. => 30,
        101..=150 => 15,
        51..=100 => 5,
        _ => 0,
    };

    let loss = stats.avg_packet_loss_value();
    if loss > 3.0 {
        score -= 25;
    } else if loss > 1.0 {
        score -= 10;
    }

    let ratio = stats.active_ratio();
    if ratio < 0.7 {
        score -= 20;
    } else if ratio < 0.9 {
        score -= 10;
    }

    score.clamp(0, 100) as u8
}

/// Operator-facing advice for the current statistics.
pub fn recommendations(stats: &AggregatedStatistics) -> Vec<String> {
    let mut out = Vec::new();
    if stats.avg_latency > 150 {
        out.push("Consider optimizing network routes or switching to closer cloud regions".to_string());
    }
    if stats.avg_packet_loss_value() > 2.0 {
        out.push("High packet loss detected - investigate network stability".to_string());
    }
    if (stats.active_connections as f64) < stats.total_connections as f64 * 0.8 {
        out.push("Some connections are experiencing high latency - consider load balancing".to_string());
    }
    out
}

// ---------------------------------------------------------------------------
// Per-entity summaries
// ---------------------------------------------------------------------------

/// Latency summary of one exchange across all its regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeSummary {
    pub avg: u32,
    pub min: u32,
}

/// Latency summary of one region across all exchanges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub avg: u32,
    pub connections: usize,
}

fn mean_and_min<'a>(it: impl Iterator<Item = &'a LatencySample>) -> Option<(u32, u32, usize)> {
    let mut sum = 0u64;
    let mut min = u32::MAX;
    let mut n = 0usize;
    for s in it {
        sum += u64::from(s.latency_ms);
        min = min.min(s.latency_ms);
        n += 1;
    }
    (n > 0).then(|| ((sum as f64 / n as f64).round() as u32, min, n))
}

/// Average and minimum latency of `exchange_id`, `None` if it has no samples.
pub fn exchange_summary(samples: &[LatencySample], exchange_id: &str) -> Option<ExchangeSummary> {
    mean_and_min(samples.iter().filter(|s| s.exchange_id == exchange_id))
        .map(|(avg, min, _)| ExchangeSummary { avg, min })
}

/// Average latency and pair count of `region_id`, `None` if it has no samples.
pub fn region_summary(samples: &[LatencySample], region_id: &str) -> Option<RegionSummary> {
    mean_and_min(samples.iter().filter(|s| s.cloud_region_id == region_id))
        .map(|(avg, _, connections)| RegionSummary { avg, connections })
}
