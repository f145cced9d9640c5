//! Export formats handed to downstream tooling.
//!
//! - [`JsonExport`]: full snapshot + statistics + recent history + metadata
//! - [`write_csv`]: one flat row per sample
//! - [`AnalysisReport`]: summary, recommendations and the first 50 samples
//!
//! The sample and history types serialize directly; nothing here reshapes
//! them beyond selection.

use std::collections::BTreeSet;
use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::stats::{AggregatedStatistics, compute_statistics, recommendations};
use crate::time_util::{iso_date, iso8601_ms};
use crate::types::{HistoryPoint, LatencySample};

/// History points carried by a JSON export.
pub const EXPORT_HISTORY_POINTS: usize = 100;

/// Samples carried by an analysis report.
pub const REPORT_DETAIL_ROWS: usize = 50;

/// CSV header row.
pub const CSV_HEADER: &str = "Exchange ID,Cloud Region ID,Latency (ms),Packet Loss (%),Timestamp";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub total_connections: usize,
    pub exported_at: u64,
}

/// Raw-data JSON export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonExport {
    /// ISO-8601 export time.
    pub timestamp: String,
    pub statistics: AggregatedStatistics,
    pub latency_data: Vec<LatencySample>,
    pub historical_data: Vec<HistoryPoint>,
    pub metadata: ExportMetadata,
}

impl JsonExport {
    /// Build an export; only the last [`EXPORT_HISTORY_POINTS`] history points
    /// are kept.
    pub fn new(samples: &[LatencySample], history: &[HistoryPoint], now_ms: u64) -> Self {
        let skip = history.len().saturating_sub(EXPORT_HISTORY_POINTS);
        Self {
            timestamp: iso8601_ms(now_ms),
            statistics: compute_statistics(samples),
            latency_data: samples.to_vec(),
            historical_data: history[skip..].to_vec(),
            metadata: ExportMetadata { total_connections: samples.len(), exported_at: now_ms },
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Suggested download name, e.g. `latency-report-2024-01-31.json`.
    pub fn file_name(&self) -> String {
        format!("latency-report-{}.json", iso_date(self.metadata.exported_at))
    }
}

/// Write samples as CSV: ids, latency, packet loss (2 decimals), ISO timestamp.
pub fn write_csv<W: Write>(samples: &[LatencySample], mut out: W) -> Result<()> {
    writeln!(out, "{CSV_HEADER}")?;
    for s in samples {
        writeln!(
            out,
            "{},{},{},{:.2},{}",
            csv_field(&s.exchange_id),
            csv_field(&s.cloud_region_id),
            s.latency_ms,
            s.packet_loss_pct,
            iso8601_ms(s.timestamp_ms),
        )?;
    }
    out.flush()?;
    Ok(())
}

/// Render samples as a CSV string.
pub fn to_csv_string(samples: &[LatencySample]) -> Result<String> {
    let mut buf = Vec::with_capacity(64 * (samples.len() + 1));
    write_csv(samples, &mut buf)?;
    String::from_utf8(buf).map_err(|e| crate::error::TopoError::Export(e.to_string()))
}

/// Suggested CSV download name.
pub fn csv_file_name(now_ms: u64) -> String {
    format!("latency-data-{}.csv", iso_date(now_ms))
}

/// Quote a field if it contains a delimiter, quote or newline.
fn csv_field(s: &str) -> std::borrow::Cow<'_, str> {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\"")).into()
    } else {
        s.into()
    }
}

// ---------------------------------------------------------------------------
// Analysis report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_exchanges: usize,
    pub total_regions: usize,
    pub average_latency: u32,
    pub min_latency: u32,
    pub max_latency: u32,
    pub active_connections: usize,
    pub packet_loss: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub title: String,
    pub generated_at: String,
    pub summary: ReportSummary,
    pub recommendations: Vec<String>,
    pub detailed_data: Vec<LatencySample>,
}

impl AnalysisReport {
    pub fn new(samples: &[LatencySample], now_ms: u64) -> Self {
        let stats = compute_statistics(samples);
        let exchanges: BTreeSet<&str> = samples.iter().map(|s| s.exchange_id.as_str()).collect();
        let regions: BTreeSet<&str> = samples.iter().map(|s| s.cloud_region_id.as_str()).collect();

        Self {
            title: "Latency Topology Analysis Report".into(),
            generated_at: iso8601_ms(now_ms),
            summary: ReportSummary {
                total_exchanges: exchanges.len(),
                total_regions: regions.len(),
                average_latency: stats.avg_latency,
                min_latency: stats.min_latency,
                max_latency: stats.max_latency,
                active_connections: stats.active_connections,
                packet_loss: stats.avg_packet_loss.clone(),
            },
            recommendations: recommendations(&stats),
            detailed_data: samples.iter().take(REPORT_DETAIL_ROWS).cloned().collect(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Suggested analysis report file name: `latency-analysis-report-YYYY-MM-DD.json`.
pub fn report_file_name(now_ms: u64) -> String {
    format!("latency-analysis-report-{}.json", iso_date(now_ms))
}
